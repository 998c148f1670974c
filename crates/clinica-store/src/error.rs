use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A path segment was empty or contained a reserved character.
    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    /// A record could not be decoded into its typed model.
    #[error("Decode error at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A typed read expected a record at a path that holds nothing.
    #[error("No record at {0}")]
    Missing(String),

    /// Two locations in one multi-path write overlap; applying both would
    /// make the result order-dependent, so the whole commit is refused.
    #[error("Conflicting write locations: {first} overlaps {second}")]
    ConflictingWrite { first: String, second: String },

    /// A multi-path commit with no staged operations.
    #[error("Empty commit")]
    EmptyCommit,

    /// The subscription's store handle was dropped.
    #[error("Store closed")]
    Closed,
}
