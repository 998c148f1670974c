//! # clinica-store
//!
//! Client for the realtime JSON document store backing Clinica.
//!
//! The store is a single JSON tree addressed by slash-separated paths.
//! The narrow contract consumed by the application is:
//!
//! - read-once at a path ([`StoreClient::read`])
//! - subscribe to a path and receive a snapshot on every change
//!   ([`StoreClient::subscribe`])
//! - partial field update at a path ([`StoreClient::update`])
//! - atomic multi-location write ([`StoreClient::commit`])
//! - push a new child under a chronologically ordered generated key
//!   ([`StoreClient::push`])
//! - delete a path ([`StoreClient::remove`])
//!
//! The in-process implementation keeps the tree behind one lock, so a
//! committed [`MultiWrite`] is all-or-nothing and subscribers only ever
//! observe fully committed trees.  Typed domain models live in
//! [`models`]; their serde field names are the wire schema.

pub mod client;
pub mod models;
pub mod path;
pub mod push_id;
pub mod snapshot;
pub mod tree;

mod error;

pub use client::{MultiWrite, StoreClient, Subscription};
pub use error::StoreError;
pub use path::StorePath;
pub use snapshot::Snapshot;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
