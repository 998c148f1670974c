//! Mutating workflow operations.
//!
//! Every command validates its input locally first, then issues the
//! remote write; a failed write surfaces as an error and leaves both the
//! store and any cache untouched.

pub mod appointments;
pub mod contacts;
pub mod sales;

/// Interactive confirmation for destructive operations.
///
/// Deletion commands do nothing and report `Ok(false)` unless the caller
/// passes `Confirmed`; the prompt itself belongs to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}
