//! # clinica-client
//!
//! The application layer of Clinica: everything an admin console or
//! booking front end calls, with no rendering attached.
//!
//! - [`projection`] — pure filtering/aggregation over store snapshots;
//!   callable from tests without a live connection.
//! - [`commands`] — the mutating operations: booking, approval,
//!   attendance, price and payment edits, sale recording, and the
//!   sale-deletion inventory reconciler.
//! - [`state`] — live caches mirroring the subscribed collections, kept
//!   consistent after local deletions without waiting for a snapshot.
//! - [`auth`] — sign-in state and the admin role gate.
//! - [`notify`] — transactional mail relay client and WhatsApp links,
//!   best-effort by design.
//! - [`export`] — CSV spreadsheets and the printable invoice PDF.

pub mod auth;
pub mod commands;
pub mod export;
pub mod notify;
pub mod projection;
pub mod state;

mod error;

pub use error::ClientError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
