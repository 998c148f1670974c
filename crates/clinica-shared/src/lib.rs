//! # clinica-shared
//!
//! Identifiers, domain enums, and validation helpers shared by every
//! Clinica crate.  Nothing in here talks to the store or the network;
//! these are plain data types handed across crate boundaries.

pub mod error;
pub mod types;
pub mod validate;

pub use error::ValidationError;
pub use types::{
    AppointmentId, Attendance, BlogId, DoctorId, PaymentMethod, ProductId, Role, SaleId, UserId,
    VendorId,
};
