use thiserror::Error;

use clinica_shared::{DoctorId, ProductId, UserId, ValidationError, VendorId};
use clinica_store::StoreError;

/// Errors surfaced to the caller of a workflow operation.
///
/// Validation variants are raised before any store call; store variants
/// mean the remote write or read failed and no local state was changed.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("User {0} is not an admin")]
    NotAdmin(UserId),

    #[error("No signed-in user")]
    SignedOut,

    #[error("Doctor {0} not found")]
    UnknownDoctor(DoctorId),

    #[error("Product {product} (vendor {vendor}) not found")]
    UnknownProduct { vendor: VendorId, product: ProductId },

    #[error("Insufficient stock for {product}: have {available}, need {requested}")]
    InsufficientStock {
        product: ProductId,
        available: u32,
        requested: u32,
    },

    #[error("Mail relay request failed: {0}")]
    MailTransport(#[from] reqwest::Error),

    #[error("Mail relay refused the message: HTTP {status}")]
    MailRejected { status: u16 },

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}
