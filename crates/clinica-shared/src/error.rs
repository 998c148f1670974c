use thiserror::Error;

/// Local input rejection.  Every variant is raised before any store call
/// is made; a validation failure never mutates remote or cached state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Price cannot be empty")]
    EmptyPrice,

    #[error("Price must be a number: {0:?}")]
    NonNumericPrice(String),

    #[error("Price must be a non-negative finite number: {0}")]
    NegativePrice(f64),

    #[error("Unknown payment method: {0:?} (expected \"Cash\" or \"Online\")")]
    InvalidPaymentMethod(String),

    #[error("Customer phone must be exactly 10 digits")]
    InvalidCustomerPhone,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("A sale needs at least one product line")]
    EmptySale,

    #[error("Product line {index}: {reason}")]
    InvalidSaleLine { index: usize, reason: String },

    #[error("Discount cannot be negative")]
    NegativeDiscount,

    #[error("Discount ({discount}) cannot exceed the subtotal ({subtotal})")]
    DiscountExceedsSubtotal { discount: f64, subtotal: f64 },
}
