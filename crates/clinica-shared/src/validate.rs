//! Input validation applied before any remote write.

use crate::error::ValidationError;
use crate::types::PaymentMethod;

/// Parse a price entered as free text.
///
/// Rejects empty input, anything that is not a number, negatives, and
/// non-finite values.  `"150.50"` parses to `150.5`.
pub fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPrice);
    }

    let price: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NonNumericPrice(trimmed.to_string()))?;

    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::NegativePrice(price));
    }

    Ok(price)
}

/// Parse a payment method selection; only `"Cash"` and `"Online"` exist.
pub fn parse_payment_method(raw: &str) -> Result<PaymentMethod, ValidationError> {
    match raw.trim() {
        "Cash" => Ok(PaymentMethod::Cash),
        "Online" => Ok(PaymentMethod::Online),
        other => Err(ValidationError::InvalidPaymentMethod(other.to_string())),
    }
}

/// Walk-in customer phone numbers are recorded as bare 10-digit strings.
pub fn validate_customer_phone(raw: &str) -> Result<(), ValidationError> {
    let trimmed = raw.trim();
    if trimmed.len() == 10 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCustomerPhone)
    }
}

/// A discount must stay within `[0, subtotal]`.
pub fn validate_discount(discount: f64, subtotal: f64) -> Result<(), ValidationError> {
    if discount < 0.0 {
        return Err(ValidationError::NegativeDiscount);
    }
    if discount > subtotal {
        return Err(ValidationError::DiscountExceedsSubtotal { discount, subtotal });
    }
    Ok(())
}

/// Reject an empty or whitespace-only required field.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_decimal_price() {
        assert_eq!(parse_price("150.50").unwrap(), 150.5);
        assert_eq!(parse_price("  0 ").unwrap(), 0.0);
    }

    #[test]
    fn rejects_bad_prices() {
        assert_eq!(parse_price(""), Err(ValidationError::EmptyPrice));
        assert_eq!(parse_price("   "), Err(ValidationError::EmptyPrice));
        assert!(matches!(parse_price("abc"), Err(ValidationError::NonNumericPrice(_))));
        assert!(matches!(parse_price("-5"), Err(ValidationError::NegativePrice(_))));
        assert!(matches!(parse_price("inf"), Err(ValidationError::NegativePrice(_))));
    }

    #[test]
    fn payment_method_is_a_closed_set() {
        assert_eq!(parse_payment_method("Cash").unwrap(), PaymentMethod::Cash);
        assert_eq!(parse_payment_method("Online").unwrap(), PaymentMethod::Online);
        assert!(parse_payment_method("Card").is_err());
        assert!(parse_payment_method("").is_err());
    }

    #[test]
    fn customer_phone_must_be_ten_digits() {
        assert!(validate_customer_phone("9876543210").is_ok());
        assert!(validate_customer_phone("98765").is_err());
        assert!(validate_customer_phone("98765432101").is_err());
        assert!(validate_customer_phone("98765abcde").is_err());
    }

    #[test]
    fn discount_bounds() {
        assert!(validate_discount(0.0, 100.0).is_ok());
        assert!(validate_discount(100.0, 100.0).is_ok());
        assert!(validate_discount(-1.0, 100.0).is_err());
        assert!(validate_discount(101.0, 100.0).is_err());
    }
}
