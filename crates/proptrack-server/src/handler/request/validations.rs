//! Request validation utilities.

use bigdecimal::{BigDecimal, Signed, Zero};
use validator::ValidationError;

pub use crate::service::postcode::validate_postcode;

pub fn validation_error(code: &'static str, message: &str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.to_string().into());
    error
}

/// Amounts with at most two decimal places, as stored in `NUMERIC(12, 2)`.
fn has_pence_precision(amount: &BigDecimal) -> bool {
    amount.fractional_digit_count() <= 2
}

pub fn validate_positive_amount(amount: &BigDecimal) -> Result<(), ValidationError> {
    if !amount.is_positive() {
        return Err(validation_error("amount_positive", "Must be greater than zero"));
    }
    if !has_pence_precision(amount) {
        return Err(validation_error("amount_precision", "At most two decimal places"));
    }
    Ok(())
}

pub fn validate_non_negative_amount(amount: &BigDecimal) -> Result<(), ValidationError> {
    if amount.is_negative() && !amount.is_zero() {
        return Err(validation_error("amount_non_negative", "Must not be negative"));
    }
    if !has_pence_precision(amount) {
        return Err(validation_error("amount_precision", "At most two decimal places"));
    }
    Ok(())
}

pub fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(validation_error(
            "currency",
            "Must be a three letter ISO 4217 code such as GBP",
        ))
    }
}

pub fn validate_display_name_format(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty()
        || !name
            .chars()
            .all(|c| c.is_alphanumeric() || c.is_whitespace() || "-'.".contains(c))
    {
        return Err(validation_error(
            "display_name_format",
            "Only letters, digits, spaces, hyphens, apostrophes and full stops",
        ));
    }
    Ok(())
}

/// Trims a string, mapping blank values to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn amounts_need_pence_precision() -> anyhow::Result<()> {
        assert!(validate_positive_amount(&BigDecimal::from_str("1250.50")?).is_ok());
        assert!(validate_positive_amount(&BigDecimal::from_str("1250.505")?).is_err());
        assert!(validate_positive_amount(&BigDecimal::zero()).is_err());
        assert!(validate_non_negative_amount(&BigDecimal::zero()).is_ok());
        assert!(validate_non_negative_amount(&BigDecimal::from(-5)).is_err());
        Ok(())
    }

    #[test]
    fn currency_codes() {
        assert!(validate_currency("GBP").is_ok());
        assert!(validate_currency("gbp").is_err());
        assert!(validate_currency("POUND").is_err());
    }

    #[test]
    fn blank_strings_become_none() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" Flat 2 ".into())).as_deref(), Some("Flat 2"));
        assert_eq!(non_blank(None), None);
    }
}
