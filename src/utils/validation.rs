//! Validation utilities

use bigdecimal::{BigDecimal, FromPrimitive, Signed};
use std::collections::HashSet;
use std::str::FromStr;

use crate::types::*;

/// Convert a floating point amount, rejecting NaN and infinities
pub fn amount_from_f64(value: f64) -> FinanceResult<BigDecimal> {
    if !value.is_finite() {
        return Err(FinanceError::InvalidAmount(format!(
            "amount must be finite, got {}",
            value
        )));
    }
    BigDecimal::from_f64(value)
        .ok_or_else(|| FinanceError::InvalidAmount(format!("cannot represent {}", value)))
}

/// Parse a decimal amount such as `"150.00"` or `"-12.5"`
pub fn parse_amount(value: &str) -> FinanceResult<BigDecimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FinanceError::InvalidAmount(
            "amount cannot be empty".to_string(),
        ));
    }

    BigDecimal::from_str(trimmed)
        .map_err(|e| FinanceError::InvalidAmount(format!("'{}': {}", value, e)))
}

/// Validate that an amount is zero or positive
pub fn validate_non_negative_amount(amount: &BigDecimal, field: &str) -> FinanceResult<()> {
    if amount.is_negative() {
        Err(FinanceError::InvalidAmount(format!(
            "{} must not be negative: {}",
            field, amount
        )))
    } else {
        Ok(())
    }
}

/// Validate that a tolerance parameter is zero or positive
pub fn validate_tolerance(amount: &BigDecimal, field: &str) -> FinanceResult<()> {
    if amount.is_negative() {
        return Err(FinanceError::InvalidConfiguration(format!(
            "{} must not be negative: {}",
            field, amount
        )));
    }
    Ok(())
}

/// Validate that identifiers are non-empty and unique within one collection
pub fn validate_unique_ids<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    collection: &str,
) -> FinanceResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(FinanceError::InvalidConfiguration(format!(
                "{} contains an entry with an empty id",
                collection
            )));
        }
        if !seen.insert(id) {
            return Err(FinanceError::InvalidConfiguration(format!(
                "{} contains duplicate id '{}'",
                collection, id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_from_f64_rejects_non_finite() {
        assert!(matches!(
            amount_from_f64(f64::NAN),
            Err(FinanceError::InvalidAmount(_))
        ));
        assert!(matches!(
            amount_from_f64(f64::INFINITY),
            Err(FinanceError::InvalidAmount(_))
        ));
        assert_eq!(amount_from_f64(12.5).unwrap(), BigDecimal::from_str("12.5").unwrap());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount(" 150.00 ").unwrap(),
            BigDecimal::from(150)
        );
        assert!(matches!(parse_amount(""), Err(FinanceError::InvalidAmount(_))));
        assert!(matches!(
            parse_amount("12,50"),
            Err(FinanceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_tolerance() {
        assert!(validate_tolerance(&BigDecimal::from(0), "amount_tolerance").is_ok());
        assert!(matches!(
            validate_tolerance(&BigDecimal::from(-1), "amount_tolerance"),
            Err(FinanceError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_unique_ids() {
        assert!(validate_unique_ids(["a", "b"], "statement lines").is_ok());
        assert!(matches!(
            validate_unique_ids(["a", "a"], "statement lines"),
            Err(FinanceError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            validate_unique_ids([" "], "revenue records"),
            Err(FinanceError::InvalidConfiguration(_))
        ));
    }
}
