//! Money Module
//!
//! All prices are fixed-point decimals stored as PostgreSQL `NUMERIC(10,2)`.
//! Every conversion from client input and every derived amount MUST go
//! through this module so the column constraints are checked before a row
//! is written.
//!
//! ## Usage
//! ```rust
//! use market_ledger::money::{line_total, parse_price};
//!
//! let unit = parse_price("100.00").unwrap();
//! assert_eq!(line_total(unit, 2).unwrap().to_string(), "200.00");
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places of every stored price
pub const PRICE_SCALE: u32 = 2;

/// Total significant digits of the `NUMERIC(10,2)` columns
pub const PRICE_MAX_DIGITS: u32 = 10;

/// Money validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Price cannot be negative")]
    Negative,

    #[error("Price too large, exceeds {PRICE_MAX_DIGITS} digits")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Parse a client price string with strict formatting rules
///
/// Rejects `.5`, `5.`, `+5`, scientific notation, negatives and more than
/// [`PRICE_SCALE`] decimal places. The result is rescaled to exactly two
/// decimals so `"100"` and `"100.00"` compare and display identically.
pub fn parse_price(s: &str) -> Result<Decimal, MoneyError> {
    let s = s.trim();

    if s.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".to_string()));
    }
    if s.starts_with('.') {
        return Err(MoneyError::InvalidFormat("use 0.5 not .5".to_string()));
    }
    if s.ends_with('.') {
        return Err(MoneyError::InvalidFormat("use 5.0 not 5.".to_string()));
    }
    if s.contains(['e', 'E']) {
        return Err(MoneyError::InvalidFormat(
            "scientific notation not allowed".to_string(),
        ));
    }
    if s.starts_with('+') {
        return Err(MoneyError::InvalidFormat("+ prefix not allowed".to_string()));
    }

    let d = Decimal::from_str(s).map_err(|e| MoneyError::InvalidFormat(e.to_string()))?;
    validate_price(d)
}

/// Check a decimal against the `NUMERIC(10,2)` column and normalize its scale
pub fn validate_price(d: Decimal) -> Result<Decimal, MoneyError> {
    if d.is_sign_negative() && !d.is_zero() {
        return Err(MoneyError::Negative);
    }

    let provided = d.normalize().scale();
    if provided > PRICE_SCALE {
        return Err(MoneyError::PrecisionOverflow {
            provided,
            max: PRICE_SCALE,
        });
    }

    // 10 digits with 2 after the point leaves 8 integer digits
    let limit = Decimal::from(10i64.pow(PRICE_MAX_DIGITS - PRICE_SCALE));
    if d >= limit {
        return Err(MoneyError::Overflow);
    }

    let mut d = d.abs();
    d.rescale(PRICE_SCALE);
    Ok(d)
}

/// Agreed price of `amount` units at `unit_price`, rounded to cents
pub fn line_total(unit_price: Decimal, amount: i32) -> Result<Decimal, MoneyError> {
    let total = unit_price
        .checked_mul(Decimal::from(amount))
        .ok_or(MoneyError::Overflow)?
        .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    validate_price(total)
}

/// Format-validated price for request bodies
///
/// Only deserializes from a JSON string and runs the full [`parse_price`]
/// rules, so a request can never carry a price the `NUMERIC(10,2)` columns
/// would reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictPrice(Decimal);

impl StrictPrice {
    /// Get the inner Decimal value
    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl std::ops::Deref for StrictPrice {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for StrictPrice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // JSON numbers would bypass the format rules
        let s = String::deserialize(deserializer)?;
        parse_price(&s)
            .map(StrictPrice)
            .map_err(|e| D::Error::custom(e.to_string()))
    }
}

impl Serialize for StrictPrice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_price_normalizes_scale() {
        assert_eq!(parse_price("100").unwrap().to_string(), "100.00");
        assert_eq!(parse_price("100.5").unwrap().to_string(), "100.50");
        assert_eq!(parse_price("0.01").unwrap().to_string(), "0.01");
        assert_eq!(parse_price(" 7.25 ").unwrap().to_string(), "7.25");
        // trailing zeros beyond the scale are not real precision
        assert_eq!(parse_price("1.2500").unwrap().to_string(), "1.25");
    }

    #[test]
    fn test_parse_price_rejects_bad_format() {
        assert!(matches!(parse_price(""), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_price(".5"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_price("5."), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_price("1e3"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_price("+5"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_price("abc"), Err(MoneyError::InvalidFormat(_))));
        assert_eq!(parse_price("-1"), Err(MoneyError::Negative));
        assert_eq!(
            parse_price("1.001"),
            Err(MoneyError::PrecisionOverflow {
                provided: 3,
                max: 2
            })
        );
        assert_eq!(parse_price("100000000"), Err(MoneyError::Overflow));
        assert_eq!(parse_price("99999999.99").unwrap().to_string(), "99999999.99");
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec("100.00"), 2).unwrap(), dec("200.00"));
        assert_eq!(line_total(dec("0.33"), 3).unwrap().to_string(), "0.99");
        assert_eq!(line_total(dec("19.99"), 1).unwrap().to_string(), "19.99");
        assert_eq!(line_total(dec("50000000.00"), 2), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_strict_price_accepts_only_strings() {
        let p: StrictPrice = serde_json::from_str(r#""1.5""#).unwrap();
        assert_eq!(p.to_string(), "1.50");
        assert_eq!(serde_json::to_string(&p).unwrap(), r#""1.50""#);

        let err = serde_json::from_str::<StrictPrice>("1.5").unwrap_err();
        assert!(err.to_string().contains("expected a string"));
    }

    #[test]
    fn test_strict_price_applies_parse_rules() {
        let err = serde_json::from_str::<StrictPrice>(r#"".5""#).unwrap_err();
        assert!(err.to_string().contains("use 0.5 not .5"));

        let err = serde_json::from_str::<StrictPrice>(r#""-1.5""#).unwrap_err();
        assert!(err.to_string().contains("cannot be negative"));

        let err = serde_json::from_str::<StrictPrice>(r#""2.005""#).unwrap_err();
        assert!(err.to_string().contains("Precision overflow"));
    }
}
