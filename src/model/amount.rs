//! Amount type for rupee values as they travel to and from the EzPay service.
//!
//! The service sends amounts as JSON numbers (sometimes as strings). Users type them with or
//! without the `Rs.` prefix and thousands separators. Both are normalized into a `Decimal`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The prefix used when displaying an amount.
pub const RUPEE_PREFIX: &str = "Rs.";

/// Represents a rupee amount.
///
/// # Examples
///
/// ```
/// # use ezpay_history::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("Rs. 1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "Rs. 1,250.50");
/// assert_eq!(amount.plain(), "1250.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.is_zero()
    }

    /// The amount rounded to two places, without prefix or separators, e.g. `1250.00`.
    pub fn plain(&self) -> String {
        format!("{:.2}", self.value.round_dp(2))
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid amount: {}", self.0)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        // "Rs. 50", "Rs.50", "Rs 50" and "₹50" are all accepted
        let without_prefix = unsigned
            .strip_prefix(RUPEE_PREFIX)
            .or_else(|| unsigned.strip_prefix("Rs"))
            .or_else(|| unsigned.strip_prefix('₹'))
            .unwrap_or(unsigned)
            .trim_start();

        let without_commas = without_prefix.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount::new(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.value.abs().round_dp(2);
        write!(
            f,
            "{sign}{RUPEE_PREFIX} {}",
            format_num::format_num!(",.2", abs.to_f64().unwrap_or_default())
        )
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // The service models amounts as doubles
        serializer.serialize_f64(self.value.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a string containing an amount")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        // Going through the shortest round-trip string keeps 0.1 as 0.1
        Decimal::from_str(&v.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(v))
            .map(Amount::new)
            .ok_or_else(|| E::custom(format!("amount {v} is out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("500").unwrap();
        assert_eq!(amount.value(), dec("500"));
    }

    #[test]
    fn test_parse_with_prefix_and_commas() {
        assert_eq!(Amount::from_str("Rs. 1,250.50").unwrap().value(), dec("1250.50"));
        assert_eq!(Amount::from_str("Rs.1250").unwrap().value(), dec("1250"));
        assert_eq!(Amount::from_str("₹99.99").unwrap().value(), dec("99.99"));
    }

    #[test]
    fn test_parse_negative() {
        let amount = Amount::from_str("-Rs. 20").unwrap();
        assert!(amount.is_negative());
        assert_eq!(amount.to_string(), "-Rs. 20.00");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
    }

    #[test]
    fn test_parse_empty_is_zero() {
        assert!(Amount::from_str("  ").unwrap().is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::new(dec("1234567.891")).to_string(), "Rs. 1,234,567.89");
        assert_eq!(Amount::new(Decimal::ZERO).to_string(), "Rs. 0.00");
    }

    #[test]
    fn test_deserialize_number() {
        let amount: Amount = serde_json::from_str("2500.75").unwrap();
        assert_eq!(amount.value(), dec("2500.75"));
        let amount: Amount = serde_json::from_str("300").unwrap();
        assert_eq!(amount.value(), dec("300"));
    }

    #[test]
    fn test_deserialize_string() {
        let amount: Amount = serde_json::from_str("\"1,000.00\"").unwrap();
        assert_eq!(amount.value(), dec("1000"));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&Amount::new(dec("750.5"))).unwrap();
        assert_eq!(json, "750.5");
    }

    #[test]
    fn test_is_positive() {
        assert!(Amount::from_str("1").unwrap().is_positive());
        assert!(!Amount::from_str("0").unwrap().is_positive());
        assert!(!Amount::from_str("-1").unwrap().is_positive());
    }
}
