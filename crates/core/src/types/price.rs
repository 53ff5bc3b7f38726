//! Canonical decimal price parsing.
//!
//! The catalog collaborator historically served prices in several shapes:
//! a JSON number, a numeric string, or a document-store decimal wrapper
//! (`{"$numberDecimal": "12.34"}`). Every ingestion boundary goes through
//! [`parse_price`] so the rest of the system only ever sees an exact
//! [`Decimal`] - money arithmetic never touches binary floating point.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Errors from the canonical price parser.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceParseError {
    /// The field was absent or JSON null.
    #[error("price is missing")]
    Missing,

    /// The value could not be interpreted as a decimal.
    #[error("unparseable price: {0}")]
    Invalid(String),
}

/// Parse any of the accepted price representations into an exact decimal.
///
/// Accepted shapes:
/// - JSON number: `12.34`
/// - numeric string: `"12.34"`
/// - tagged decimal wrapper: `{"$numberDecimal": "12.34"}`
///
/// # Errors
///
/// Returns [`PriceParseError::Missing`] for null, and
/// [`PriceParseError::Invalid`] for anything that is not one of the
/// accepted shapes or does not parse as a decimal.
pub fn parse_price(value: &Value) -> Result<Decimal, PriceParseError> {
    match value {
        Value::Null => Err(PriceParseError::Missing),
        // Go through the textual representation so the decimal is exact
        // with respect to what was serialized, not to an f64 round-trip.
        Value::Number(n) => {
            Decimal::from_str(&n.to_string()).map_err(|_| PriceParseError::Invalid(n.to_string()))
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(PriceParseError::Missing);
            }
            Decimal::from_str(trimmed).map_err(|_| PriceParseError::Invalid(s.clone()))
        }
        Value::Object(map) => match map.get("$numberDecimal") {
            Some(Value::String(s)) => {
                Decimal::from_str(s.trim()).map_err(|_| PriceParseError::Invalid(s.clone()))
            }
            _ => Err(PriceParseError::Invalid(value.to_string())),
        },
        _ => Err(PriceParseError::Invalid(value.to_string())),
    }
}

/// Serde adapter applying [`parse_price`] to an optional field.
///
/// Absent fields and nulls deserialize to `None`; any present value must
/// parse, otherwise deserialization of the whole payload fails.
///
/// # Errors
///
/// Returns a deserialization error when a present value is not one of the
/// accepted price shapes.
pub fn deserialize_optional_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match parse_price(&v) {
            Ok(d) => Ok(Some(d)),
            Err(PriceParseError::Missing) => Ok(None),
            Err(e) => Err(serde::de::Error::custom(e)),
        },
    }
}
