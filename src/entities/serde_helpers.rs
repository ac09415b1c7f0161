//! Lenient deserializers for legacy order documents
//!
//! Older clients stored numbers as locale strings (`"1,5"`), left fields
//! `null`, or wrote a single object where an array was expected. These
//! helpers coerce such values instead of rejecting the whole document.

use crate::core::locale::parse_decimal;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::str::FromStr;

fn decimal_from_number(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    // Shortest round-trip text of the float, so 1.005 stays 1.005
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn number_from(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => decimal_from_number(n),
        Value::String(s) => parse_decimal(s).ok(),
        Value::Bool(b) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
        _ => None,
    }
}

/// Number, numeric string or anything else (→ zero)
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match number_from(&value) {
        Some(n) => Ok(n),
        None => {
            if !value.is_null() {
                tracing::warn!(value = %value, "coercing malformed number to 0");
            }
            Ok(Decimal::ZERO)
        }
    }
}

/// Like [`lenient_decimal`] but keeps `null`/blank as `None`
pub fn lenient_opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        other => Ok(number_from(other)),
    }
}

/// String, number (stringified) or `null` (→ empty)
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Like [`lenient_string`] but keeps `null`/empty as `None`
pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_string(deserializer)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Array of `T`; `null`/non-arrays become empty, malformed elements are skipped
///
/// A single object where an array was expected is read as a one-element list.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let elements = match value {
        Value::Array(elements) => elements,
        Value::Null => return Ok(Vec::new()),
        Value::Object(_) => vec![value],
        other => {
            tracing::warn!(value = %other, "expected an array, ignoring value");
            return Ok(Vec::new());
        }
    };

    Ok(elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| match serde_json::from_value(element) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping malformed array element");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient_decimal")]
        amount: Decimal,
        #[serde(default, deserialize_with = "lenient_opt_decimal")]
        cost: Option<Decimal>,
        #[serde(default, deserialize_with = "lenient_string")]
        name: String,
        #[serde(default, deserialize_with = "lenient_vec")]
        tags: Vec<u32>,
    }

    #[test]
    fn test_numbers_from_strings() {
        let sample: Sample =
            serde_json::from_value(json!({"amount": "1.234,50", "cost": "10"})).unwrap();
        assert_eq!(sample.amount, dec!(1234.5));
        assert_eq!(sample.cost, Some(dec!(10)));
    }

    #[test]
    fn test_floats_are_read_exactly() {
        let sample: Sample = serde_json::from_value(json!({"amount": 1.005, "cost": 0.1})).unwrap();
        assert_eq!(sample.amount, dec!(1.005));
        assert_eq!(sample.cost, Some(dec!(0.1)));
    }

    #[test]
    fn test_garbage_becomes_defaults() {
        let sample: Sample = serde_json::from_value(
            json!({"amount": {"nested": true}, "cost": "", "name": null, "tags": "x"}),
        )
        .unwrap();
        assert_eq!(sample.amount, Decimal::ZERO);
        assert_eq!(sample.cost, None);
        assert_eq!(sample.name, "");
        assert!(sample.tags.is_empty());
    }

    #[test]
    fn test_vec_skips_bad_elements() {
        let sample: Sample = serde_json::from_value(json!({"tags": [1, "two", 3]})).unwrap();
        assert_eq!(sample.tags, vec![1, 3]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let sample: Sample = serde_json::from_value(json!({})).unwrap();
        assert_eq!(sample.amount, Decimal::ZERO);
        assert_eq!(sample.cost, None);
        assert!(sample.tags.is_empty());
    }

    #[test]
    fn test_name_from_number() {
        let sample: Sample = serde_json::from_value(json!({"name": 42})).unwrap();
        assert_eq!(sample.name, "42");
    }
}
