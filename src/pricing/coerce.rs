//! Lenient decoding of backend pricing fields.
//!
//! Catalog records arrive from the backend with loosely typed numbers: `"1200"`,
//! `1200`, `null` and missing fields all show up in practice. These helpers
//! turn whatever is there into an `Option` that [`coerce`] then folds to `0`.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::DiscountTag;

/// Folds an optional number to `0` when absent or NaN.
pub fn coerce(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_string(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Parses a string with the numeric-literal grammar browsers use for
/// `Number(s)`: decimals with optional exponent, `Infinity` with an optional
/// sign, and unsigned `0x`/`0o`/`0b` integers. Blank strings are `0`.
pub fn parse_numeric_string(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&s[2..], radix);
    }

    let (sign, unsigned) = if let Some(rest) = s.strip_prefix('-') {
        (-1.0, rest)
    } else {
        (1.0, s.strip_prefix('+').unwrap_or(s))
    };
    if unsigned == "Infinity" {
        return Some(sign * f64::INFINITY);
    }
    if is_decimal_literal(unsigned) {
        s.parse::<f64>().ok()
    } else {
        None
    }
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d)))
}

fn is_decimal_literal(s: &str) -> bool {
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mantissa_ok = all_digits(int_part) && all_digits(frac_part) && !(int_part.is_empty() && frac_part.is_empty());
    let exponent_ok = match exponent {
        None => true,
        Some(e) => {
            let digits = e.strip_prefix('+').or_else(|| e.strip_prefix('-')).unwrap_or(e);
            !digits.is_empty() && all_digits(digits)
        }
    };
    mantissa_ok && exponent_ok
}

/// Accepts numbers, numeric strings and booleans; anything else decodes to `None`.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Decodes a record id sent either as a string or as a number.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::custom(format!("expected a string or number id, found {}", other))),
    }
}

/// Like [`lenient_id`], with `null` and missing fields decoding to `None`.
pub fn lenient_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(Error::custom(format!("expected a string or number id, found {}", other))),
    }
}

/// Decodes `discount_type`. Empty and falsy values count as absent; any other
/// value that is not a known tag is kept as [`DiscountTag::Unrecognized`].
pub fn lenient_discount_tag<'de, D>(deserializer: D) -> Result<Option<DiscountTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let tag = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match s.as_str() {
            "" => None,
            "percentage" => Some(DiscountTag::Percentage),
            "amount" => Some(DiscountTag::Amount),
            _ => Some(DiscountTag::Unrecognized),
        },
        Some(Value::Bool(false)) => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(_) => Some(DiscountTag::Unrecognized),
    };
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceFields;

    #[test]
    fn test_coerce_nan_and_missing() {
        assert_eq!(coerce(None), 0.0);
        assert_eq!(coerce(Some(f64::NAN)), 0.0);
        assert_eq!(coerce(Some(12.5)), 12.5);
    }

    #[test]
    fn test_numeric_strings() {
        let f: PriceFields = serde_json::from_str(r#"{"price":" 1200 ","discount":"10","discount_amount":"abc"}"#).unwrap();
        assert_eq!(f.price, Some(1200.0));
        assert_eq!(f.discount, Some(10.0));
        assert_eq!(f.discount_amount, None);
    }

    #[test]
    fn test_numeric_string_grammar() {
        assert_eq!(parse_numeric_string("inf"), None);
        assert_eq!(parse_numeric_string("infinity"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
        assert_eq!(parse_numeric_string("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_numeric_string("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_numeric_string("0x10"), Some(16.0));
        assert_eq!(parse_numeric_string("0o17"), Some(15.0));
        assert_eq!(parse_numeric_string("0b101"), Some(5.0));
        assert_eq!(parse_numeric_string("-0x10"), None);
        assert_eq!(parse_numeric_string("0x"), None);
        assert_eq!(parse_numeric_string("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_string("-2.5E-1"), Some(-0.25));
        assert_eq!(parse_numeric_string(".5"), Some(0.5));
        assert_eq!(parse_numeric_string("5."), Some(5.0));
        assert_eq!(parse_numeric_string("."), None);
        assert_eq!(parse_numeric_string("1e"), None);
        assert_eq!(parse_numeric_string("12px"), None);
        assert_eq!(parse_numeric_string("   "), Some(0.0));
    }

    #[test]
    fn test_unparsed_strings_price_as_zero() {
        let f: PriceFields = serde_json::from_str(r#"{"price":"inf","discount":10}"#).unwrap();
        assert_eq!(coerce(f.price), 0.0);
        let f: PriceFields = serde_json::from_str(r#"{"price":"0x10"}"#).unwrap();
        assert_eq!(f.price, Some(16.0));
    }

    #[derive(Debug, serde::Deserialize)]
    struct Ids {
        #[serde(deserialize_with = "lenient_id")]
        id: String,
        #[serde(default, deserialize_with = "lenient_optional_id")]
        variant_id: Option<String>,
    }

    #[test]
    fn test_lenient_ids() {
        let ids: Ids = serde_json::from_str(r#"{"id":42,"variant_id":"V1"}"#).unwrap();
        assert_eq!(ids.id, "42");
        assert_eq!(ids.variant_id.as_deref(), Some("V1"));
        let ids: Ids = serde_json::from_str(r#"{"id":"P1","variant_id":7}"#).unwrap();
        assert_eq!(ids.variant_id.as_deref(), Some("7"));
        let ids: Ids = serde_json::from_str(r#"{"id":"P1","variant_id":null}"#).unwrap();
        assert_eq!(ids.variant_id, None);
        assert!(serde_json::from_str::<Ids>(r#"{"id":true}"#).is_err());
    }

    #[test]
    fn test_null_and_missing_fields() {
        let f: PriceFields = serde_json::from_str(r#"{"price":null,"discount_type":null}"#).unwrap();
        assert_eq!(f.price, None);
        assert_eq!(f.discount, None);
        assert_eq!(f.discount_type, None);
    }

    #[test]
    fn test_discount_tag_values() {
        let f: PriceFields = serde_json::from_str(r#"{"price":1,"discount_type":""}"#).unwrap();
        assert_eq!(f.discount_type, None);
        let f: PriceFields = serde_json::from_str(r#"{"price":1,"discount_type":"amount"}"#).unwrap();
        assert_eq!(f.discount_type, Some(DiscountTag::Amount));
        let f: PriceFields = serde_json::from_str(r#"{"price":1,"discount_type":"fixed"}"#).unwrap();
        assert_eq!(f.discount_type, Some(DiscountTag::Unrecognized));
    }
}
