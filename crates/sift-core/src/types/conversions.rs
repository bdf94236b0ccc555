//! Coercing schemas
//!
//! Each constructor here mirrors a plain typed schema but converts the input
//! before the type check runs. A value that cannot be converted produces a
//! `type_conversion` failure such as `Cannot convert the value "2.1" to int`.
//!
//! ```
//! use sift_core::{to, Value};
//!
//! assert_eq!(to::integer().parse("2.0").unwrap(), Value::Int(2));
//! assert!(to::integer().parse("2.1").is_err());
//! assert_eq!(to::string().parse(1).unwrap(), Value::from("1"));
//! ```
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use super::primitives::{DateTimeSchema, NumberSchema, StringSchema};
use super::structures::list_schema;
use super::TypeTag;
use crate::messages::Message;
use crate::schema::Schema;
use crate::value::{Timestamp, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Largest magnitude at which every integer is exactly representable as f64
const EXACT_F64_LIMIT: f64 = 9_007_199_254_740_992.0;

const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

fn exact_integer(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= EXACT_F64_LIMIT).then(|| f as i64)
}

fn convert_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Int(i) => Some(Value::Int(*i)),
        Value::Bool(b) => Some(Value::Int(i64::from(*b))),
        Value::Float(f) => exact_integer(*f).map(Value::Int),
        Value::Str(s) => {
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                return s.parse::<i64>().ok().map(Value::Int);
            }
            let parsed = s.trim().parse::<f64>().ok()?;
            exact_integer(parsed).map(Value::Int)
        }
        _ => None,
    }
}

fn convert_float(value: &Value) -> Option<Value> {
    match value {
        Value::Float(f) => Some(Value::Float(*f)),
        Value::Int(i) => Some(Value::Float(*i as f64)),
        Value::Bool(b) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Str(s) => s.trim().parse::<f64>().ok().map(Value::Float),
        _ => None,
    }
}

fn convert_string(value: &Value) -> Option<Value> {
    match value {
        Value::Str(s) => Some(Value::Str(s.clone())),
        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::DateTime(_) => {
            Some(Value::Str(value.to_string()))
        }
        _ => None,
    }
}

fn convert_list(value: &Value) -> Option<Value> {
    match value {
        Value::List(items) => Some(Value::List(items.clone())),
        Value::Str(s) => Some(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        Value::Map(map) => Some(map.keys().map(|k| Value::Str(k.clone())).collect()),
        _ => None,
    }
}

/// Parse an ISO-8601 datetime, extended or basic format, with or without offset
pub fn parse_iso8601(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if let Ok(aware) = DateTime::parse_from_rfc3339(text) {
        return Some(Timestamp::Aware(aware));
    }
    for format in AWARE_FORMATS {
        if let Ok(aware) = DateTime::parse_from_str(text, format) {
            return Some(Timestamp::Aware(aware));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Timestamp::Naive(naive));
        }
    }
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Timestamp::Naive)
    })
}

fn convert_datetime(value: &Value) -> Option<Value> {
    match value {
        Value::DateTime(ts) => Some(Value::DateTime(*ts)),
        Value::Str(s) => parse_iso8601(s).map(Value::DateTime),
        _ => None,
    }
}

/// Integers from ints, booleans, and strings or floats that round-trip exactly
pub fn integer() -> NumberSchema {
    NumberSchema::build(TypeTag::Integer, Some(convert_integer), None)
}

pub fn integer_with_message(message: impl Into<Message>) -> NumberSchema {
    NumberSchema::build(TypeTag::Integer, Some(convert_integer), Some(message.into()))
}

/// Floats from numbers, booleans and numeric strings
pub fn float() -> NumberSchema {
    NumberSchema::build(TypeTag::Float, Some(convert_float), None)
}

pub fn float_with_message(message: impl Into<Message>) -> NumberSchema {
    NumberSchema::build(TypeTag::Float, Some(convert_float), Some(message.into()))
}

/// Strings from scalars via their display form
pub fn string() -> StringSchema {
    StringSchema::build(Some(convert_string), None)
}

pub fn string_with_message(message: impl Into<Message>) -> StringSchema {
    StringSchema::build(Some(convert_string), Some(message.into()))
}

/// Lists from lists, strings (one item per character) and maps (their keys)
pub fn list(item: impl Into<Schema>) -> Schema {
    list_schema(item.into(), Some(convert_list), None)
}

pub fn list_with_message(item: impl Into<Schema>, message: impl Into<Message>) -> Schema {
    list_schema(item.into(), Some(convert_list), Some(message.into()))
}

/// Datetimes from ISO-8601 strings
pub fn datetime() -> DateTimeSchema {
    DateTimeSchema::build(Some(convert_datetime), None)
}

pub fn datetime_with_message(message: impl Into<Message>) -> DateTimeSchema {
    DateTimeSchema::build(Some(convert_datetime), Some(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::any;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_integer_exactness() {
        assert_eq!(integer().parse("2.0").unwrap(), Value::Int(2));
        assert_eq!(integer().parse("42").unwrap(), Value::Int(42));
        assert_eq!(integer().parse("-3").unwrap(), Value::Int(-3));
        assert_eq!(integer().parse(3.0).unwrap(), Value::Int(3));
        assert_eq!(integer().parse(true).unwrap(), Value::Int(1));
        assert_eq!(
            integer().parse("2.1").unwrap_err().messages(),
            ["Cannot convert the value \"2.1\" to int"]
        );
        assert!(integer().parse(1.1).is_err());
        assert!(integer().parse("abc").is_err());
        assert!(integer().parse("inf").is_err());
    }

    #[test]
    fn test_integer_refinements_apply_after_conversion() {
        let schema = integer().gte(10);
        assert_eq!(schema.parse("12").unwrap(), Value::Int(12));
        assert_eq!(
            schema.parse("5").unwrap_err().messages(),
            ["The value should be greater than or equal to 10"]
        );
    }

    #[test]
    fn test_float_and_string() {
        assert_eq!(float().parse("1").unwrap(), Value::Float(1.0));
        assert_eq!(float().parse(2).unwrap(), Value::Float(2.0));
        assert!(float().parse("x").is_err());
        assert_eq!(string().parse(1).unwrap(), Value::from("1"));
        assert_eq!(string().parse(1.5).unwrap(), Value::from("1.5"));
        assert!(string().parse(Value::Null).is_err());
    }

    #[test]
    fn test_list_conversion() {
        assert_eq!(
            list(any()).parse("ab").unwrap(),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
        assert!(list(any()).parse(1).is_err());
    }

    #[test]
    fn test_datetime_formats() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let expected = offset.with_ymd_and_hms(2004, 5, 3, 17, 30, 8).unwrap();
        assert_eq!(
            parse_iso8601("20040503T173008+08"),
            Some(Timestamp::Aware(expected))
        );
        assert_eq!(
            parse_iso8601("2004-05-03T17:30:08+08:00"),
            Some(Timestamp::Aware(expected))
        );
        assert!(matches!(parse_iso8601("2004-05-03 17:30:08"), Some(Timestamp::Naive(_))));
        assert!(matches!(parse_iso8601("2004-05-03"), Some(Timestamp::Naive(_))));
        assert_eq!(parse_iso8601("yesterday"), None);
    }

    #[test]
    fn test_datetime_schema_with_awareness() {
        assert!(datetime().is_aware().parse("2000-01-01T00:00:00Z").is_ok());
        assert!(datetime().is_aware().parse("2000-01-01T00:00:00").is_err());
        assert_eq!(
            datetime().parse("nope").unwrap_err().messages(),
            ["Cannot convert the value \"nope\" to datetime"]
        );
    }
}
