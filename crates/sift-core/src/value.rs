//! Dynamic value model consumed and produced by schemas
//!
//! Every schema parses a [`Value`] and returns a [`Value`]. Values are either
//! key-indexable ([`Value::Map`]) or attribute-addressable ([`Value::Record`]),
//! which is what struct schemas use to look fields up.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Insertion-ordered mapping used for map values and struct outputs
pub type Map = IndexMap<String, Value>;

/// A point in time, with or without a UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// No timezone information
    Naive(NaiveDateTime),
    /// Fixed UTC offset attached
    Aware(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Whether an offset is attached
    pub fn is_aware(&self) -> bool {
        matches!(self, Timestamp::Aware(_))
    }

    /// The wall-clock time, ignoring any offset
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Timestamp::Naive(naive) => *naive,
            Timestamp::Aware(aware) => aware.naive_local(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            Timestamp::Aware(aware) => write!(f, "{}", aware.to_rfc3339()),
        }
    }
}

/// An object exposing named members
///
/// Struct schemas fall back to [`Record::attribute`] when the input is not a
/// map, so domain types can be validated without first converting them.
pub trait Record: fmt::Debug + Send + Sync {
    /// Name reported in type-mismatch messages
    fn type_name(&self) -> &str;

    /// Look up a member by name; `None` means the member is absent
    fn attribute(&self, name: &str) -> Option<Value>;

    /// JSON projection used by [`Value::to_json`]
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// A dynamically typed value
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(Timestamp),
    List(Vec<Value>),
    Map(Map),
    Record(Arc<dyn Record>),
}

impl Value {
    /// Runtime type name used in messages
    pub fn kind_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(record) => record.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers are widened; other kinds return `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            Value::DateTime(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Map lookup; `None` for non-maps and missing keys
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Quoted rendering used when a value is embedded in a message
    pub fn repr(&self) -> Repr<'_> {
        Repr(self)
    }

    /// Project into JSON; datetimes become ISO-8601 strings
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(ts) => serde_json::Value::String(ts.to_string()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Record(record) => record.to_json(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Records have no structural equality; identity is the best we can do
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::DateTime(ts) => write!(f, "{}", ts),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, item.repr())?;
                }
                write!(f, "}}")
            }
            Value::Record(record) => write!(f, "<{}>", record.type_name()),
        }
    }
}

/// Display adapter returned by [`Value::repr`]
pub struct Repr<'a>(&'a Value);

impl fmt::Display for Repr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::DateTime(ts) => write!(f, "{:?}", ts.to_string()),
            other => write!(f, "{}", other),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Numeric operand of range refinements
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{:?}", x),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Int(i)
    }
}

impl From<i32> for Number {
    fn from(i: i32) -> Self {
        Number::Int(i64::from(i))
    }
}

impl From<u32> for Number {
    fn from(i: u32) -> Self {
        Number::Int(i64::from(i))
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}

impl From<Number> for serde_json::Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => serde_json::Value::from(i),
            Number::Float(f) => serde_json::Value::from(f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        i64::try_from(i).map(Value::Int).unwrap_or(Value::Float(i as f64))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::DateTime(ts)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(Timestamp::Naive(dt))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(Timestamp::Aware(dt))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Arc<dyn Record>> for Value {
    fn from(record: Arc<dyn Record>) -> Self {
        Value::Record(record)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from(json.clone())
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[derive(Debug)]
    struct Point {
        x: i64,
    }

    impl Record for Point {
        fn type_name(&self) -> &str {
            "Point"
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            (name == "x").then(|| Value::Int(self.x))
        }
    }

    #[test]
    fn test_json_round_trip_preserves_shape() {
        let json = json!({"name": "john", "tags": ["a", 1, 2.5, null, true]});
        let value = Value::from(json.clone());
        assert_eq!(value.to_json(), json);
        assert_eq!(value.get("name"), Some(&Value::from("john")));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Null.kind_name(), "null");
        assert_eq!(Value::from(1).kind_name(), "int");
        assert_eq!(Value::from("x").kind_name(), "str");
        let record: Arc<dyn Record> = Arc::new(Point { x: 1 });
        assert_eq!(Value::from(record).kind_name(), "Point");
    }

    #[test]
    fn test_repr_quotes_strings() {
        assert_eq!(Value::from("2.1").repr().to_string(), "\"2.1\"");
        assert_eq!(Value::from(1.0).repr().to_string(), "1.0");
        assert_eq!(
            Value::List(vec![Value::from("a"), Value::from(1)]).to_string(),
            "[\"a\", 1]"
        );
    }

    #[test]
    fn test_timestamp_awareness() {
        let naive = NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let aware = DateTime::parse_from_rfc3339("2000-01-01T00:00:00+08:00").unwrap();
        assert!(!Timestamp::Naive(naive).is_aware());
        assert!(Timestamp::Aware(aware).is_aware());
        assert_eq!(Timestamp::Aware(aware).naive_local(), naive);
    }

    #[test]
    fn test_number_ordering() {
        assert!(Number::Int(3) > Number::Int(2));
        assert!(Number::Float(2.5) > Number::Int(2));
        assert!(Number::Int(2) <= Number::Float(2.0));
    }

    #[test]
    fn test_record_equality_is_identity() {
        let a: Arc<dyn Record> = Arc::new(Point { x: 1 });
        let b: Arc<dyn Record> = Arc::new(Point { x: 1 });
        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a), Value::from(b));
    }
}
