//! Struct fields and field-set algebra
//!
//! A [`Field`] describes how one output key of a struct is populated. A
//! [`Fields`] collection is immutable from the point of view of the free
//! functions in this module: [`required`], [`optional`], [`pick`] and
//! [`omit`] all return a new collection and reject unknown field names
//! immediately.
//!
//! ```
//! use sift_core::fields::{self, Fields};
//! use sift_core::{integer, string};
//!
//! let user = Fields::new().with("name", string()).with("age", integer());
//! let patch = fields::optional(&user, None).unwrap();
//! assert!(patch.iter().all(|(_, field)| !field.is_required()));
//! assert!(fields::pick(&user, &["nickname"]).is_err());
//! ```

use crate::error::{Result, SchemaError};
use crate::messages::Message;
use crate::schema::{Lazy, Schema};
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

type Getter = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;
type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

#[derive(Clone)]
enum FieldDefault {
    Unset,
    Value(Value),
    Factory(DefaultFactory),
}

/// How one struct output key is populated
#[derive(Clone)]
pub struct Field {
    schema: Schema,
    alias: Option<String>,
    getter: Option<Getter>,
    required: bool,
    required_message: Option<Message>,
    default: FieldDefault,
}

impl Field {
    /// A required field parsed by `schema`
    pub fn new(schema: impl Into<Schema>) -> Self {
        Self {
            schema: schema.into(),
            alias: None,
            getter: None,
            required: true,
            required_message: None,
            default: FieldDefault::Unset,
        }
    }

    /// Read the value from `alias` instead of the field name
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Custom lookup; returning `None` means the value is absent
    pub fn getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }

    /// Absent values are skipped instead of reported
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Optional, filling `value` in when absent
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.required = false;
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Optional, calling `factory` for a fresh value each time it is absent
    pub fn with_default_fn<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.required = false;
        self.default = FieldDefault::Factory(Arc::new(factory));
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Required, reporting `message` when absent
    pub fn required_message(mut self, message: impl Into<Message>) -> Self {
        self.required = true;
        self.required_message = Some(message.into());
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn has_default(&self) -> bool {
        !matches!(self.default, FieldDefault::Unset)
    }

    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    /// Resolve the default, calling the factory if there is one
    pub fn default_value(&self) -> Option<Value> {
        match &self.default {
            FieldDefault::Unset => None,
            FieldDefault::Value(value) => Some(value.clone()),
            FieldDefault::Factory(factory) => Some(factory()),
        }
    }

    pub(crate) fn required_text(&self) -> Option<&Message> {
        self.required_message.as_ref()
    }

    /// Fetch the raw value for `key` from `input`
    ///
    /// Maps are looked up by key and records by attribute; anything else has
    /// no fields at all.
    pub(crate) fn fetch(&self, input: &Value, key: &str) -> Option<Value> {
        if let Some(getter) = &self.getter {
            return getter(input);
        }
        match input {
            Value::Map(map) => map.get(key).cloned(),
            Value::Record(record) => record.attribute(key),
            _ => None,
        }
    }

    /// Copy with the given requiredness; a field made optional loses its
    /// default and is left out of the output when absent
    fn with_required(&self, required: bool) -> Self {
        let mut field = self.clone();
        field.required = required;
        if !required {
            field.default = FieldDefault::Unset;
        }
        field
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("schema", &self.schema)
            .field("alias", &self.alias)
            .field("required", &self.required)
            .field("has_default", &self.has_default())
            .field("has_getter", &self.has_getter())
            .finish()
    }
}

impl From<Schema> for Field {
    fn from(schema: Schema) -> Self {
        Field::new(schema)
    }
}

impl From<&Schema> for Field {
    fn from(schema: &Schema) -> Self {
        Field::new(schema.clone())
    }
}

impl From<Lazy> for Field {
    fn from(lazy: Lazy) -> Self {
        Field::new(lazy.schema())
    }
}

/// Insertion-ordered collection of named fields
#[derive(Clone, Default)]
pub struct Fields {
    inner: IndexMap<String, Field>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.inner.insert(name.into(), field.into());
        self
    }

    /// Insert or replace a field, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, field: impl Into<Field>) -> Option<Field> {
        self.inner.insert(name.into(), field.into())
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.inner.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.inner.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// External key read for field `name`
    pub fn alias_of(&self, name: &str) -> Option<&str> {
        self.inner
            .get_key_value(name)
            .map(|(name, field)| field.alias_name().unwrap_or(name))
    }

    pub(crate) fn check_names(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|name| !self.contains(name)) {
            Some(unknown) => Err(SchemaError::unknown_field(*unknown, self.names())),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.iter()).finish()
    }
}

impl<K, F> FromIterator<(K, F)> for Fields
where
    K: Into<String>,
    F: Into<Field>,
{
    fn from_iter<I: IntoIterator<Item = (K, F)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|(k, f)| (k.into(), f.into())).collect(),
        }
    }
}

impl IntoIterator for Fields {
    type Item = (String, Field);
    type IntoIter = indexmap::map::IntoIter<String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a Field);
    type IntoIter = indexmap::map::Iter<'a, String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

/// Make the named fields required and every other field optional
///
/// `None` makes every field required.
pub fn required(fields: &Fields, names: Option<&[&str]>) -> Result<Fields> {
    if let Some(names) = names {
        fields.check_names(names)?;
    }
    Ok(fields
        .iter()
        .map(|(name, field)| {
            let is_required = names.map_or(true, |names| names.contains(&name.as_str()));
            (name.clone(), field.with_required(is_required))
        })
        .collect())
}

/// Make the named fields optional and every other field required
///
/// `None` makes every field optional. Fields made optional drop their
/// defaults.
pub fn optional(fields: &Fields, names: Option<&[&str]>) -> Result<Fields> {
    match names {
        None => required(fields, Some(&[])),
        Some(names) => {
            fields.check_names(names)?;
            let complement: Vec<&str> = fields.names().filter(|name| !names.contains(name)).collect();
            required(fields, Some(complement.as_slice()))
        }
    }
}

/// Keep only the named fields, in the order given
pub fn pick(fields: &Fields, names: &[&str]) -> Result<Fields> {
    fields.check_names(names)?;
    Ok(names
        .iter()
        .filter_map(|name| fields.get(name).map(|field| (name.to_string(), field.clone())))
        .collect())
}

/// Drop the named fields, keeping declaration order
pub fn omit(fields: &Fields, names: &[&str]) -> Result<Fields> {
    fields.check_names(names)?;
    Ok(fields
        .iter()
        .filter(|(name, _)| !names.contains(&name.as_str()))
        .map(|(name, field)| (name.clone(), field.clone()))
        .collect())
}
