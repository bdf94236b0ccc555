//! Struct and list schemas
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use super::fields::Fields;
use super::{any, typed, Convert, TypeTag};
use crate::error::{Result, SchemaError};
use crate::messages::{self, DefaultMessage, Message};
use crate::schema::{Annotation, Schema};
use crate::validation::ValidationError;
use crate::value::{Map, Value};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a mapping struct does with keys it does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeys {
    /// Copy them into the output unchanged
    Include,
    /// Drop them
    #[default]
    Exclude,
    /// Report one `unknown_field` failure per key
    Raise,
}

/// Schema producing a map of declared fields
///
/// The output is a [`Value::Map`] whose keys follow field declaration order.
/// Failures are keyed by each field's alias, so a location always names the
/// key the caller actually sent.
#[derive(Debug, Clone)]
pub struct StructSchema {
    schema: Schema,
    fields: Fields,
    aliases: Arc<IndexMap<String, String>>,
    unknown: Option<UnknownKeys>,
}

typed_handle!(StructSchema);

impl StructSchema {
    /// Struct over any map or record
    pub fn new(fields: Fields) -> Result<Self> {
        Self::build(fields, None)
    }

    /// Struct over maps only, with a policy for undeclared keys
    pub fn mapping(fields: Fields, unknown: UnknownKeys) -> Result<Self> {
        Self::build(fields, Some(unknown))
    }

    fn build(fields: Fields, unknown: Option<UnknownKeys>) -> Result<Self> {
        let aliases = Arc::new(alias_table(&fields)?);
        let tag = if unknown.is_some() {
            TypeTag::Mapping
        } else {
            TypeTag::Object
        };

        let resolver_fields = fields.clone();
        let resolver_aliases = aliases.clone();
        let schema = typed(
            tag,
            None,
            None,
            move |value| resolve(&resolver_fields, &resolver_aliases, unknown, value).map(Value::Map),
            vec![Annotation::Fields(fields.clone())],
        );

        Ok(Self {
            schema,
            fields,
            aliases,
            unknown,
        })
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// External key read for field `name`
    pub fn alias_of(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Unknown-key policy; `None` for structs that also accept records
    pub fn unknown_keys(&self) -> Option<UnknownKeys> {
        self.unknown
    }

    /// Check an invariant across several fields of the parsed output
    ///
    /// On failure the "Invalid value" message is reported under every named
    /// field, so a rule like "start before end" shows up at both ends.
    pub fn ensure_fields<F>(&self, names: &[&str], predicate: F) -> Result<Self>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.ensure_fields_impl(names, predicate, None)
    }

    pub fn ensure_fields_with<F>(&self, names: &[&str], predicate: F, message: impl Into<Message>) -> Result<Self>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.ensure_fields_impl(names, predicate, Some(message.into()))
    }

    fn ensure_fields_impl<F>(&self, names: &[&str], predicate: F, message: Option<Message>) -> Result<Self>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.fields.check_names(names)?;
        let mut targets: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if let Some(alias) = self.aliases.get(*name) {
                if !targets.contains(alias) {
                    targets.push(alias.clone());
                }
            }
        }

        let schema = self.schema.push_check(
            move |value| {
                if predicate(value) {
                    return Ok(());
                }
                let mut error = ValidationError::new();
                for alias in &targets {
                    error.attach(
                        alias.as_str(),
                        ValidationError::message(messages::render(
                            message.as_ref(),
                            &DefaultMessage::EnsureFailed,
                            value,
                        )),
                    );
                }
                Err(error)
            },
            false,
            Vec::new(),
        );

        Ok(Self {
            schema,
            fields: self.fields.clone(),
            aliases: self.aliases.clone(),
            unknown: self.unknown,
        })
    }
}

/// Field name to external key, rejecting two fields that read the same key
fn alias_table(fields: &Fields) -> Result<IndexMap<String, String>> {
    let mut owners: IndexMap<&str, &str> = IndexMap::new();
    let mut table = IndexMap::with_capacity(fields.len());
    for (name, field) in fields.iter() {
        let alias = field.alias_name().unwrap_or(name);
        if let Some(first) = owners.insert(alias, name.as_str()) {
            return Err(SchemaError::DuplicateAlias {
                alias: alias.to_string(),
                first: first.to_string(),
                second: name.clone(),
            });
        }
        table.insert(name.clone(), alias.to_string());
    }
    Ok(table)
}

fn resolve(
    fields: &Fields,
    aliases: &IndexMap<String, String>,
    unknown: Option<UnknownKeys>,
    value: &Value,
) -> std::result::Result<Map, ValidationError> {
    let mut output = Map::with_capacity(fields.len());
    let mut error = ValidationError::new();

    for (name, field) in fields.iter() {
        let alias = aliases.get(name).map_or(name.as_str(), String::as_str);
        match field.fetch(value, alias) {
            None if field.is_required() => {
                error.attach(
                    alias,
                    ValidationError::message(messages::render(
                        field.required_text(),
                        &DefaultMessage::FieldRequired,
                        &Value::Null,
                    )),
                );
            }
            None => {
                if let Some(default) = field.default_value() {
                    output.insert(name.clone(), default);
                }
            }
            Some(raw) => match field.schema().parse_ref(&raw) {
                Ok(parsed) => {
                    output.insert(name.clone(), parsed);
                }
                Err(failure) => error.attach(alias, failure),
            },
        }
    }

    if let (Some(policy), Value::Map(input)) = (unknown, value) {
        let extra = input
            .iter()
            .filter(|(key, _)| !aliases.values().any(|alias| alias == *key));
        match policy {
            UnknownKeys::Include => {
                for (key, item) in extra {
                    output.entry(key.clone()).or_insert_with(|| item.clone());
                }
            }
            UnknownKeys::Exclude => {}
            UnknownKeys::Raise => {
                for (key, _) in extra {
                    debug!("rejecting unknown key {}", key);
                    error.attach(
                        key.as_str(),
                        ValidationError::message(messages::resolve(
                            &DefaultMessage::UnknownField,
                            &Value::Str(key.clone()),
                        )),
                    );
                }
            }
        }
    }

    if error.is_empty() {
        Ok(output)
    } else {
        Err(error)
    }
}

/// Struct over any map or record
pub fn structure(fields: Fields) -> Result<StructSchema> {
    StructSchema::new(fields)
}

/// Struct over maps only
pub fn mapping(fields: Fields, unknown: UnknownKeys) -> Result<StructSchema> {
    StructSchema::mapping(fields, unknown)
}

pub(crate) fn list_schema(item: Schema, convert: Option<Convert>, message: Option<Message>) -> Schema {
    let annotation = Annotation::Items(item.clone());
    typed(
        TypeTag::List,
        convert,
        message,
        move |value| {
            let items = match value {
                Value::List(items) => items,
                other => return Ok(other.clone()),
            };
            let mut parsed = Vec::with_capacity(items.len());
            let mut error = ValidationError::new();
            for (index, raw) in items.iter().enumerate() {
                match item.parse_ref(raw) {
                    Ok(value) => parsed.push(value),
                    Err(failure) => {
                        error.attach(index, failure);
                        parsed.push(raw.clone());
                    }
                }
            }
            if error.is_empty() {
                Ok(Value::List(parsed))
            } else {
                Err(error)
            }
        },
        vec![annotation],
    )
}

/// List whose items are each parsed by `item`; failures are keyed by index
pub fn list(item: impl Into<Schema>) -> Schema {
    list_schema(item.into(), None, None)
}

pub fn list_with_message(item: impl Into<Schema>, message: impl Into<Message>) -> Schema {
    list_schema(item.into(), None, Some(message.into()))
}

/// List accepting items of any kind
pub fn any_list() -> Schema {
    list(any())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{integer, string, Field};
    use crate::validation::ErrorRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn user_fields() -> Fields {
        Fields::new()
            .with("username", Field::new(string()).alias("name"))
            .with("age", Field::new(integer()).with_default(18))
    }

    #[test]
    fn test_struct_resolves_aliases_and_defaults() {
        let schema = structure(user_fields()).unwrap();
        let parsed = schema.parse(json!({"name": "john"})).unwrap();
        assert_eq!(parsed.to_json(), json!({"username": "john", "age": 18}));
    }

    #[test]
    fn test_struct_reports_every_field() {
        let schema = structure(user_fields()).unwrap();
        let err = schema.parse(json!({"age": "old"})).unwrap_err();
        assert_eq!(
            err.format_errors(),
            vec![
                ErrorRecord::at(["name"], ["This field is required"]),
                ErrorRecord::at(["age"], ["Expected int, received str"]),
            ]
        );
    }

    #[test]
    fn test_struct_rejects_non_objects() {
        let err = structure(user_fields()).unwrap().parse(1).unwrap_err();
        assert_eq!(err.messages(), ["Expected object, received int"]);
    }

    #[test]
    fn test_duplicate_alias_is_configuration_error() {
        let fields = Fields::new()
            .with("a", Field::new(string()).alias("x"))
            .with("x", string());
        assert!(matches!(structure(fields), Err(SchemaError::DuplicateAlias { .. })));
    }

    #[test]
    fn test_mapping_unknown_key_policies() {
        let fields = || Fields::new().with("a", integer());
        let input = json!({"a": 1, "b": 2});

        let exclude = mapping(fields(), UnknownKeys::Exclude).unwrap();
        assert_eq!(exclude.parse(input.clone()).unwrap().to_json(), json!({"a": 1}));

        let include = mapping(fields(), UnknownKeys::Include).unwrap();
        assert_eq!(include.parse(input.clone()).unwrap().to_json(), json!({"a": 1, "b": 2}));

        let raise = mapping(fields(), UnknownKeys::Raise).unwrap();
        let err = raise.parse(json!({"a": "x", "b": 2})).unwrap_err();
        assert_eq!(
            err.format_errors(),
            vec![
                ErrorRecord::at(["a"], ["Expected int, received str"]),
                ErrorRecord::at(["b"], ["Unknown field"]),
            ]
        );
    }

    #[test]
    fn test_include_does_not_clobber_declared_output() {
        let fields = Fields::new().with("name", Field::new(string()).alias("n"));
        let schema = mapping(fields, UnknownKeys::Include).unwrap();
        let parsed = schema.parse(json!({"n": "kept", "name": "extra"})).unwrap();
        assert_eq!(parsed.to_json(), json!({"name": "kept"}));
    }

    #[test]
    fn test_ensure_fields_reports_under_each_alias() {
        let fields = Fields::new()
            .with("start", integer())
            .with("end", Field::new(integer()).alias("stop"));
        let schema = structure(fields)
            .unwrap()
            .ensure_fields_with(
                &["start", "end"],
                |v| v.get("start").and_then(Value::as_i64) < v.get("end").and_then(Value::as_i64),
                "start must precede end",
            )
            .unwrap();

        assert!(schema.parse(json!({"start": 1, "stop": 2})).is_ok());
        let err = schema.parse(json!({"start": 3, "stop": 2})).unwrap_err();
        assert_eq!(
            err.format_errors(),
            vec![
                ErrorRecord::at(["start"], ["start must precede end"]),
                ErrorRecord::at(["stop"], ["start must precede end"]),
            ]
        );
        assert!(structure(Fields::new()).unwrap().ensure_fields(&["ghost"], |_| true).is_err());
    }

    #[test]
    fn test_list_keys_failures_by_index() {
        let err = list(integer()).parse(json!(["1", 2, "x"])).unwrap_err();
        assert_eq!(
            err.format_errors(),
            vec![
                ErrorRecord::at([0usize], ["Expected int, received str"]),
                ErrorRecord::at([2usize], ["Expected int, received str"]),
            ]
        );
        assert_eq!(any_list().parse(json!([1, "a"])).unwrap().to_json(), json!([1, "a"]));
        assert_eq!(
            list(integer()).parse("nope").unwrap_err().messages(),
            ["Expected list, received str"]
        );
    }
}
