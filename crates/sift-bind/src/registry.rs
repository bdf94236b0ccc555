//! Record registry and struct schema derivation
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use crate::desc::{FieldDesc, RecordDesc, TypeDesc};
use crate::error::{BindError, Result};
use indexmap::IndexMap;
use log::{debug, trace};
use sift_core::{any, boolean, datetime, float, integer, list, null, string, union, Field, Fields, Lazy, Schema, StructSchema};
use std::collections::HashMap;

/// Named record descriptions that struct schemas are derived from
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: IndexMap<String, RecordDesc>,
}

/// Bookkeeping for one `derive` call
#[derive(Default)]
struct Derivation {
    /// Records currently being built, with the reference handed out for
    /// each one that refers back to itself
    in_progress: HashMap<String, Option<Lazy>>,
    built: HashMap<String, StructSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record description
    pub fn register(&mut self, record: RecordDesc) -> Result<&mut Self> {
        if self.records.contains_key(&record.name) {
            return Err(BindError::DuplicateRecord { name: record.name });
        }
        debug!("Registered record {} with {} fields", record.name, record.fields.len());
        self.records.insert(record.name.clone(), record);
        Ok(self)
    }

    /// Builder-style variant of [`Registry::register`]
    pub fn with(mut self, record: RecordDesc) -> Result<Self> {
        self.register(record)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&RecordDesc> {
        self.records.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Derive the struct schema for the record `name`
    ///
    /// Nested records are derived recursively. A record that refers back to
    /// one still being built gets a lazy reference, defined as soon as that
    /// record's schema is complete, so self and mutual recursion both work.
    pub fn derive(&self, name: &str) -> Result<StructSchema> {
        let mut derivation = Derivation::default();
        self.derive_record(name, &mut derivation)
    }

    fn derive_record(&self, name: &str, derivation: &mut Derivation) -> Result<StructSchema> {
        if let Some(schema) = derivation.built.get(name) {
            return Ok(schema.clone());
        }
        let record = self.records.get(name).ok_or_else(|| BindError::UnknownRecord {
            name: name.to_string(),
        })?;

        derivation.in_progress.insert(name.to_string(), None);
        let mut fields = Fields::new();
        for desc in &record.fields {
            let field = self.derive_field(desc, derivation)?;
            fields.insert(desc.name.clone(), field);
        }
        let schema = StructSchema::new(fields)?;

        if let Some(Some(reference)) = derivation.in_progress.remove(name) {
            trace!("Closing recursive reference to {}", name);
            reference.define(&schema)?;
        }
        derivation.built.insert(name.to_string(), schema.clone());
        debug!("Derived struct schema for record {}", name);
        Ok(schema)
    }

    fn derive_field(&self, desc: &FieldDesc, derivation: &mut Derivation) -> Result<Field> {
        let mut schema = match &desc.schema {
            Some(schema) => schema.clone(),
            None => self.resolve(&desc.name, &desc.ty, derivation)?,
        };
        if let Some(refine) = &desc.refine {
            schema = refine(schema);
        }

        let mut field = Field::new(schema);
        if let Some(alias) = &desc.alias {
            field = field.alias(alias.clone());
        }
        if let Some(default) = &desc.default {
            field = field.with_default(default.clone());
        }
        Ok(field)
    }

    fn resolve(&self, field: &str, ty: &TypeDesc, derivation: &mut Derivation) -> Result<Schema> {
        let schema: Schema = match ty {
            TypeDesc::Str => string().into(),
            TypeDesc::Int => integer().into(),
            TypeDesc::Float => float().into(),
            TypeDesc::Bool => boolean(),
            TypeDesc::DateTime => datetime().into(),
            TypeDesc::Any => any(),
            TypeDesc::None => null(),
            TypeDesc::List(item) => list(self.resolve(field, item, derivation)?),
            TypeDesc::Optional(inner) => union(self.resolve(field, inner, derivation)?, null()),
            TypeDesc::Union(members) => {
                let mut schemas = members
                    .iter()
                    .map(|member| self.resolve(field, member, derivation))
                    .collect::<Result<Vec<_>>>()?
                    .into_iter();
                let first = schemas.next().ok_or_else(|| BindError::EmptyUnion {
                    field: field.to_string(),
                })?;
                schemas.fold(first, union)
            }
            TypeDesc::Record(name) => match derivation.in_progress.get_mut(name) {
                Some(reference) => reference.get_or_insert_with(|| Lazy::new(name.clone())).schema(),
                None => self.derive_record(name, derivation)?.into(),
            },
        };
        Ok(schema)
    }
}
