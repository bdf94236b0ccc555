//! Record and field descriptions
//!
//! A [`RecordDesc`] is the declaration a struct schema is derived from: an
//! ordered list of fields, each with a declared [`TypeDesc`], an optional
//! external key and an optional default.

use serde::{Deserialize, Serialize};
use sift_core::{Schema, Value};
use std::fmt;
use std::sync::Arc;

/// Declared element type of a record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeDesc {
    Str,
    Int,
    Float,
    Bool,
    DateTime,
    Any,
    None,
    List(Box<TypeDesc>),
    Optional(Box<TypeDesc>),
    Union(Vec<TypeDesc>),
    Record(String),
}

impl TypeDesc {
    pub fn list(item: TypeDesc) -> Self {
        TypeDesc::List(Box::new(item))
    }

    pub fn optional(inner: TypeDesc) -> Self {
        TypeDesc::Optional(Box::new(inner))
    }

    pub fn union(members: impl IntoIterator<Item = TypeDesc>) -> Self {
        TypeDesc::Union(members.into_iter().collect())
    }

    pub fn record(name: impl Into<String>) -> Self {
        TypeDesc::Record(name.into())
    }

    /// Names of every record this type refers to, outermost first
    pub fn records(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_records(&mut names);
        names
    }

    fn collect_records<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeDesc::Record(name) => names.push(name),
            TypeDesc::List(inner) | TypeDesc::Optional(inner) => inner.collect_records(names),
            TypeDesc::Union(members) => members.iter().for_each(|m| m.collect_records(names)),
            _ => {}
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Str => write!(f, "str"),
            TypeDesc::Int => write!(f, "int"),
            TypeDesc::Float => write!(f, "float"),
            TypeDesc::Bool => write!(f, "bool"),
            TypeDesc::DateTime => write!(f, "datetime"),
            TypeDesc::Any => write!(f, "any"),
            TypeDesc::None => write!(f, "none"),
            TypeDesc::List(inner) => write!(f, "list[{}]", inner),
            TypeDesc::Optional(inner) => write!(f, "optional[{}]", inner),
            TypeDesc::Union(members) => {
                let parts: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" | "))
            }
            TypeDesc::Record(name) => write!(f, "{}", name),
        }
    }
}

pub(crate) type Refine = Arc<dyn Fn(Schema) -> Schema + Send + Sync>;

/// One field of a record description
#[derive(Clone)]
pub struct FieldDesc {
    pub(crate) name: String,
    pub(crate) ty: TypeDesc,
    pub(crate) alias: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) schema: Option<Schema>,
    pub(crate) refine: Option<Refine>,
}

impl FieldDesc {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
            alias: None,
            default: None,
            schema: None,
            refine: None,
        }
    }

    /// Read the field from a different input key
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Default used when the key is absent; makes the field optional
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Use `schema` verbatim instead of deriving one from the declared type
    pub fn schema(mut self, schema: impl Into<Schema>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Post-process the derived schema, e.g. to append refinements
    pub fn refine<F>(mut self, refine: F) -> Self
    where
        F: Fn(Schema) -> Schema + Send + Sync + 'static,
    {
        self.refine = Some(Arc::new(refine));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

impl fmt::Debug for FieldDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDesc")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("alias", &self.alias)
            .field("default", &self.default)
            .field("schema", &self.schema.as_ref().map(ToString::to_string))
            .field("refine", &self.refine.is_some())
            .finish()
    }
}

/// Ordered description of a record type
#[derive(Debug, Clone)]
pub struct RecordDesc {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldDesc>,
}

impl RecordDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field of type `ty`
    pub fn field(self, name: impl Into<String>, ty: TypeDesc) -> Self {
        self.with_field(FieldDesc::new(name, ty))
    }

    /// Append a fully configured field
    pub fn with_field(mut self, field: FieldDesc) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDesc] {
        &self.fields
    }
}
