//! Primitive leaf schemas and their refinements

use super::{passthrough, typed, Convert, TypeTag};
use crate::error::{Result, SchemaError};
use crate::messages::{DefaultMessage, Message};
use crate::schema::{Annotation, Schema};
use crate::value::{Number, Value};
use regex::Regex;

/// Schema for strings, with length and pattern refinements
#[derive(Debug, Clone)]
pub struct StringSchema {
    schema: Schema,
}

typed_handle!(StringSchema);

impl StringSchema {
    pub(crate) fn build(convert: Option<Convert>, message: Option<Message>) -> Self {
        Self {
            schema: typed(TypeTag::String, convert, message, passthrough, Vec::new()),
        }
    }

    fn refine<F>(&self, predicate: F, message: Option<Message>, fallback: DefaultMessage, annotation: Annotation) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            schema: self.schema.ensure_builtin(
                move |value| value.as_str().map_or(false, &predicate),
                message,
                fallback,
                vec![annotation],
            ),
        }
    }

    /// At least `min` characters
    pub fn min(&self, min: usize) -> Self {
        self.refine(
            move |s| s.chars().count() >= min,
            None,
            DefaultMessage::StrMin { min },
            Annotation::MinLength(min),
        )
    }

    pub fn min_with(&self, min: usize, message: impl Into<Message>) -> Self {
        self.refine(
            move |s| s.chars().count() >= min,
            Some(message.into()),
            DefaultMessage::StrMin { min },
            Annotation::MinLength(min),
        )
    }

    /// At most `max` characters
    pub fn max(&self, max: usize) -> Self {
        self.refine(
            move |s| s.chars().count() <= max,
            None,
            DefaultMessage::StrMax { max },
            Annotation::MaxLength(max),
        )
    }

    pub fn max_with(&self, max: usize, message: impl Into<Message>) -> Self {
        self.refine(
            move |s| s.chars().count() <= max,
            Some(message.into()),
            DefaultMessage::StrMax { max },
            Annotation::MaxLength(max),
        )
    }

    /// The string must contain a match of `pattern`
    ///
    /// Anchor the expression (`^...$`) to require a full match.
    pub fn pattern(&self, pattern: &str) -> Result<Self> {
        self.pattern_impl(pattern, None)
    }

    pub fn pattern_with(&self, pattern: &str, message: impl Into<Message>) -> Result<Self> {
        self.pattern_impl(pattern, Some(message.into()))
    }

    fn pattern_impl(&self, pattern: &str, message: Option<Message>) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|err| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })?;
        Ok(self.refine(
            move |s| regex.is_match(s),
            message,
            DefaultMessage::StrPattern {
                pattern: pattern.to_string(),
            },
            Annotation::Pattern(pattern.to_string()),
        ))
    }

    /// Trim surrounding whitespace
    pub fn strip(&self) -> Self {
        Self {
            schema: self.schema.push_apply(
                |value| {
                    Ok(match value {
                        Value::Str(s) => Value::Str(s.trim().to_string()),
                        other => other.clone(),
                    })
                },
                Vec::new(),
            ),
        }
    }
}

/// Schema for integers or floats, with range refinements
#[derive(Debug, Clone)]
pub struct NumberSchema {
    schema: Schema,
}

typed_handle!(NumberSchema);

macro_rules! number_refinement {
    ($name:ident, $name_with:ident, $op:tt, $message:ident, $annotation:ident, $doc:literal) => {
        #[doc = $doc]
        pub fn $name(&self, bound: impl Into<Number>) -> Self {
            self.compare(
                bound.into(),
                None,
                |n, bound| n $op bound,
                |bound| DefaultMessage::$message { bound },
                Annotation::$annotation,
            )
        }

        pub fn $name_with(&self, bound: impl Into<Number>, message: impl Into<Message>) -> Self {
            self.compare(
                bound.into(),
                Some(message.into()),
                |n, bound| n $op bound,
                |bound| DefaultMessage::$message { bound },
                Annotation::$annotation,
            )
        }
    };
}

impl NumberSchema {
    pub(crate) fn build(tag: TypeTag, convert: Option<Convert>, message: Option<Message>) -> Self {
        Self {
            schema: typed(tag, convert, message, passthrough, Vec::new()),
        }
    }

    fn compare(
        &self,
        bound: Number,
        message: Option<Message>,
        holds: fn(Number, Number) -> bool,
        fallback: fn(Number) -> DefaultMessage,
        annotation: fn(Number) -> Annotation,
    ) -> Self {
        Self {
            schema: self.schema.ensure_builtin(
                move |value| value.as_number().map_or(false, |n| holds(n, bound)),
                message,
                fallback(bound),
                vec![annotation(bound)],
            ),
        }
    }

    number_refinement!(gt, gt_with, >, NumberGt, Gt, "Strictly greater than `bound`");
    number_refinement!(gte, gte_with, >=, NumberGte, Gte, "Greater than or equal to `bound`");
    number_refinement!(lt, lt_with, <, NumberLt, Lt, "Strictly less than `bound`");
    number_refinement!(lte, lte_with, <=, NumberLte, Lte, "Less than or equal to `bound`");
}

/// Schema for datetimes, with timezone-presence refinements
#[derive(Debug, Clone)]
pub struct DateTimeSchema {
    schema: Schema,
}

typed_handle!(DateTimeSchema);

impl DateTimeSchema {
    pub(crate) fn build(convert: Option<Convert>, message: Option<Message>) -> Self {
        Self {
            schema: typed(TypeTag::DateTime, convert, message, passthrough, Vec::new()),
        }
    }

    fn awareness(&self, aware: bool, message: Option<Message>) -> Self {
        let (fallback, annotation) = if aware {
            (DefaultMessage::DatetimeIsAware, Annotation::Aware)
        } else {
            (DefaultMessage::DatetimeIsNaive, Annotation::Naive)
        };
        Self {
            schema: self.schema.ensure_builtin(
                move |value| value.as_timestamp().map_or(false, |ts| ts.is_aware() == aware),
                message,
                fallback,
                vec![annotation],
            ),
        }
    }

    /// Require a UTC offset
    pub fn is_aware(&self) -> Self {
        self.awareness(true, None)
    }

    pub fn is_aware_with(&self, message: impl Into<Message>) -> Self {
        self.awareness(true, Some(message.into()))
    }

    /// Reject values carrying a UTC offset
    pub fn is_naive(&self) -> Self {
        self.awareness(false, None)
    }

    pub fn is_naive_with(&self, message: impl Into<Message>) -> Self {
        self.awareness(false, Some(message.into()))
    }
}

pub fn string() -> StringSchema {
    StringSchema::build(None, None)
}

/// [`string`] reporting `message` instead of the type-check default
pub fn string_with_message(message: impl Into<Message>) -> StringSchema {
    StringSchema::build(None, Some(message.into()))
}

/// Integers only; booleans are rejected
pub fn integer() -> NumberSchema {
    NumberSchema::build(TypeTag::Integer, None, None)
}

pub fn integer_with_message(message: impl Into<Message>) -> NumberSchema {
    NumberSchema::build(TypeTag::Integer, None, Some(message.into()))
}

/// Floats only; integers are rejected, use [`to::float`](crate::to::float) to widen them
pub fn float() -> NumberSchema {
    NumberSchema::build(TypeTag::Float, None, None)
}

pub fn float_with_message(message: impl Into<Message>) -> NumberSchema {
    NumberSchema::build(TypeTag::Float, None, Some(message.into()))
}

pub fn boolean() -> Schema {
    typed(TypeTag::Boolean, None, None, passthrough, Vec::new())
}

pub fn boolean_with_message(message: impl Into<Message>) -> Schema {
    typed(TypeTag::Boolean, None, Some(message.into()), passthrough, Vec::new())
}

pub fn null() -> Schema {
    typed(TypeTag::Null, None, None, passthrough, Vec::new())
}

pub fn null_with_message(message: impl Into<Message>) -> Schema {
    typed(TypeTag::Null, None, Some(message.into()), passthrough, Vec::new())
}

/// Accepts every value
pub fn any() -> Schema {
    typed(TypeTag::Any, None, None, passthrough, Vec::new())
}

pub fn datetime() -> DateTimeSchema {
    DateTimeSchema::build(None, None)
}

pub fn datetime_with_message(message: impl Into<Message>) -> DateTimeSchema {
    DateTimeSchema::build(None, Some(message.into()))
}
