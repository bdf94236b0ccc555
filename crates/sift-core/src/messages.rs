//! Message resolution for built-in failures
//!
//! Built-in checks never hard-code their text. They describe the failure as a
//! [`DefaultMessage`] and ask the active [`MessageResolver`] to render it. The
//! active resolver is the top of a thread-local stack, so callers can localize
//! or reword messages for a region of code without touching other threads:
//!
//! ```
//! use sift_core::messages::{self, DefaultMessage};
//!
//! let terse = messages::from_fn(|msg, _value| match msg {
//!     DefaultMessage::FieldRequired => Some("Required".to_string()),
//!     _ => None,
//! });
//!
//! let text = messages::with_resolver(terse, || {
//!     messages::resolve(&DefaultMessage::FieldRequired, &sift_core::Value::Null)
//! });
//! assert_eq!(text, "Required");
//! ```
//!
//! A message passed explicitly at the call site (see [`Message`]) always wins
//! over the resolver.

use crate::value::{Number, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Symbolic description of a built-in failure, with its context
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultMessage {
    /// A required struct field is absent
    FieldRequired,
    /// The value is not of the expected type
    TypeCheck { expected: String },
    /// A coercing schema could not convert the value
    TypeConversion { expected: String },
    /// A transform returned an error that was not a validation error
    TransformFailed { reason: String },
    /// A custom `ensure` predicate rejected the value
    EnsureFailed,
    StrMin { min: usize },
    StrMax { max: usize },
    StrPattern { pattern: String },
    NumberGt { bound: Number },
    NumberGte { bound: Number },
    NumberLt { bound: Number },
    NumberLte { bound: Number },
    DatetimeIsAware,
    DatetimeIsNaive,
    /// A mapping struct rejected a key it does not declare
    UnknownField,
}

impl DefaultMessage {
    /// Stable symbolic name, suitable as a translation key
    pub fn key(&self) -> &'static str {
        match self {
            DefaultMessage::FieldRequired => "field_required",
            DefaultMessage::TypeCheck { .. } => "type_check",
            DefaultMessage::TypeConversion { .. } => "type_conversion",
            DefaultMessage::TransformFailed { .. } => "transform_failed",
            DefaultMessage::EnsureFailed => "ensure_failed",
            DefaultMessage::StrMin { .. } => "str_min",
            DefaultMessage::StrMax { .. } => "str_max",
            DefaultMessage::StrPattern { .. } => "str_pattern",
            DefaultMessage::NumberGt { .. } => "number_gt",
            DefaultMessage::NumberGte { .. } => "number_gte",
            DefaultMessage::NumberLt { .. } => "number_lt",
            DefaultMessage::NumberLte { .. } => "number_lte",
            DefaultMessage::DatetimeIsAware => "datetime_is_aware",
            DefaultMessage::DatetimeIsNaive => "datetime_is_naive",
            DefaultMessage::UnknownField => "unknown_field",
        }
    }
}

impl fmt::Display for DefaultMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Renders [`DefaultMessage`]s into user-facing text
///
/// Implementors override [`MessageResolver::resolve`] for the messages they
/// care about and delegate the rest to [`default_text`].
pub trait MessageResolver: Send + Sync {
    fn resolve(&self, message: &DefaultMessage, value: &Value) -> String {
        default_text(message, value)
    }
}

/// The built-in English catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageResolver for DefaultMessages {}

/// Text used by [`DefaultMessages`]
pub fn default_text(message: &DefaultMessage, value: &Value) -> String {
    match message {
        DefaultMessage::FieldRequired => "This field is required".to_string(),
        DefaultMessage::TypeCheck { expected } => {
            format!("Expected {}, received {}", expected, value.kind_name())
        }
        DefaultMessage::TypeConversion { expected } => {
            format!("Cannot convert the value {} to {}", value.repr(), expected)
        }
        DefaultMessage::TransformFailed { reason } => reason.clone(),
        DefaultMessage::EnsureFailed => "Invalid value".to_string(),
        DefaultMessage::StrMin { min } => format!("The minimum length of the string is {}", min),
        DefaultMessage::StrMax { max } => format!("The maximum length of the string is {}", max),
        DefaultMessage::StrPattern { pattern } => {
            format!("The string does not match the pattern {}", pattern)
        }
        DefaultMessage::NumberGt { bound } => format!("The value should be greater than {}", bound),
        DefaultMessage::NumberGte { bound } => {
            format!("The value should be greater than or equal to {}", bound)
        }
        DefaultMessage::NumberLt { bound } => format!("The value should be less than {}", bound),
        DefaultMessage::NumberLte { bound } => {
            format!("The value should be less than or equal to {}", bound)
        }
        DefaultMessage::DatetimeIsAware => "The datetime must be timezone-aware".to_string(),
        DefaultMessage::DatetimeIsNaive => "The datetime must be naive".to_string(),
        DefaultMessage::UnknownField => "Unknown field".to_string(),
    }
}

/// Resolver backed by a closure; `None` falls back to the defaults
pub struct FnResolver<F> {
    func: F,
}

impl<F> MessageResolver for FnResolver<F>
where
    F: Fn(&DefaultMessage, &Value) -> Option<String> + Send + Sync,
{
    fn resolve(&self, message: &DefaultMessage, value: &Value) -> String {
        (self.func)(message, value).unwrap_or_else(|| default_text(message, value))
    }
}

/// Build a resolver from a closure
pub fn from_fn<F>(func: F) -> FnResolver<F>
where
    F: Fn(&DefaultMessage, &Value) -> Option<String> + Send + Sync,
{
    FnResolver { func }
}

thread_local! {
    /// Resolvers pushed on this thread, innermost last, tagged with the id
    /// of the guard that owns them
    static RESOLVER_STACK: RefCell<Vec<(u64, Arc<dyn MessageResolver>)>> = const { RefCell::new(Vec::new()) };
    static NEXT_SCOPE_ID: Cell<u64> = const { Cell::new(0) };
}

/// Guard returned by [`push_resolver`]; removes its resolver when dropped
///
/// Guards may be dropped in any order. Each one removes only the resolver it
/// pushed, and the innermost resolver still alive stays active.
#[must_use = "the resolver is popped as soon as the scope guard is dropped"]
pub struct MessageScope {
    id: u64,
    // thread-local state, so the guard must stay on this thread
    _marker: PhantomData<*const ()>,
}

impl Drop for MessageScope {
    fn drop(&mut self) {
        RESOLVER_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            match stack.iter().rposition(|(id, _)| *id == self.id) {
                Some(index) => {
                    stack.remove(index);
                }
                None => debug_assert!(false, "MessageScope {} dropped but its resolver is gone", self.id),
            }
        });
    }
}

/// Make `resolver` the active resolver on this thread until the guard drops
pub fn push_resolver<R>(resolver: R) -> MessageScope
where
    R: MessageResolver + 'static,
{
    let id = NEXT_SCOPE_ID.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        id
    });
    let resolver: Arc<dyn MessageResolver> = Arc::new(resolver);
    RESOLVER_STACK.with(|stack| stack.borrow_mut().push((id, resolver)));
    MessageScope {
        id,
        _marker: PhantomData,
    }
}

/// Run `f` with `resolver` active; it is removed again even if `f` panics
pub fn with_resolver<R, F, T>(resolver: R, f: F) -> T
where
    R: MessageResolver + 'static,
    F: FnOnce() -> T,
{
    let _scope = push_resolver(resolver);
    f()
}

/// Number of resolvers currently pushed on this thread
pub fn depth() -> usize {
    RESOLVER_STACK.with(|stack| stack.borrow().len())
}

/// Render a built-in failure with the active resolver
pub fn resolve(message: &DefaultMessage, value: &Value) -> String {
    // Clone out of the cell so a resolver may itself push or resolve
    let active = RESOLVER_STACK.with(|stack| stack.borrow().last().map(|(_, resolver)| resolver.clone()));
    match active {
        Some(resolver) => resolver.resolve(message, value),
        None => DefaultMessages.resolve(message, value),
    }
}

/// A message supplied explicitly at a call site
#[derive(Clone)]
pub enum Message {
    Text(String),
    /// Computed from the failing value
    Dynamic(Arc<dyn Fn(&Value) -> String + Send + Sync>),
}

impl Message {
    pub fn dynamic<F>(func: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        Message::Dynamic(Arc::new(func))
    }

    pub fn render(&self, value: &Value) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::Dynamic(func) => func(value),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

/// Explicit message if given, else the active resolver's text
pub(crate) fn render(explicit: Option<&Message>, fallback: &DefaultMessage, value: &Value) -> String {
    match explicit {
        Some(message) => message.render(value),
        None => resolve(fallback, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shouting;

    impl MessageResolver for Shouting {
        fn resolve(&self, message: &DefaultMessage, value: &Value) -> String {
            default_text(message, value).to_uppercase()
        }
    }

    #[test]
    fn test_default_texts() {
        let value = Value::from("2.1");
        assert_eq!(resolve(&DefaultMessage::FieldRequired, &value), "This field is required");
        assert_eq!(
            resolve(&DefaultMessage::TypeCheck { expected: "int".into() }, &value),
            "Expected int, received str"
        );
        assert_eq!(
            resolve(&DefaultMessage::TypeConversion { expected: "int".into() }, &value),
            "Cannot convert the value \"2.1\" to int"
        );
        assert_eq!(
            resolve(&DefaultMessage::NumberGte { bound: Number::Int(3) }, &value),
            "The value should be greater than or equal to 3"
        );
        assert_eq!(resolve(&DefaultMessage::EnsureFailed, &value), "Invalid value");
    }

    #[test]
    fn test_scopes_nest_and_restore() {
        let value = Value::Null;
        assert_eq!(depth(), 0);
        {
            let _outer = push_resolver(Shouting);
            assert_eq!(resolve(&DefaultMessage::UnknownField, &value), "UNKNOWN FIELD");
            {
                let _inner = push_resolver(from_fn(|msg, _| {
                    (msg == &DefaultMessage::UnknownField).then(|| "Nope".to_string())
                }));
                assert_eq!(depth(), 2);
                assert_eq!(resolve(&DefaultMessage::UnknownField, &value), "Nope");
                assert_eq!(resolve(&DefaultMessage::EnsureFailed, &value), "Invalid value");
            }
            assert_eq!(resolve(&DefaultMessage::UnknownField, &value), "UNKNOWN FIELD");
        }
        assert_eq!(depth(), 0);
        assert_eq!(resolve(&DefaultMessage::UnknownField, &value), "Unknown field");
    }

    #[test]
    fn test_out_of_order_drop_keeps_live_scope_active() {
        let value = Value::Null;
        let outer = push_resolver(Shouting);
        let inner = push_resolver(from_fn(|_, _| Some("inner".to_string())));
        drop(outer);
        assert_eq!(depth(), 1);
        assert_eq!(resolve(&DefaultMessage::EnsureFailed, &value), "inner");
        drop(inner);
        assert_eq!(depth(), 0);
        assert_eq!(resolve(&DefaultMessage::EnsureFailed, &value), "Invalid value");
    }

    #[test]
    fn test_scope_is_popped_on_panic() {
        let result = std::panic::catch_unwind(|| {
            with_resolver(Shouting, || panic!("boom"));
        });
        assert!(result.is_err());
        assert_eq!(depth(), 0);
    }

    #[test]
    fn test_scope_is_thread_local() {
        let _scope = push_resolver(Shouting);
        let other = std::thread::spawn(|| resolve(&DefaultMessage::FieldRequired, &Value::Null))
            .join()
            .unwrap();
        assert_eq!(other, "This field is required");
    }

    #[test]
    fn test_explicit_message_wins() {
        let _scope = push_resolver(Shouting);
        let explicit = Message::dynamic(|v| format!("bad {}", v));
        assert_eq!(render(Some(&explicit), &DefaultMessage::EnsureFailed, &Value::from(3)), "bad 3");
        assert_eq!(render(None, &DefaultMessage::EnsureFailed, &Value::from(3)), "INVALID VALUE");
    }

    #[test]
    fn test_keys_are_stable() {
        assert_eq!(DefaultMessage::TypeConversion { expected: "x".into() }.key(), "type_conversion");
        assert_eq!(DefaultMessage::DatetimeIsAware.key(), "datetime_is_aware");
    }
}
