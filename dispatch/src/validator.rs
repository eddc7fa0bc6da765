//! The constraint validator trait.

use std::fmt;

use verity_core::{ValidationError, Value, ValueKind};
use verity_metadata::ConstraintDescriptor;

/// The value type a validator declares support for.
///
/// Resolution picks the matching candidate with the highest
/// specificity: a concrete kind beats `Number`, which beats `Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedType {
    /// Any value.
    Any,
    /// Int or Float.
    Number,
    /// One concrete value kind.
    Kind(ValueKind),
}

impl SupportedType {
    /// Whether a runtime value kind is assignable to this declaration.
    pub fn matches(&self, kind: ValueKind) -> bool {
        match self {
            SupportedType::Any => true,
            SupportedType::Number => matches!(kind, ValueKind::Int | ValueKind::Float),
            SupportedType::Kind(supported) => *supported == kind,
        }
    }

    /// Resolution rank; higher wins.
    pub fn specificity(&self) -> u8 {
        match self {
            SupportedType::Any => 0,
            SupportedType::Number => 1,
            SupportedType::Kind(_) => 2,
        }
    }
}

impl fmt::Display for SupportedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportedType::Any => write!(f, "Any"),
            SupportedType::Number => write!(f, "Number"),
            SupportedType::Kind(kind) => write!(f, "{}", kind),
        }
    }
}

/// Per-invocation context handed to a validator.
///
/// Lets the implementation replace the violation's message template and
/// attach a dynamic payload; both default to the descriptor's own.
#[derive(Debug, Default)]
pub struct ValidatorContext {
    message: Option<String>,
    payload: Option<Value>,
}

impl ValidatorContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the message template for the resulting violation.
    pub fn replace_message(&mut self, template: impl Into<String>) {
        self.message = Some(template.into());
    }

    /// Attach a dynamic payload to the resulting violation.
    pub fn set_payload(&mut self, payload: impl Into<Value>) {
        self.payload = Some(payload.into());
    }

    /// The replacement message template, if set.
    pub fn message_override(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Consume the context into its parts.
    pub(crate) fn into_parts(self) -> (Option<String>, Option<Value>) {
        (self.message, self.payload)
    }
}

/// A constraint validator implementation.
///
/// Implementations are stateless and shared across concurrent
/// validation calls. Returning `Err` signals an implementation failure
/// or a misconfigured constraint attribute; it aborts the whole call
/// and is never turned into a violation.
pub trait ConstraintValidator: Send + Sync {
    /// The value type this validator supports.
    fn supports(&self) -> SupportedType;

    /// Check one value against one constraint occurrence.
    fn is_valid(
        &self,
        value: &Value,
        descriptor: &ConstraintDescriptor,
        ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError>;
}
