//! Built-in constraint validators and descriptor helpers.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex_lite::Regex;

use verity_core::{ConfigurationError, ValidationError, Value, ValueKind};
use verity_metadata::ConstraintDescriptor;

use crate::{ConstraintValidator, SupportedType, ValidatorContext, ValidatorRegistry};

/// Built-in constraint kind identities.
pub mod kinds {
    pub const NOT_NULL: &str = "NotNull";
    pub const NOT_BLANK: &str = "NotBlank";
    pub const NOT_EMPTY: &str = "NotEmpty";
    pub const SIZE: &str = "Size";
    pub const LENGTH: &str = "Length";
    pub const MIN: &str = "Min";
    pub const MAX: &str = "Max";
    pub const PATTERN: &str = "Pattern";
    pub const EMAIL: &str = "Email";
    pub const ASSERT_TRUE: &str = "AssertTrue";
}

/// Descriptor helpers for the built-in constraints.
pub mod constraints {
    use super::kinds;
    use verity_core::Value;
    use verity_metadata::ConstraintDescriptor;

    /// The value must not be null.
    pub fn not_null() -> ConstraintDescriptor {
        ConstraintDescriptor::new(kinds::NOT_NULL)
    }

    /// The string must contain at least one non-whitespace character.
    pub fn not_blank() -> ConstraintDescriptor {
        ConstraintDescriptor::new(kinds::NOT_BLANK)
    }

    /// The string, list or map must not be null or empty. Composed of
    /// `NotNull` and `Size(min = 1)`, reported as a single violation.
    pub fn not_empty() -> ConstraintDescriptor {
        ConstraintDescriptor::new(kinds::NOT_EMPTY)
            .as_single_violation()
            .compose(not_null())
            .compose(size(1, None))
    }

    /// The string, list or map length must fall in the given bounds.
    pub fn size(min: i64, max: Option<i64>) -> ConstraintDescriptor {
        let descriptor = ConstraintDescriptor::new(kinds::SIZE).attr("min", min);
        match max {
            Some(max) => descriptor.attr("max", max),
            None => descriptor,
        }
    }

    /// The string's character count must fall in the given bounds.
    pub fn length(min: i64, max: Option<i64>) -> ConstraintDescriptor {
        let descriptor = ConstraintDescriptor::new(kinds::LENGTH).attr("min", min);
        match max {
            Some(max) => descriptor.attr("max", max),
            None => descriptor,
        }
    }

    /// The number must be greater than or equal to `value`.
    pub fn min(value: impl Into<Value>) -> ConstraintDescriptor {
        ConstraintDescriptor::new(kinds::MIN).attr("value", value)
    }

    /// The number must be less than or equal to `value`.
    pub fn max(value: impl Into<Value>) -> ConstraintDescriptor {
        ConstraintDescriptor::new(kinds::MAX).attr("value", value)
    }

    /// The string must match the regular expression.
    pub fn pattern(regexp: impl Into<String>) -> ConstraintDescriptor {
        ConstraintDescriptor::new(kinds::PATTERN).attr("regexp", regexp.into())
    }

    /// The string must be a well-formed email address.
    pub fn email() -> ConstraintDescriptor {
        ConstraintDescriptor::new(kinds::EMAIL)
    }

    /// The boolean must be true.
    pub fn assert_true() -> ConstraintDescriptor {
        ConstraintDescriptor::new(kinds::ASSERT_TRUE)
    }
}

/// Install every built-in validator into a registry.
pub fn install(registry: &mut ValidatorRegistry) -> Result<(), ConfigurationError> {
    registry.register(kinds::NOT_NULL, SupportedType::Any, || {
        Arc::new(NotNullValidator)
    })?;
    registry.declare_null_aware(kinds::NOT_NULL);
    registry.set_default_message(kinds::NOT_NULL, "must not be null");

    registry.register(kinds::NOT_BLANK, SupportedType::Kind(ValueKind::String), || {
        Arc::new(NotBlankValidator)
    })?;
    registry.declare_null_aware(kinds::NOT_BLANK);
    registry.set_default_message(kinds::NOT_BLANK, "must not be blank");

    // Composed constraint: no validator of its own.
    registry.set_default_message(kinds::NOT_EMPTY, "must not be empty");

    for kind in [ValueKind::String, ValueKind::List, ValueKind::Map] {
        registry.register(kinds::SIZE, SupportedType::Kind(kind), move || {
            Arc::new(SizeValidator {
                supports: SupportedType::Kind(kind),
            })
        })?;
    }
    registry.set_default_message(kinds::SIZE, "size must be between {min} and {max}");

    registry.register(kinds::LENGTH, SupportedType::Kind(ValueKind::String), || {
        Arc::new(LengthValidator)
    })?;
    registry.set_default_message(kinds::LENGTH, "length must be between {min} and {max}");

    registry.register(kinds::MIN, SupportedType::Number, || Arc::new(MinValidator))?;
    registry.set_default_message(kinds::MIN, "must be greater than or equal to {value}");

    registry.register(kinds::MAX, SupportedType::Number, || Arc::new(MaxValidator))?;
    registry.set_default_message(kinds::MAX, "must be less than or equal to {value}");

    registry.register(kinds::PATTERN, SupportedType::Kind(ValueKind::String), || {
        Arc::new(PatternValidator::new())
    })?;
    registry.set_default_message(kinds::PATTERN, "must match \"{regexp}\"");

    registry.register(kinds::EMAIL, SupportedType::Kind(ValueKind::String), || {
        Arc::new(EmailValidator)
    })?;
    registry.set_default_message(kinds::EMAIL, "must be a well-formed email address");

    registry.register(kinds::ASSERT_TRUE, SupportedType::Kind(ValueKind::Bool), || {
        Arc::new(AssertTrueValidator)
    })?;
    registry.set_default_message(kinds::ASSERT_TRUE, "must be true");

    Ok(())
}

fn int_attr(
    descriptor: &ConstraintDescriptor,
    name: &str,
) -> Result<Option<i64>, ValidationError> {
    match descriptor.attribute(name) {
        None => Ok(None),
        Some(Value::Int(value)) => Ok(Some(*value)),
        Some(other) => Err(ConfigurationError::InvalidConstraintAttribute {
            constraint: descriptor.kind().to_string(),
            attribute: name.to_string(),
            reason: format!("expected an integer, got {}", other.type_name()),
        }
        .into()),
    }
}

fn number_attr(descriptor: &ConstraintDescriptor, name: &str) -> Result<f64, ValidationError> {
    match descriptor.attribute(name) {
        Some(value) => value.as_number().ok_or_else(|| {
            ConfigurationError::InvalidConstraintAttribute {
                constraint: descriptor.kind().to_string(),
                attribute: name.to_string(),
                reason: format!("expected a number, got {}", value.type_name()),
            }
            .into()
        }),
        None => Err(ConfigurationError::InvalidConstraintAttribute {
            constraint: descriptor.kind().to_string(),
            attribute: name.to_string(),
            reason: "attribute is required".to_string(),
        }
        .into()),
    }
}

fn str_attr<'d>(
    descriptor: &'d ConstraintDescriptor,
    name: &str,
) -> Result<&'d str, ValidationError> {
    match descriptor.attribute(name) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(ConfigurationError::InvalidConstraintAttribute {
            constraint: descriptor.kind().to_string(),
            attribute: name.to_string(),
            reason: format!("expected a string, got {}", other.type_name()),
        }
        .into()),
        None => Err(ConfigurationError::InvalidConstraintAttribute {
            constraint: descriptor.kind().to_string(),
            attribute: name.to_string(),
            reason: "attribute is required".to_string(),
        }
        .into()),
    }
}

fn within_bounds(
    len: i64,
    descriptor: &ConstraintDescriptor,
) -> Result<bool, ValidationError> {
    let min = int_attr(descriptor, "min")?.unwrap_or(0);
    let max = int_attr(descriptor, "max")?;
    Ok(len >= min && max.map_or(true, |max| len <= max))
}

struct NotNullValidator;

impl ConstraintValidator for NotNullValidator {
    fn supports(&self) -> SupportedType {
        SupportedType::Any
    }

    fn is_valid(
        &self,
        value: &Value,
        _descriptor: &ConstraintDescriptor,
        _ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError> {
        Ok(!value.is_null())
    }
}

struct NotBlankValidator;

impl ConstraintValidator for NotBlankValidator {
    fn supports(&self) -> SupportedType {
        SupportedType::Kind(ValueKind::String)
    }

    fn is_valid(
        &self,
        value: &Value,
        _descriptor: &ConstraintDescriptor,
        _ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError> {
        match value.as_str() {
            Some(text) => Ok(!text.trim().is_empty()),
            None => Ok(!value.is_null()),
        }
    }
}

struct SizeValidator {
    // One instance per registered container kind; the length logic is
    // shared.
    supports: SupportedType,
}

impl ConstraintValidator for SizeValidator {
    fn supports(&self) -> SupportedType {
        self.supports
    }

    fn is_valid(
        &self,
        value: &Value,
        descriptor: &ConstraintDescriptor,
        _ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError> {
        let len = match value {
            Value::String(text) => text.chars().count() as i64,
            Value::List(items) => items.len() as i64,
            Value::Map(entries) => entries.len() as i64,
            _ => return Ok(true),
        };
        within_bounds(len, descriptor)
    }
}

struct LengthValidator;

impl ConstraintValidator for LengthValidator {
    fn supports(&self) -> SupportedType {
        SupportedType::Kind(ValueKind::String)
    }

    fn is_valid(
        &self,
        value: &Value,
        descriptor: &ConstraintDescriptor,
        _ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError> {
        match value.as_str() {
            Some(text) => within_bounds(text.chars().count() as i64, descriptor),
            None => Ok(true),
        }
    }
}

struct MinValidator;

impl ConstraintValidator for MinValidator {
    fn supports(&self) -> SupportedType {
        SupportedType::Number
    }

    fn is_valid(
        &self,
        value: &Value,
        descriptor: &ConstraintDescriptor,
        _ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError> {
        let bound = number_attr(descriptor, "value")?;
        Ok(value.as_number().map_or(true, |number| number >= bound))
    }
}

struct MaxValidator;

impl ConstraintValidator for MaxValidator {
    fn supports(&self) -> SupportedType {
        SupportedType::Number
    }

    fn is_valid(
        &self,
        value: &Value,
        descriptor: &ConstraintDescriptor,
        _ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError> {
        let bound = number_attr(descriptor, "value")?;
        Ok(value.as_number().map_or(true, |number| number <= bound))
    }
}

struct PatternValidator {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl PatternValidator {
    fn new() -> Self {
        Self {
            compiled: RwLock::new(HashMap::new()),
        }
    }

    fn regex_for(&self, pattern: &str, kind: &str) -> Result<Regex, ValidationError> {
        if let Some(regex) = self.compiled.read().get(pattern) {
            return Ok(regex.clone());
        }
        let regex = Regex::new(pattern).map_err(|error| {
            ConfigurationError::InvalidConstraintAttribute {
                constraint: kind.to_string(),
                attribute: "regexp".to_string(),
                reason: error.to_string(),
            }
        })?;
        self.compiled
            .write()
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

impl ConstraintValidator for PatternValidator {
    fn supports(&self) -> SupportedType {
        SupportedType::Kind(ValueKind::String)
    }

    fn is_valid(
        &self,
        value: &Value,
        descriptor: &ConstraintDescriptor,
        _ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError> {
        let Some(text) = value.as_str() else {
            return Ok(true);
        };
        let pattern = str_attr(descriptor, "regexp")?;
        let regex = self.regex_for(pattern, descriptor.kind())?;
        Ok(regex.is_match(text))
    }
}

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*$")
        .expect("email pattern compiles")
});

struct EmailValidator;

impl ConstraintValidator for EmailValidator {
    fn supports(&self) -> SupportedType {
        SupportedType::Kind(ValueKind::String)
    }

    fn is_valid(
        &self,
        value: &Value,
        _descriptor: &ConstraintDescriptor,
        _ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError> {
        let Some(text) = value.as_str() else {
            return Ok(true);
        };
        // The empty string is valid; emptiness is NotEmpty's concern.
        if text.is_empty() {
            return Ok(true);
        }
        Ok(EMAIL_PATTERN.is_match(text))
    }
}

struct AssertTrueValidator;

impl ConstraintValidator for AssertTrueValidator {
    fn supports(&self) -> SupportedType {
        SupportedType::Kind(ValueKind::Bool)
    }

    fn is_valid(
        &self,
        value: &Value,
        _descriptor: &ConstraintDescriptor,
        _ctx: &mut ValidatorContext,
    ) -> Result<bool, ValidationError> {
        Ok(value.as_bool() != Some(false))
    }
}
