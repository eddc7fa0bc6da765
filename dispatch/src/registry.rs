//! Validator registration and resolution.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use verity_core::{ConfigurationError, ValueKind};

use crate::{ConstraintValidator, SupportedType};

type ValidatorFactory = Box<dyn Fn() -> Arc<dyn ConstraintValidator> + Send + Sync>;

struct Candidate {
    supports: SupportedType,
    factory: ValidatorFactory,
}

#[derive(Default)]
struct ConstraintBinding {
    candidates: Vec<Candidate>,
    null_aware: bool,
    default_message: Option<String>,
}

/// Maps constraint kinds to candidate validator implementations.
///
/// Registration happens during engine assembly and is `&mut`; the
/// registry is shared immutably afterwards. Resolved validator
/// instances are cached by (constraint kind, supported type) and shared
/// across concurrent validations.
#[derive(Default)]
pub struct ValidatorRegistry {
    bindings: HashMap<String, ConstraintBinding>,
    instances: RwLock<HashMap<(String, SupportedType), Arc<dyn ConstraintValidator>>>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in validators installed.
    pub fn with_builtins() -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        crate::builtin::install(&mut registry)?;
        Ok(registry)
    }

    /// Register a candidate validator for a constraint kind.
    ///
    /// Two candidates with the same supported type would tie at
    /// resolution time, so the second registration fails here.
    pub fn register<F>(
        &mut self,
        kind: &str,
        supports: SupportedType,
        factory: F,
    ) -> Result<(), ConfigurationError>
    where
        F: Fn() -> Arc<dyn ConstraintValidator> + Send + Sync + 'static,
    {
        let binding = self.bindings.entry(kind.to_string()).or_default();
        if binding
            .candidates
            .iter()
            .any(|candidate| candidate.supports == supports)
        {
            return Err(ConfigurationError::DuplicateValidator {
                constraint: kind.to_string(),
                supported: supports.to_string(),
            });
        }
        debug!(constraint = kind, supported = %supports, "registering constraint validator");
        binding.candidates.push(Candidate {
            supports,
            factory: Box::new(factory),
        });
        Ok(())
    }

    /// Opt a constraint kind into null handling. Its validators are
    /// then invoked for null values instead of the default
    /// null-is-valid short-circuit.
    pub fn declare_null_aware(&mut self, kind: &str) {
        self.bindings.entry(kind.to_string()).or_default().null_aware = true;
    }

    /// Set the default message template for a constraint kind, used
    /// when a descriptor declares none.
    pub fn set_default_message(&mut self, kind: &str, template: impl Into<String>) {
        self.bindings.entry(kind.to_string()).or_default().default_message = Some(template.into());
    }

    /// Returns true if at least one validator is registered for the
    /// kind.
    pub fn has_validator(&self, kind: &str) -> bool {
        self.bindings
            .get(kind)
            .is_some_and(|binding| !binding.candidates.is_empty())
    }

    /// Whether the kind opted into null handling.
    pub fn validates_null(&self, kind: &str) -> bool {
        self.bindings
            .get(kind)
            .is_some_and(|binding| binding.null_aware)
    }

    /// The default message template for a kind, if one was registered.
    pub fn default_message(&self, kind: &str) -> Option<&str> {
        self.bindings
            .get(kind)
            .and_then(|binding| binding.default_message.as_deref())
    }

    /// Resolve the validator for a constraint kind and runtime value
    /// kind.
    ///
    /// `None` stands for a null value, reaching here only for
    /// null-aware constraints; any registered candidate may serve it.
    /// Registration guarantees at most one candidate per specificity
    /// rank matches, so resolution is tie-free.
    pub fn resolve(
        &self,
        kind: &str,
        value_kind: Option<ValueKind>,
    ) -> Result<Arc<dyn ConstraintValidator>, ConfigurationError> {
        let binding = self
            .bindings
            .get(kind)
            .filter(|binding| !binding.candidates.is_empty())
            .ok_or_else(|| ConfigurationError::UnknownConstraint(kind.to_string()))?;

        let candidate = match value_kind {
            None => binding.candidates.first().ok_or_else(|| {
                ConfigurationError::UnknownConstraint(kind.to_string())
            })?,
            Some(value_kind) => binding
                .candidates
                .iter()
                .filter(|candidate| candidate.supports.matches(value_kind))
                .max_by_key(|candidate| candidate.supports.specificity())
                .ok_or_else(|| ConfigurationError::NoValidator {
                    constraint: kind.to_string(),
                    kind: value_kind.to_string(),
                })?,
        };

        let key = (kind.to_string(), candidate.supports);
        if let Some(instance) = self.instances.read().get(&key) {
            return Ok(instance.clone());
        }
        let mut instances = self.instances.write();
        if let Some(instance) = instances.get(&key) {
            return Ok(instance.clone());
        }
        let instance = (candidate.factory)();
        instances.insert(key, instance.clone());
        Ok(instance)
    }
}
