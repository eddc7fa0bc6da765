//! Constraint evaluation: null policy, dispatch and composition.

use std::sync::Arc;

use verity_core::{ValidationError, Value};
use verity_metadata::ConstraintDescriptor;

use crate::{ValidatorContext, ValidatorRegistry};

/// One failed constraint occurrence, before it is turned into a
/// violation by the engine (which owns path and bean context).
#[derive(Debug, Clone)]
pub struct ConstraintFailure {
    descriptor: Arc<ConstraintDescriptor>,
    message_template: String,
    payload: Option<Value>,
}

impl ConstraintFailure {
    /// The failed constraint occurrence.
    pub fn descriptor(&self) -> &Arc<ConstraintDescriptor> {
        &self.descriptor
    }

    /// The message template to interpolate: the validator's override,
    /// the descriptor's declared template, or the kind's default.
    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    /// Dynamic payload attached by the validator, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

/// Evaluates constraint descriptors against values.
///
/// Owns the two cross-cutting dispatch rules: nulls are valid unless
/// the constraint kind opted into null handling (checked before any
/// validator runs), and composed constraints AND their parts together,
/// optionally collapsing all failures into one.
pub struct ConstraintEvaluator {
    registry: Arc<ValidatorRegistry>,
}

impl ConstraintEvaluator {
    /// Create an evaluator over a registry.
    pub fn new(registry: Arc<ValidatorRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<ValidatorRegistry> {
        &self.registry
    }

    /// Evaluate one descriptor against a value, returning the failures
    /// to report. An empty result means the constraint held.
    pub fn evaluate(
        &self,
        descriptor: &Arc<ConstraintDescriptor>,
        value: &Value,
    ) -> Result<Vec<ConstraintFailure>, ValidationError> {
        self.check(descriptor, value).map(|(_, failures)| failures)
    }

    fn check(
        &self,
        descriptor: &Arc<ConstraintDescriptor>,
        value: &Value,
    ) -> Result<(bool, Vec<ConstraintFailure>), ValidationError> {
        let kind = descriptor.kind();
        let mut passed = true;
        let mut failures = Vec::new();

        if self.registry.has_validator(kind) {
            // Null short-circuit happens before dispatch.
            let skip_null = value.is_null() && !self.registry.validates_null(kind);
            if !skip_null {
                let validator = self.registry.resolve(kind, value.kind())?;
                let mut ctx = ValidatorContext::new();
                if !validator.is_valid(value, descriptor, &mut ctx)? {
                    passed = false;
                    failures.push(self.failure(descriptor, ctx));
                }
            }
        } else if descriptor.composing().is_empty() {
            // A leaf constraint with no implementation is a wiring bug.
            return Err(verity_core::ConfigurationError::UnknownConstraint(
                kind.to_string(),
            )
            .into());
        }

        // Composing parts evaluate independently and AND together; the
        // null policy applies per part.
        for sub in descriptor.composing() {
            let (sub_passed, sub_failures) = self.check(sub, value)?;
            if !sub_passed {
                passed = false;
                failures.extend(sub_failures);
            }
        }

        if !passed && descriptor.reports_as_single() {
            failures = vec![self.failure(descriptor, ValidatorContext::new())];
        }

        Ok((passed, failures))
    }

    fn failure(
        &self,
        descriptor: &Arc<ConstraintDescriptor>,
        ctx: ValidatorContext,
    ) -> ConstraintFailure {
        let (message_override, payload) = ctx.into_parts();
        let message_template = message_override
            .or_else(|| descriptor.message_template().map(str::to_string))
            .or_else(|| {
                self.registry
                    .default_message(descriptor.kind())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "is invalid".to_string());
        ConstraintFailure {
            descriptor: descriptor.clone(),
            message_template,
            payload,
        }
    }
}
