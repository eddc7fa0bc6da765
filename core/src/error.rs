//! Common error types for the validation engine.
//!
//! Ordinary constraint failures are never errors: they are reported as
//! violations in the successful result set. The types here cover the two
//! fatal categories: misconfiguration (bad metadata, bad registration,
//! bad caller input) and processing failures (a validator implementation
//! failed mid-call).

use thiserror::Error;

/// Errors caused by invalid metadata, registration or caller usage.
///
/// Detected eagerly at metadata-build or registration time where
/// possible, otherwise at first use. Never recovered.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No validation groups were requested.
    #[error("No validation groups were requested")]
    EmptyGroupRequest,

    /// A group sequence directly or indirectly contains itself.
    #[error("Group sequence '{0}' directly or indirectly contains itself")]
    GroupSequenceCycle(String),

    /// Two sequences registered under one name.
    #[error("Duplicate group sequence: {0}")]
    DuplicateGroupSequence(String),

    /// A sequence with no members.
    #[error("Group sequence '{0}' has no members")]
    EmptyGroupSequence(String),

    /// A redefined default group sequence broke a structural rule.
    #[error("Invalid default group sequence for type '{type_name}': {reason}")]
    InvalidDefaultSequence { type_name: String, reason: String },

    /// Two validators registered for one constraint with the same
    /// supported type, which would make runtime resolution ambiguous.
    #[error("Duplicate validator for constraint '{constraint}' with supported type {supported}")]
    DuplicateValidator { constraint: String, supported: String },

    /// A constraint kind with neither a validator nor composing parts.
    #[error("Unknown constraint: {0}")]
    UnknownConstraint(String),

    /// No registered validator accepts the runtime value kind.
    #[error("No validator for constraint '{constraint}' accepts values of kind {kind}")]
    NoValidator { constraint: String, kind: String },

    /// A constraint attribute is missing or has the wrong shape.
    #[error("Invalid attribute '{attribute}' on constraint '{constraint}': {reason}")]
    InvalidConstraintAttribute {
        constraint: String,
        attribute: String,
        reason: String,
    },

    /// Group conversions are only meaningful on cascading elements.
    #[error("Group conversion declared on non-cascading element '{element}' of type '{type_name}'")]
    ConversionWithoutCascade { type_name: String, element: String },

    /// Merged declarations for one element disagree.
    #[error("Conflicting declarations for element '{element}' of type '{type_name}': {reason}")]
    ConflictingElement {
        type_name: String,
        element: String,
        reason: String,
    },

    /// A declared parent type has no declaration of its own.
    #[error("Unknown parent type '{parent}' declared by '{type_name}'")]
    UnknownParentType { type_name: String, parent: String },

    /// The declared type hierarchy contains a cycle.
    #[error("Inheritance cycle detected involving type '{0}'")]
    InheritanceCycle(String),

    /// A property path named a property the type does not declare.
    #[error("Unknown property '{property}' on type '{type_name}'")]
    UnknownProperty { type_name: String, property: String },

    /// An executable name the type does not declare.
    #[error("Unknown executable '{executable}' on type '{type_name}'")]
    UnknownExecutable { type_name: String, executable: String },

    /// A property path crossed a null link that was never declared
    /// cascading, which is a usage mistake by the caller.
    #[error("Property path '{path}' crosses the null non-cascading link '{segment}'")]
    UnreachablePath { path: String, segment: String },

    /// A property path string could not be parsed or applied.
    #[error("Invalid property path '{path}': {reason}")]
    InvalidPropertyPath { path: String, reason: String },

    /// The caller passed the wrong number of arguments for an executable.
    #[error("Argument count mismatch for '{executable}': expected {expected}, got {actual}")]
    ArgumentCountMismatch {
        executable: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised while a validation call is in flight.
///
/// Fatal per call: the call aborts and no partial violation set is
/// returned.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// A validator implementation failed instead of returning a verdict.
    #[error("Validator for constraint '{constraint}' failed: {reason}")]
    ValidatorFailed { constraint: String, reason: String },

    /// A cascading link required by a property path is null.
    #[error("Cascading target '{segment}' of path '{path}' is null")]
    MissingCascadeTarget { path: String, segment: String },
}

/// Fatal error raised by a validation call.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
