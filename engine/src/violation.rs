//! Constraint violation types.

use std::sync::Arc;

use verity_core::{ObjectRef, Value};
use verity_metadata::{ConstraintDescriptor, ElementKind};
use verity_path::Path;

/// A constraint violation.
///
/// Immutable record of one failed constraint occurrence: where it
/// happened (path, root and leaf objects), what failed (descriptor,
/// invalid value) and how to present it (templates and the
/// interpolated message).
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    descriptor: Arc<ConstraintDescriptor>,
    path: Path,
    message_template: String,
    message: String,
    invalid_value: Value,
    element_kind: ElementKind,
    root: Option<ObjectRef>,
    leaf: Option<ObjectRef>,
    payload: Option<Value>,
}

impl Violation {
    /// Create a new violation.
    pub fn new(
        descriptor: Arc<ConstraintDescriptor>,
        path: Path,
        message_template: impl Into<String>,
        message: impl Into<String>,
        invalid_value: Value,
        element_kind: ElementKind,
    ) -> Self {
        Self {
            descriptor,
            path,
            message_template: message_template.into(),
            message: message.into(),
            invalid_value,
            element_kind,
            root: None,
            leaf: None,
            payload: None,
        }
    }

    /// Attach the root object of the validation call.
    pub fn with_root(mut self, root: ObjectRef) -> Self {
        self.root = Some(root);
        self
    }

    /// Attach the object hosting the violated element.
    pub fn with_leaf(mut self, leaf: ObjectRef) -> Self {
        self.leaf = Some(leaf);
        self
    }

    /// Attach a dynamic payload set by the validator.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The violated constraint occurrence.
    pub fn descriptor(&self) -> &Arc<ConstraintDescriptor> {
        &self.descriptor
    }

    /// The constraint kind identity.
    pub fn constraint_kind(&self) -> &str {
        self.descriptor.kind()
    }

    /// The path from the root object to the invalid value.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw message template.
    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    /// The interpolated, human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The value that failed the constraint.
    pub fn invalid_value(&self) -> &Value {
        &self.invalid_value
    }

    /// What kind of element the violation occurred on.
    pub fn element_kind(&self) -> ElementKind {
        self.element_kind
    }

    /// The root object of the validation call, when one existed.
    pub fn root(&self) -> Option<&ObjectRef> {
        self.root.as_ref()
    }

    /// The object hosting the violated element.
    pub fn leaf(&self) -> Option<&ObjectRef> {
        self.leaf.as_ref()
    }

    /// Dynamic payload set by the validator, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

/// Collection of violations, in traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Create a new empty violations collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Check if there are any violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Get the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Get all violations.
    pub fn all(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterate over the violations.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Merge another violations collection.
    pub fn merge(&mut self, other: Violations) {
        self.violations.extend(other.violations);
    }

    /// Rendered paths of all violations, in traversal order.
    pub fn paths(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|violation| violation.path().to_string())
            .collect()
    }

    /// Constraint kinds of all violations, in traversal order.
    pub fn constraint_kinds(&self) -> Vec<&str> {
        self.violations
            .iter()
            .map(Violation::constraint_kind)
            .collect()
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
