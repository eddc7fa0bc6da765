//! Constraint descriptors.

use std::collections::BTreeMap;
use std::sync::Arc;

use verity_core::Value;
use verity_groups::Group;

/// What a constraint is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstraintTarget {
    /// The annotated element's own value (the common case).
    #[default]
    Element,
    /// The full parameter list of an executable.
    CrossParameter,
}

/// One declared constraint occurrence.
///
/// Descriptors are plain data: the constraint kind identity, its static
/// attributes (e.g. `min`, `max`, `regexp`), the groups it runs in, and
/// any composing sub-constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDescriptor {
    kind: String,
    attributes: BTreeMap<String, Value>,
    groups: Vec<Group>,
    payload: Vec<String>,
    message: Option<String>,
    composing: Vec<Arc<ConstraintDescriptor>>,
    report_as_single: bool,
    target: ConstraintTarget,
}

impl ConstraintDescriptor {
    /// Create a descriptor for a constraint kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: BTreeMap::new(),
            groups: Vec::new(),
            payload: Vec::new(),
            message: None,
            composing: Vec::new(),
            report_as_single: false,
            target: ConstraintTarget::Element,
        }
    }

    /// Set a static attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a group this constraint runs in. Without any explicit group
    /// the constraint runs in the implicit default group.
    pub fn in_group(mut self, group: impl Into<Group>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Add a payload marker.
    pub fn payload(mut self, marker: impl Into<String>) -> Self {
        self.payload.push(marker.into());
        self
    }

    /// Set the message template, overriding the kind's default.
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.message = Some(template.into());
        self
    }

    /// Add a composing sub-constraint. All parts combine with logical
    /// AND.
    pub fn compose(mut self, sub: ConstraintDescriptor) -> Self {
        self.composing.push(Arc::new(sub));
        self
    }

    /// Collapse all failing parts into a single violation carrying this
    /// descriptor's message.
    pub fn as_single_violation(mut self) -> Self {
        self.report_as_single = true;
        self
    }

    /// Mark this constraint as validating the full parameter list of an
    /// executable.
    pub fn cross_parameter(mut self) -> Self {
        self.target = ConstraintTarget::CrossParameter;
        self
    }

    /// The constraint kind identity.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The static attribute map.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Look up one attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// The explicitly declared groups (empty means implicit default).
    pub fn declared_groups(&self) -> &[Group] {
        &self.groups
    }

    /// Whether this constraint runs in the given group.
    pub fn applies_to_group(&self, group: &Group) -> bool {
        if self.groups.is_empty() {
            group.is_default()
        } else {
            self.groups.contains(group)
        }
    }

    /// The payload markers.
    pub fn payload_markers(&self) -> &[String] {
        &self.payload
    }

    /// The explicit message template, if one was declared.
    pub fn message_template(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The composing sub-constraints.
    pub fn composing(&self) -> &[Arc<ConstraintDescriptor>] {
        &self.composing
    }

    /// Whether failing parts collapse into one violation.
    pub fn reports_as_single(&self) -> bool {
        self.report_as_single
    }

    /// What this constraint is validated against.
    pub fn target(&self) -> ConstraintTarget {
        self.target
    }
}
