//! Constrained elements.

use std::collections::BTreeMap;
use std::sync::Arc;

use verity_groups::Group;

use crate::ConstraintDescriptor;

/// The kind of location a constraint or violation attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// The type itself (class-level constraints; empty violation path).
    Type,
    /// A bean property.
    Property,
    /// A method or constructor parameter.
    Parameter,
    /// A method or constructor return value.
    ReturnValue,
    /// The full parameter list of an executable.
    CrossParameter,
}

/// A validatable location on a type, with the constraints declared on
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainedElement {
    name: String,
    kind: ElementKind,
    parameter_index: Option<usize>,
    parameter_named: bool,
    declared_type: Option<String>,
    cascade: bool,
    descriptors: Vec<Arc<ConstraintDescriptor>>,
    element_descriptors: Vec<Arc<ConstraintDescriptor>>,
    group_conversions: BTreeMap<Group, Group>,
}

impl ConstrainedElement {
    fn new(name: String, kind: ElementKind) -> Self {
        Self {
            name,
            kind,
            parameter_index: None,
            parameter_named: false,
            declared_type: None,
            cascade: false,
            descriptors: Vec::new(),
            element_descriptors: Vec::new(),
            group_conversions: BTreeMap::new(),
        }
    }

    /// A bean property element.
    pub fn property(name: impl Into<String>) -> Self {
        Self::new(name.into(), ElementKind::Property)
    }

    /// An unnamed executable parameter, identified by position.
    pub fn parameter(index: usize) -> Self {
        let mut element = Self::new(format!("arg{}", index), ElementKind::Parameter);
        element.parameter_index = Some(index);
        element
    }

    /// A named executable parameter.
    pub fn named_parameter(index: usize, name: impl Into<String>) -> Self {
        let mut element = Self::new(name.into(), ElementKind::Parameter);
        element.parameter_index = Some(index);
        element.parameter_named = true;
        element
    }

    /// An executable return value.
    pub fn return_value() -> Self {
        Self::new("<return value>".to_string(), ElementKind::ReturnValue)
    }

    /// Declare the element's type, used for metadata-only traversal
    /// (`validate_value`) where no instance is available.
    pub fn of_type(mut self, type_name: impl Into<String>) -> Self {
        self.declared_type = Some(type_name.into());
        self
    }

    /// Attach a constraint to this element.
    pub fn constraint(mut self, descriptor: ConstraintDescriptor) -> Self {
        self.descriptors.push(Arc::new(descriptor));
        self
    }

    /// Attach a constraint to each element of this element's container
    /// value.
    pub fn element_constraint(mut self, descriptor: ConstraintDescriptor) -> Self {
        self.element_descriptors.push(Arc::new(descriptor));
        self
    }

    /// Mark this element cascading: validation recurses into its value.
    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }

    /// Convert a group when cascading through this element.
    pub fn convert_group(mut self, from: impl Into<Group>, to: impl Into<Group>) -> Self {
        self.group_conversions.insert(from.into(), to.into());
        self
    }

    /// The element name (property name, parameter name or `arg{i}`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element kind.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The parameter position, for parameter elements.
    pub fn parameter_index(&self) -> Option<usize> {
        self.parameter_index
    }

    /// The declared parameter name, when one was given.
    pub fn parameter_name(&self) -> Option<&str> {
        if self.parameter_named {
            Some(&self.name)
        } else {
            None
        }
    }

    /// The declared type name, if any.
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    /// Whether validation recurses into this element's value.
    pub fn cascades(&self) -> bool {
        self.cascade
    }

    /// Constraints on the element's own value.
    pub fn descriptors(&self) -> &[Arc<ConstraintDescriptor>] {
        &self.descriptors
    }

    /// Constraints on each element of the container value.
    pub fn element_descriptors(&self) -> &[Arc<ConstraintDescriptor>] {
        &self.element_descriptors
    }

    /// The declared group conversions.
    pub fn group_conversions(&self) -> &BTreeMap<Group, Group> {
        &self.group_conversions
    }

    /// The effective group after conversion, applied only when
    /// cascading through this element.
    pub fn convert(&self, group: &Group) -> Group {
        self.group_conversions
            .get(group)
            .cloned()
            .unwrap_or_else(|| group.clone())
    }

    /// Returns true if the element carries no constraints and does not
    /// cascade.
    pub fn is_unconstrained(&self) -> bool {
        self.descriptors.is_empty() && self.element_descriptors.is_empty() && !self.cascade
    }

    pub(crate) fn merge_descriptors_from(&mut self, other: &ConstrainedElement) {
        self.descriptors.extend(other.descriptors.iter().cloned());
        self.element_descriptors
            .extend(other.element_descriptors.iter().cloned());
    }

    pub(crate) fn set_cascade(&mut self, cascade: bool) {
        self.cascade = cascade;
    }

    pub(crate) fn insert_conversion(&mut self, from: Group, to: Group) {
        self.group_conversions.insert(from, to);
    }

    pub(crate) fn set_declared_type(&mut self, type_name: String) {
        self.declared_type = Some(type_name);
    }
}
