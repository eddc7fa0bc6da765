//! Flattened per-type metadata.

use std::collections::BTreeMap;
use std::sync::Arc;

use verity_groups::Group;

use crate::{ConstrainedElement, ConstraintDescriptor};

/// Whether an executable is a method or a constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableKind {
    Method,
    Constructor,
}

/// Constraint metadata for one method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableMetadata {
    name: String,
    kind: ExecutableKind,
    parameters: Vec<ConstrainedElement>,
    cross_parameter: Vec<Arc<ConstraintDescriptor>>,
    return_value: Option<ConstrainedElement>,
}

impl ExecutableMetadata {
    /// Metadata for a method.
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ExecutableKind::Method,
            parameters: Vec::new(),
            cross_parameter: Vec::new(),
            return_value: None,
        }
    }

    /// Metadata for a constructor.
    pub fn constructor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ExecutableKind::Constructor,
            parameters: Vec::new(),
            cross_parameter: Vec::new(),
            return_value: None,
        }
    }

    /// Add a parameter element.
    pub fn parameter(mut self, element: ConstrainedElement) -> Self {
        self.parameters.push(element);
        self
    }

    /// Add a cross-parameter constraint, validated against the full
    /// argument list after all single-parameter constraints of the same
    /// group.
    pub fn cross_constraint(mut self, descriptor: ConstraintDescriptor) -> Self {
        self.cross_parameter
            .push(Arc::new(descriptor.cross_parameter()));
        self
    }

    /// Set the return-value element.
    pub fn returns(mut self, element: ConstrainedElement) -> Self {
        self.return_value = Some(element);
        self
    }

    /// The executable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method or constructor.
    pub fn kind(&self) -> ExecutableKind {
        self.kind
    }

    /// The parameter elements, ordered by position.
    pub fn parameters(&self) -> &[ConstrainedElement] {
        &self.parameters
    }

    /// The cross-parameter constraints.
    pub fn cross_parameter(&self) -> &[Arc<ConstraintDescriptor>] {
        &self.cross_parameter
    }

    /// The return-value element, if constrained.
    pub fn return_value(&self) -> Option<&ConstrainedElement> {
        self.return_value.as_ref()
    }

    pub(crate) fn sort_parameters(&mut self) {
        self.parameters
            .sort_by_key(|element| element.parameter_index());
    }
}

/// Immutable, flattened constraint metadata for one type.
///
/// Built once per type from the metadata provider, with all supertype
/// declarations merged in, then cached for the lifetime of the engine.
#[derive(Debug)]
pub struct BeanMetadata {
    type_name: String,
    type_descriptors: Vec<Arc<ConstraintDescriptor>>,
    elements: Vec<ConstrainedElement>,
    element_index: BTreeMap<String, usize>,
    default_sequence: Option<Vec<Group>>,
    executables: BTreeMap<String, ExecutableMetadata>,
    unconstrained: bool,
}

impl BeanMetadata {
    pub(crate) fn new(
        type_name: String,
        type_descriptors: Vec<Arc<ConstraintDescriptor>>,
        elements: Vec<ConstrainedElement>,
        default_sequence: Option<Vec<Group>>,
        executables: BTreeMap<String, ExecutableMetadata>,
    ) -> Self {
        let element_index = elements
            .iter()
            .enumerate()
            .map(|(i, element)| (element.name().to_string(), i))
            .collect();
        let unconstrained = type_descriptors.is_empty()
            && elements.iter().all(ConstrainedElement::is_unconstrained);
        Self {
            type_name,
            type_descriptors,
            elements,
            element_index,
            default_sequence,
            executables,
            unconstrained,
        }
    }

    /// Empty metadata for a type with no declaration.
    pub(crate) fn empty(type_name: String) -> Self {
        Self::new(type_name, Vec::new(), Vec::new(), None, BTreeMap::new())
    }

    /// The type this metadata describes.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Class-level constraints, validated against the object itself.
    pub fn type_descriptors(&self) -> &[Arc<ConstraintDescriptor>] {
        &self.type_descriptors
    }

    /// All property elements, in declaration order.
    pub fn elements(&self) -> &[ConstrainedElement] {
        &self.elements
    }

    /// Look up a property element by name.
    pub fn element(&self, name: &str) -> Option<&ConstrainedElement> {
        self.element_index
            .get(name)
            .map(|&index| &self.elements[index])
    }

    /// The normalized redefined default group sequence, if the type
    /// declares one. The slot that named the type itself has been
    /// replaced by the implicit default group.
    pub fn default_sequence(&self) -> Option<&[Group]> {
        self.default_sequence.as_deref()
    }

    /// Look up executable metadata by name.
    pub fn executable(&self, name: &str) -> Option<&ExecutableMetadata> {
        self.executables.get(name)
    }

    /// All executables, keyed by name.
    pub fn executables(&self) -> &BTreeMap<String, ExecutableMetadata> {
        &self.executables
    }

    /// Returns true if the type carries no property or type-level
    /// constraints and cascades nowhere. This is the common hot path:
    /// validating such a type returns immediately.
    pub fn is_unconstrained(&self) -> bool {
        self.unconstrained
    }
}
