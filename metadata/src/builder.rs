//! Flattening metadata builder.
//!
//! Resolves a type's declaration chain through the provider, merges
//! supertype declarations into one `BeanMetadata`, and performs the
//! eager structural checks. The hierarchy is walked here, once, and
//! never again during validation.

use std::collections::{BTreeMap, BTreeSet};

use verity_core::ConfigurationError;
use verity_groups::Group;

use crate::{
    BeanMetadata, ConstrainedElement, ElementKind, ExecutableMetadata, MetadataProvider,
    TypeDeclaration,
};

/// Builds flattened `BeanMetadata` from raw declarations.
pub struct MetadataBuilder<'p> {
    provider: &'p dyn MetadataProvider,
}

impl<'p> MetadataBuilder<'p> {
    /// Create a builder over a provider.
    pub fn new(provider: &'p dyn MetadataProvider) -> Self {
        Self { provider }
    }

    /// Build the flattened metadata for a type.
    ///
    /// A type without any declaration yields empty metadata. A declared
    /// parent without a declaration of its own, an inheritance cycle,
    /// conflicting merged elements and malformed default sequences all
    /// fail eagerly here.
    pub fn build(&self, type_name: &str) -> Result<BeanMetadata, ConfigurationError> {
        let mut order = Vec::new();
        let mut seen = BTreeSet::new();
        let mut stack = Vec::new();
        self.collect(type_name, &mut order, &mut seen, &mut stack)?;

        if order.is_empty() {
            return Ok(BeanMetadata::empty(type_name.to_string()));
        }

        let mut type_descriptors = Vec::new();
        let mut elements: Vec<ConstrainedElement> = Vec::new();
        let mut element_index: BTreeMap<String, usize> = BTreeMap::new();
        let mut executables = BTreeMap::new();

        // Parents first: supertype declarations land before subtype
        // additions, and a subtype executable replaces a supertype one.
        for declaration in &order {
            type_descriptors.extend(declaration.type_constraints().iter().cloned());

            for element in declaration.elements() {
                if element.kind() != ElementKind::Property {
                    return Err(ConfigurationError::ConflictingElement {
                        type_name: declaration.name().to_string(),
                        element: element.name().to_string(),
                        reason: "only property elements may appear in a type body".to_string(),
                    });
                }
                check_conversions(declaration.name(), element)?;
                match element_index.get(element.name()) {
                    Some(&index) => {
                        merge_element(declaration.name(), &mut elements[index], element)?
                    }
                    None => {
                        element_index.insert(element.name().to_string(), elements.len());
                        elements.push(element.clone());
                    }
                }
            }

            for executable in declaration.executables() {
                let executable = validate_executable(declaration.name(), executable.clone())?;
                executables.insert(executable.name().to_string(), executable);
            }
        }

        // The most-derived declared sequence wins; a sequence declared
        // on a supertype is inherited by subtypes that do not redefine.
        let mut default_sequence = None;
        for declaration in order.iter().rev() {
            if let Some(sequence) = declaration.declared_default_sequence() {
                default_sequence = Some(normalize_default_sequence(declaration.name(), sequence)?);
                break;
            }
        }

        Ok(BeanMetadata::new(
            type_name.to_string(),
            type_descriptors,
            elements,
            default_sequence,
            executables,
        ))
    }

    fn collect(
        &self,
        type_name: &str,
        order: &mut Vec<TypeDeclaration>,
        seen: &mut BTreeSet<String>,
        stack: &mut Vec<String>,
    ) -> Result<(), ConfigurationError> {
        if stack.iter().any(|entry| entry == type_name) {
            return Err(ConfigurationError::InheritanceCycle(type_name.to_string()));
        }
        if seen.contains(type_name) {
            // Diamond hierarchies contribute each declaration once.
            return Ok(());
        }

        let Some(declaration) = self.provider.declaration(type_name) else {
            if let Some(child) = stack.last() {
                return Err(ConfigurationError::UnknownParentType {
                    type_name: child.clone(),
                    parent: type_name.to_string(),
                });
            }
            return Ok(());
        };

        stack.push(type_name.to_string());
        for parent in declaration.parents() {
            self.collect(parent, order, seen, stack)?;
        }
        stack.pop();

        seen.insert(type_name.to_string());
        order.push(declaration);
        Ok(())
    }
}

fn check_conversions(
    type_name: &str,
    element: &ConstrainedElement,
) -> Result<(), ConfigurationError> {
    if !element.group_conversions().is_empty() && !element.cascades() {
        return Err(ConfigurationError::ConversionWithoutCascade {
            type_name: type_name.to_string(),
            element: element.name().to_string(),
        });
    }
    Ok(())
}

/// Merge a later declaration of an element into the one already
/// collected: field/accessor pairs within one type and redeclarations
/// across the hierarchy both land here. Constraints accumulate;
/// contradictory structure is rejected rather than silently resolved.
fn merge_element(
    type_name: &str,
    existing: &mut ConstrainedElement,
    incoming: &ConstrainedElement,
) -> Result<(), ConfigurationError> {
    let conflict = |reason: &str| ConfigurationError::ConflictingElement {
        type_name: type_name.to_string(),
        element: incoming.name().to_string(),
        reason: reason.to_string(),
    };

    if existing.kind() != incoming.kind() {
        return Err(conflict("declarations disagree on the element kind"));
    }

    if let Some(declared) = incoming.declared_type() {
        match existing.declared_type() {
            Some(previous) if previous != declared => {
                return Err(conflict("declarations disagree on the element type"));
            }
            Some(_) => {}
            None => existing.set_declared_type(declared.to_string()),
        }
    }

    if existing.cascades() && incoming.cascades() {
        for (from, to) in incoming.group_conversions() {
            match existing.group_conversions().get(from) {
                Some(previous) if previous != to => {
                    return Err(conflict("cascading declarations disagree on group conversions"));
                }
                _ => {}
            }
        }
    }
    if incoming.cascades() {
        existing.set_cascade(true);
        for (from, to) in incoming.group_conversions() {
            existing.insert_conversion(from.clone(), to.clone());
        }
    }

    existing.merge_descriptors_from(incoming);
    Ok(())
}

fn validate_executable(
    type_name: &str,
    mut executable: ExecutableMetadata,
) -> Result<ExecutableMetadata, ConfigurationError> {
    let conflict = |element: &str, reason: &str| ConfigurationError::ConflictingElement {
        type_name: type_name.to_string(),
        element: format!("{}.{}", executable.name(), element),
        reason: reason.to_string(),
    };

    let mut indexes = BTreeSet::new();
    for parameter in executable.parameters() {
        if parameter.kind() != ElementKind::Parameter {
            return Err(conflict(parameter.name(), "expected a parameter element"));
        }
        check_conversions(type_name, parameter)?;
        let Some(index) = parameter.parameter_index() else {
            return Err(conflict(parameter.name(), "parameter has no position"));
        };
        if !indexes.insert(index) {
            return Err(conflict(parameter.name(), "duplicate parameter position"));
        }
    }
    // One element per position, 0..n; unconstrained positions are
    // declared bare so argument counts stay checkable.
    for (expected, &actual) in indexes.iter().enumerate() {
        if expected != actual {
            return Err(conflict(
                "parameters",
                "parameter positions must be contiguous from zero",
            ));
        }
    }

    if let Some(return_value) = executable.return_value() {
        if return_value.kind() != ElementKind::ReturnValue {
            return Err(conflict(return_value.name(), "expected a return-value element"));
        }
        check_conversions(type_name, return_value)?;
    }

    executable.sort_parameters();
    Ok(executable)
}

fn normalize_default_sequence(
    declaring: &str,
    sequence: &[Group],
) -> Result<Vec<Group>, ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidDefaultSequence {
        type_name: declaring.to_string(),
        reason: reason.to_string(),
    };

    if sequence.is_empty() {
        return Err(invalid("sequence is empty"));
    }

    let mut normalized = Vec::with_capacity(sequence.len());
    let mut own_slots = 0;
    for group in sequence {
        if group.is_default() {
            return Err(invalid("sequence must not contain the Default group"));
        }
        if group.name() == declaring {
            own_slots += 1;
            normalized.push(Group::default_group());
        } else {
            normalized.push(group.clone());
        }
    }
    if own_slots != 1 {
        return Err(invalid("sequence must mention the redefining type exactly once"));
    }
    for (i, group) in normalized.iter().enumerate() {
        if normalized[i + 1..].contains(group) {
            return Err(invalid("sequence contains a duplicate group"));
        }
    }
    Ok(normalized)
}
