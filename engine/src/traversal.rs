//! The graph traversal at the heart of a validation call.
//!
//! One `Traversal` lives for exactly one public API call. It owns the
//! violation accumulator and the cycle-guarding visited set; everything
//! else it borrows from the engine. Bean properties, executable
//! parameters and return values all funnel through the same
//! element-validation machinery, differing only in the path node they
//! produce.

use std::sync::Arc;

use verity_core::{ObjectRef, ValidationResult, Value};
use verity_groups::Group;
use verity_metadata::{
    BeanMetadata, ConstrainedElement, ConstraintDescriptor, ElementKind, ExecutableMetadata,
};
use verity_path::{ElementIndex, Path, PathNode};

use crate::context::TraversalContext;
use crate::message::MessageContext;
use crate::validator::Validator;
use crate::violation::{Violation, Violations};

/// Where an element's value sits, for path construction.
pub(crate) enum Slot<'a> {
    Property(&'a str),
    Parameter { index: usize, name: Option<&'a str> },
    ReturnValue,
}

impl Slot<'_> {
    fn path(&self, base: &Path, element: Option<ElementIndex>) -> Path {
        let node = match self {
            Slot::Property(name) => PathNode::Property {
                name: (*name).to_string(),
                index: element,
            },
            Slot::Parameter { index, name } => PathNode::Parameter {
                index: *index,
                name: name.map(str::to_string),
                element,
            },
            Slot::ReturnValue => PathNode::ReturnValue { element },
        };
        base.with_node(node)
    }
}

pub(crate) struct Traversal<'v> {
    engine: &'v Validator,
    root: Option<ObjectRef>,
    context: TraversalContext,
    pub(crate) violations: Violations,
}

impl<'v> Traversal<'v> {
    pub(crate) fn new(engine: &'v Validator, root: Option<ObjectRef>) -> Self {
        Self {
            engine,
            root,
            context: TraversalContext::new(),
            violations: Violations::new(),
        }
    }

    pub(crate) fn into_violations(self) -> Violations {
        self.violations
    }

    /// Validate one object for one requested group, honoring the
    /// type's redefined default sequence and the per-call visit guard.
    pub(crate) fn validate_object(
        &mut self,
        object: &ObjectRef,
        metadata: &BeanMetadata,
        group: &Group,
        path: &Path,
    ) -> ValidationResult<()> {
        if !self.context.begin(object.identity(), group) {
            return Ok(());
        }
        let result = self.validate_object_guarded(object, metadata, group, path);
        self.context.finish(object.identity(), group);
        result
    }

    fn validate_object_guarded(
        &mut self,
        object: &ObjectRef,
        metadata: &BeanMetadata,
        group: &Group,
        path: &Path,
    ) -> ValidationResult<()> {
        if group.is_default() {
            if let Some(sequence) = metadata.default_sequence() {
                // Redefined default: iterate the sequence for this bean
                // and stop after the first group that contributed
                // violations.
                for sequence_group in sequence.to_vec() {
                    let before = self.violations.len();
                    self.validate_object_for_group(object, metadata, &sequence_group, path)?;
                    if self.violations.len() > before {
                        break;
                    }
                }
                return Ok(());
            }
        }
        self.validate_object_for_group(object, metadata, group, path)
    }

    fn validate_object_for_group(
        &mut self,
        object: &ObjectRef,
        metadata: &BeanMetadata,
        group: &Group,
        path: &Path,
    ) -> ValidationResult<()> {
        // Class-level constraints see the object itself; at the root
        // that means an empty path.
        let object_value = Value::Object(object.clone());
        for descriptor in metadata.type_descriptors() {
            if descriptor.applies_to_group(group) {
                self.check(descriptor, &object_value, path, Some(object), ElementKind::Type)?;
            }
        }

        for element in metadata.elements() {
            let value = object.get(element.name()).unwrap_or(Value::Null);
            let slot = Slot::Property(element.name());
            self.validate_element(element, &value, Some(object), group, path, &slot)?;
        }
        Ok(())
    }

    /// The shared element machinery: own constraints, container-element
    /// constraints, then cascading.
    pub(crate) fn validate_element(
        &mut self,
        element: &ConstrainedElement,
        value: &Value,
        leaf: Option<&ObjectRef>,
        group: &Group,
        base: &Path,
        slot: &Slot<'_>,
    ) -> ValidationResult<()> {
        let own_path = slot.path(base, None);
        for descriptor in element.descriptors() {
            if descriptor.applies_to_group(group) {
                self.check(descriptor, value, &own_path, leaf, element.kind())?;
            }
        }

        if !element.element_descriptors().is_empty() {
            self.validate_container_elements(element, value, leaf, group, base, slot)?;
        }

        if element.cascades() && !value.is_null() {
            let effective = element.convert(group);
            self.cascade_value(value, base, slot, &effective)?;
        }
        Ok(())
    }

    fn validate_container_elements(
        &mut self,
        element: &ConstrainedElement,
        value: &Value,
        leaf: Option<&ObjectRef>,
        group: &Group,
        base: &Path,
        slot: &Slot<'_>,
    ) -> ValidationResult<()> {
        match value {
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    let path = slot.path(base, Some(ElementIndex::Position(index)));
                    self.check_element_descriptors(element, item, &path, leaf, group)?;
                }
            }
            Value::Map(entries) => {
                for (key, item) in entries {
                    let path = slot.path(base, Some(ElementIndex::Key(key.clone())));
                    self.check_element_descriptors(element, item, &path, leaf, group)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn check_element_descriptors(
        &mut self,
        element: &ConstrainedElement,
        item: &Value,
        path: &Path,
        leaf: Option<&ObjectRef>,
        group: &Group,
    ) -> ValidationResult<()> {
        for descriptor in element.element_descriptors() {
            if descriptor.applies_to_group(group) {
                self.check(descriptor, item, path, leaf, element.kind())?;
            }
        }
        Ok(())
    }

    fn cascade_value(
        &mut self,
        value: &Value,
        base: &Path,
        slot: &Slot<'_>,
        group: &Group,
    ) -> ValidationResult<()> {
        match value {
            Value::Object(child) => {
                let path = slot.path(base, None);
                self.cascade_object(child, path, group)
            }
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    // Null elements are skipped; a constraint on the
                    // container itself owns that concern.
                    if let Value::Object(child) = item {
                        let path = slot.path(base, Some(ElementIndex::Position(index)));
                        self.cascade_object(child, path, group)?;
                    }
                }
                Ok(())
            }
            Value::Map(entries) => {
                for (key, item) in entries {
                    if let Value::Object(child) = item {
                        let path = slot.path(base, Some(ElementIndex::Key(key.clone())));
                        self.cascade_object(child, path, group)?;
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn cascade_object(
        &mut self,
        child: &ObjectRef,
        path: Path,
        group: &Group,
    ) -> ValidationResult<()> {
        let metadata = self.engine.metadata().get(child.type_name())?;
        if metadata.is_unconstrained() {
            return Ok(());
        }
        self.validate_object(child, &metadata, group, &path)
    }

    /// Validate the parameter list of an executable for one group:
    /// every single-parameter constraint first, cross-parameter
    /// constraints after.
    pub(crate) fn validate_parameter_set(
        &mut self,
        executable: &ExecutableMetadata,
        args: &[Value],
        leaf: Option<&ObjectRef>,
        group: &Group,
    ) -> ValidationResult<()> {
        let base = Path::root().executable(executable.name());

        for element in executable.parameters() {
            // Positions are validated contiguous at metadata build.
            let index = element.parameter_index().unwrap_or(0);
            let slot = Slot::Parameter {
                index,
                name: element.parameter_name(),
            };
            self.validate_element(element, &args[index], leaf, group, &base, &slot)?;
        }

        if !executable.cross_parameter().is_empty() {
            let argument_list = Value::List(args.to_vec());
            let path = base.cross_parameter();
            for descriptor in executable.cross_parameter() {
                if descriptor.applies_to_group(group) {
                    self.check(
                        descriptor,
                        &argument_list,
                        &path,
                        leaf,
                        ElementKind::CrossParameter,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Validate a return value for one group.
    pub(crate) fn validate_return_element(
        &mut self,
        executable: &ExecutableMetadata,
        value: &Value,
        leaf: Option<&ObjectRef>,
        group: &Group,
    ) -> ValidationResult<()> {
        let Some(element) = executable.return_value() else {
            return Ok(());
        };
        let base = Path::root().executable(executable.name());
        self.validate_element(element, value, leaf, group, &base, &Slot::ReturnValue)
    }

    /// Validate one property element in isolation, as
    /// `validate_property`/`validate_value` do. Honors the owning
    /// type's redefined default sequence; never cascades.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn validate_property_element(
        &mut self,
        element: &ConstrainedElement,
        value: &Value,
        owner: Option<&ObjectRef>,
        metadata: &BeanMetadata,
        group: &Group,
        base: &Path,
        qualifier: Option<&ElementIndex>,
    ) -> ValidationResult<()> {
        if group.is_default() {
            if let Some(sequence) = metadata.default_sequence() {
                for sequence_group in sequence.to_vec() {
                    let before = self.violations.len();
                    self.property_element_for_group(
                        element,
                        value,
                        owner,
                        &sequence_group,
                        base,
                        qualifier,
                    )?;
                    if self.violations.len() > before {
                        break;
                    }
                }
                return Ok(());
            }
        }
        self.property_element_for_group(element, value, owner, group, base, qualifier)
    }

    fn property_element_for_group(
        &mut self,
        element: &ConstrainedElement,
        value: &Value,
        owner: Option<&ObjectRef>,
        group: &Group,
        base: &Path,
        qualifier: Option<&ElementIndex>,
    ) -> ValidationResult<()> {
        let slot = Slot::Property(element.name());
        let path = slot.path(base, qualifier.cloned());
        let descriptors = match qualifier {
            None => element.descriptors(),
            Some(_) => element.element_descriptors(),
        };
        for descriptor in descriptors {
            if descriptor.applies_to_group(group) {
                self.check(descriptor, value, &path, owner, element.kind())?;
            }
        }
        Ok(())
    }

    fn check(
        &mut self,
        descriptor: &Arc<ConstraintDescriptor>,
        value: &Value,
        path: &Path,
        leaf: Option<&ObjectRef>,
        kind: ElementKind,
    ) -> ValidationResult<()> {
        let failures = self.engine.evaluator().evaluate(descriptor, value)?;
        for failure in failures {
            let ctx = MessageContext::new(failure.descriptor().attributes(), value);
            let message = self
                .engine
                .messages()
                .interpolate(failure.message_template(), &ctx);
            let mut violation = Violation::new(
                failure.descriptor().clone(),
                path.clone(),
                failure.message_template(),
                message,
                value.clone(),
                kind,
            );
            if let Some(root) = &self.root {
                violation = violation.with_root(root.clone());
            }
            if let Some(leaf) = leaf {
                violation = violation.with_leaf(leaf.clone());
            }
            if let Some(payload) = failure.payload() {
                violation = violation.with_payload(payload.clone());
            }
            self.violations.push(violation);
        }
        Ok(())
    }
}
