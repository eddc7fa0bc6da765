//! The public validation API.

use std::sync::Arc;

use tracing::trace;

use verity_core::{
    ConfigurationError, ObjectRef, ProcessingError, ValidationResult, Value,
};
use verity_dispatch::{ConstraintEvaluator, ValidatorRegistry};
use verity_groups::{Group, GroupResolver, GroupSequence};
use verity_metadata::{
    BeanMetadata, ExecutableKind, ExecutableMetadata, MapMetadataProvider, MetadataCache,
    MetadataProvider,
};
use verity_path::{parse_property_path, ElementIndex, Path, PathSegment};

use crate::message::{DefaultMessageResolver, MessageResolver};
use crate::traversal::Traversal;
use crate::violation::Violations;

/// Assembles a `Validator` from its collaborators.
///
/// Only the metadata provider is commonly supplied; the registry
/// defaults to the built-in validators and messages to the default
/// resolver.
#[derive(Default)]
pub struct ValidatorBuilder {
    provider: Option<Arc<dyn MetadataProvider>>,
    registry: Option<ValidatorRegistry>,
    sequences: Vec<GroupSequence>,
    messages: Option<Arc<dyn MessageResolver>>,
}

impl ValidatorBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metadata provider.
    pub fn provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the validator registry (defaults to the built-ins).
    pub fn registry(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register a named group sequence.
    pub fn sequence(mut self, sequence: GroupSequence) -> Self {
        self.sequences.push(sequence);
        self
    }

    /// Replace the message resolver.
    pub fn message_resolver(mut self, resolver: Arc<dyn MessageResolver>) -> Self {
        self.messages = Some(resolver);
        self
    }

    /// Build the validator.
    pub fn build(self) -> Result<Validator, ConfigurationError> {
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(MapMetadataProvider::new()));
        let registry = match self.registry {
            Some(registry) => registry,
            None => ValidatorRegistry::with_builtins()?,
        };
        let mut groups = GroupResolver::new();
        for sequence in self.sequences {
            groups.add_sequence(sequence)?;
        }
        Ok(Validator {
            metadata: MetadataCache::new(provider),
            evaluator: ConstraintEvaluator::new(Arc::new(registry)),
            groups,
            messages: self
                .messages
                .unwrap_or_else(|| Arc::new(DefaultMessageResolver)),
        })
    }
}

/// The validation engine.
///
/// Holds the immutable metadata and validator caches; individual calls
/// own their traversal state, so one engine serves unboundedly many
/// concurrent calls.
pub struct Validator {
    metadata: MetadataCache,
    evaluator: ConstraintEvaluator,
    groups: GroupResolver,
    messages: Arc<dyn MessageResolver>,
}

impl Validator {
    /// Start building a validator.
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    pub(crate) fn metadata(&self) -> &MetadataCache {
        &self.metadata
    }

    pub(crate) fn evaluator(&self) -> &ConstraintEvaluator {
        &self.evaluator
    }

    pub(crate) fn messages(&self) -> &dyn MessageResolver {
        self.messages.as_ref()
    }

    /// Validate an object graph for the requested groups.
    pub fn validate(&self, root: &ObjectRef, groups: &[Group]) -> ValidationResult<Violations> {
        let units = self.groups.resolve(groups)?;
        let metadata = self.metadata.get(root.type_name())?;
        if metadata.is_unconstrained() {
            return Ok(Violations::new());
        }
        trace!(type_name = root.type_name(), "validating object graph");

        let mut traversal = Traversal::new(self, Some(root.clone()));
        for unit in &units {
            for group in unit.groups() {
                let before = traversal.violations.len();
                traversal.validate_object(root, &metadata, group, &Path::root())?;
                if unit.fail_fast() && traversal.violations.len() > before {
                    break;
                }
            }
        }
        Ok(traversal.into_violations())
    }

    /// Validate a single property of an object, identified by a dotted
    /// path such as `address.city` or `items[1]`.
    ///
    /// Constraints declared on the named property are evaluated; the
    /// traversal does not cascade beyond it.
    pub fn validate_property(
        &self,
        root: &ObjectRef,
        property: &str,
        groups: &[Group],
    ) -> ValidationResult<Violations> {
        let units = self.groups.resolve(groups)?;
        let segments = parse_segments(property)?;
        let (owner, metadata, base) = self.walk_to_owner(root, property, &segments)?;

        let last = &segments[segments.len() - 1];
        let element = metadata.element(&last.name).ok_or_else(|| {
            ConfigurationError::UnknownProperty {
                type_name: metadata.type_name().to_string(),
                property: last.name.clone(),
            }
        })?;
        let raw = owner.get(&last.name).unwrap_or(Value::Null);
        let value = indexed_value(raw, last, property)?;

        let mut traversal = Traversal::new(self, Some(root.clone()));
        for unit in &units {
            for group in unit.groups() {
                let before = traversal.violations.len();
                traversal.validate_property_element(
                    element,
                    &value,
                    Some(&owner),
                    &metadata,
                    group,
                    &base,
                    last.index.as_ref(),
                )?;
                if unit.fail_fast() && traversal.violations.len() > before {
                    break;
                }
            }
        }
        Ok(traversal.into_violations())
    }

    /// Validate a candidate value as if it were assigned to the given
    /// property of the given type. No instance is involved; nested
    /// paths traverse declared element types.
    pub fn validate_value(
        &self,
        type_name: &str,
        property: &str,
        value: &Value,
        groups: &[Group],
    ) -> ValidationResult<Violations> {
        let units = self.groups.resolve(groups)?;
        let segments = parse_segments(property)?;

        let mut metadata = self.metadata.get(type_name)?;
        let mut base = Path::root();
        for segment in &segments[..segments.len() - 1] {
            let declared = {
                let element = metadata.element(&segment.name).ok_or_else(|| {
                    ConfigurationError::UnknownProperty {
                        type_name: metadata.type_name().to_string(),
                        property: segment.name.clone(),
                    }
                })?;
                element.declared_type().map(str::to_string).ok_or_else(|| {
                    ConfigurationError::InvalidPropertyPath {
                        path: property.to_string(),
                        reason: format!("segment '{}' has no declared type", segment.name),
                    }
                })?
            };
            base = extend_path(&base, segment);
            metadata = self.metadata.get(&declared)?;
        }

        let last = &segments[segments.len() - 1];
        let element = metadata.element(&last.name).ok_or_else(|| {
            ConfigurationError::UnknownProperty {
                type_name: metadata.type_name().to_string(),
                property: last.name.clone(),
            }
        })?;

        let mut traversal = Traversal::new(self, None);
        for unit in &units {
            for group in unit.groups() {
                let before = traversal.violations.len();
                traversal.validate_property_element(
                    element,
                    value,
                    None,
                    &metadata,
                    group,
                    &base,
                    last.index.as_ref(),
                )?;
                if unit.fail_fast() && traversal.violations.len() > before {
                    break;
                }
            }
        }
        Ok(traversal.into_violations())
    }

    /// Validate the arguments of a method invocation on `target`.
    pub fn validate_parameters(
        &self,
        target: &ObjectRef,
        method: &str,
        args: &[Value],
        groups: &[Group],
    ) -> ValidationResult<Violations> {
        let units = self.groups.resolve(groups)?;
        let metadata = self.metadata.get(target.type_name())?;
        let executable =
            find_executable(&metadata, target.type_name(), method, ExecutableKind::Method)?;
        check_arity(executable, args)?;

        let mut traversal = Traversal::new(self, Some(target.clone()));
        for unit in &units {
            for group in unit.groups() {
                let before = traversal.violations.len();
                traversal.validate_parameter_set(executable, args, Some(target), group)?;
                if unit.fail_fast() && traversal.violations.len() > before {
                    break;
                }
            }
        }
        Ok(traversal.into_violations())
    }

    /// Validate the return value of a method invocation on `target`.
    pub fn validate_return_value(
        &self,
        target: &ObjectRef,
        method: &str,
        value: &Value,
        groups: &[Group],
    ) -> ValidationResult<Violations> {
        let units = self.groups.resolve(groups)?;
        let metadata = self.metadata.get(target.type_name())?;
        let executable =
            find_executable(&metadata, target.type_name(), method, ExecutableKind::Method)?;

        let mut traversal = Traversal::new(self, Some(target.clone()));
        for unit in &units {
            for group in unit.groups() {
                let before = traversal.violations.len();
                traversal.validate_return_element(executable, value, Some(target), group)?;
                if unit.fail_fast() && traversal.violations.len() > before {
                    break;
                }
            }
        }
        Ok(traversal.into_violations())
    }

    /// Validate the arguments of a constructor invocation.
    pub fn validate_constructor_parameters(
        &self,
        type_name: &str,
        constructor: &str,
        args: &[Value],
        groups: &[Group],
    ) -> ValidationResult<Violations> {
        let units = self.groups.resolve(groups)?;
        let metadata = self.metadata.get(type_name)?;
        let executable =
            find_executable(&metadata, type_name, constructor, ExecutableKind::Constructor)?;
        check_arity(executable, args)?;

        let mut traversal = Traversal::new(self, None);
        for unit in &units {
            for group in unit.groups() {
                let before = traversal.violations.len();
                traversal.validate_parameter_set(executable, args, None, group)?;
                if unit.fail_fast() && traversal.violations.len() > before {
                    break;
                }
            }
        }
        Ok(traversal.into_violations())
    }

    /// Validate a freshly constructed instance as a constructor return
    /// value.
    pub fn validate_constructor_return_value(
        &self,
        type_name: &str,
        constructor: &str,
        created: &ObjectRef,
        groups: &[Group],
    ) -> ValidationResult<Violations> {
        let units = self.groups.resolve(groups)?;
        let metadata = self.metadata.get(type_name)?;
        let executable =
            find_executable(&metadata, type_name, constructor, ExecutableKind::Constructor)?;

        let value = Value::Object(created.clone());
        let mut traversal = Traversal::new(self, Some(created.clone()));
        for unit in &units {
            for group in unit.groups() {
                let before = traversal.violations.len();
                traversal.validate_return_element(executable, &value, Some(created), group)?;
                if unit.fail_fast() && traversal.violations.len() > before {
                    break;
                }
            }
        }
        Ok(traversal.into_violations())
    }

    /// Walk the instance graph to the object owning the final path
    /// segment, applying the null-link rules along the way.
    fn walk_to_owner(
        &self,
        root: &ObjectRef,
        full: &str,
        segments: &[PathSegment],
    ) -> ValidationResult<(ObjectRef, Arc<BeanMetadata>, Path)> {
        let mut owner = root.clone();
        let mut metadata = self.metadata.get(owner.type_name())?;
        let mut path = Path::root();

        for segment in &segments[..segments.len() - 1] {
            let cascades = metadata
                .element(&segment.name)
                .ok_or_else(|| ConfigurationError::UnknownProperty {
                    type_name: metadata.type_name().to_string(),
                    property: segment.name.clone(),
                })?
                .cascades();
            let raw = owner.get(&segment.name).unwrap_or(Value::Null);
            let value = indexed_value(raw, segment, full)?;
            path = extend_path(&path, segment);

            match value {
                Value::Object(child) => {
                    metadata = self.metadata.get(child.type_name())?;
                    owner = child;
                }
                Value::Null => {
                    // A null cascading link is a data problem mid-call;
                    // a null non-cascading link is a misuse of the API.
                    return Err(if cascades {
                        ProcessingError::MissingCascadeTarget {
                            path: full.to_string(),
                            segment: segment.name.clone(),
                        }
                        .into()
                    } else {
                        ConfigurationError::UnreachablePath {
                            path: full.to_string(),
                            segment: segment.name.clone(),
                        }
                        .into()
                    });
                }
                _ => {
                    return Err(ConfigurationError::InvalidPropertyPath {
                        path: full.to_string(),
                        reason: format!("segment '{}' is not an object", segment.name),
                    }
                    .into())
                }
            }
        }
        Ok((owner, metadata, path))
    }
}

fn parse_segments(property: &str) -> Result<Vec<PathSegment>, ConfigurationError> {
    parse_property_path(property).map_err(|error| ConfigurationError::InvalidPropertyPath {
        path: property.to_string(),
        reason: error.to_string(),
    })
}

fn extend_path(base: &Path, segment: &PathSegment) -> Path {
    match &segment.index {
        None => base.property(&segment.name),
        Some(ElementIndex::Position(index)) => base.indexed(&segment.name, *index),
        Some(ElementIndex::Key(key)) => base.keyed(&segment.name, key),
    }
}

fn indexed_value(
    value: Value,
    segment: &PathSegment,
    full: &str,
) -> Result<Value, ConfigurationError> {
    let Some(index) = &segment.index else {
        return Ok(value);
    };
    match (index, &value) {
        (_, Value::Null) => Ok(Value::Null),
        (ElementIndex::Position(position), Value::List(items)) => {
            Ok(items.get(*position).cloned().unwrap_or(Value::Null))
        }
        (ElementIndex::Key(key), Value::Map(entries)) => {
            Ok(entries.get(key).cloned().unwrap_or(Value::Null))
        }
        _ => Err(ConfigurationError::InvalidPropertyPath {
            path: full.to_string(),
            reason: format!(
                "segment '{}' is not indexable by the given qualifier",
                segment.name
            ),
        }),
    }
}

fn find_executable<'m>(
    metadata: &'m BeanMetadata,
    type_name: &str,
    name: &str,
    kind: ExecutableKind,
) -> Result<&'m ExecutableMetadata, ConfigurationError> {
    metadata
        .executable(name)
        .filter(|executable| executable.kind() == kind)
        .ok_or_else(|| ConfigurationError::UnknownExecutable {
            type_name: type_name.to_string(),
            executable: name.to_string(),
        })
}

fn check_arity(executable: &ExecutableMetadata, args: &[Value]) -> Result<(), ConfigurationError> {
    if executable.parameters().len() != args.len() {
        return Err(ConfigurationError::ArgumentCountMismatch {
            executable: executable.name().to_string(),
            expected: executable.parameters().len(),
            actual: args.len(),
        });
    }
    Ok(())
}
