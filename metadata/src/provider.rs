//! The external metadata provider interface.

use std::collections::BTreeMap;
use std::sync::Arc;

use verity_groups::Group;

use crate::{ConstrainedElement, ConstraintDescriptor, ExecutableMetadata};

/// Raw constraint declarations for one type, as discovered by an
/// external source (attribute scanning, configuration files, code).
///
/// Declarations are unflattened: parents are named, not merged. The
/// metadata builder resolves and merges the hierarchy.
#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    name: String,
    parents: Vec<String>,
    default_sequence: Option<Vec<Group>>,
    type_constraints: Vec<Arc<ConstraintDescriptor>>,
    elements: Vec<ConstrainedElement>,
    executables: Vec<ExecutableMetadata>,
}

impl TypeDeclaration {
    /// Start a declaration for a type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            default_sequence: None,
            type_constraints: Vec::new(),
            elements: Vec::new(),
            executables: Vec::new(),
        }
    }

    /// Name a parent type whose declarations this type inherits.
    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.parents.push(name.into());
        self
    }

    /// Redefine the type's default group sequence. The sequence must
    /// mention the type itself exactly once and must not mention the
    /// implicit default group.
    pub fn default_sequence<G: Into<Group>>(
        mut self,
        groups: impl IntoIterator<Item = G>,
    ) -> Self {
        self.default_sequence = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    /// Attach a class-level constraint.
    pub fn type_constraint(mut self, descriptor: ConstraintDescriptor) -> Self {
        self.type_constraints.push(Arc::new(descriptor));
        self
    }

    /// Declare a constrained property element.
    pub fn element(mut self, element: ConstrainedElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Declare a constrained executable.
    pub fn executable(mut self, executable: ExecutableMetadata) -> Self {
        self.executables.push(executable);
        self
    }

    /// The declared type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn parents(&self) -> &[String] {
        &self.parents
    }

    pub(crate) fn declared_default_sequence(&self) -> Option<&[Group]> {
        self.default_sequence.as_deref()
    }

    pub(crate) fn type_constraints(&self) -> &[Arc<ConstraintDescriptor>] {
        &self.type_constraints
    }

    pub(crate) fn elements(&self) -> &[ConstrainedElement] {
        &self.elements
    }

    pub(crate) fn executables(&self) -> &[ExecutableMetadata] {
        &self.executables
    }
}

/// Supplies raw type declarations on demand.
///
/// Implementations must be deterministic (same type name, same
/// declaration) and side-effect-free; the engine builds metadata from
/// them at most once per type.
pub trait MetadataProvider: Send + Sync {
    /// The declaration for a type, or `None` for unconstrained types.
    fn declaration(&self, type_name: &str) -> Option<TypeDeclaration>;
}

/// In-memory metadata provider backed by a map of declarations.
#[derive(Debug, Default)]
pub struct MapMetadataProvider {
    types: BTreeMap<String, TypeDeclaration>,
}

impl MapMetadataProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a declaration, replacing any previous one for the type.
    pub fn insert(&mut self, declaration: TypeDeclaration) {
        self.types
            .insert(declaration.name().to_string(), declaration);
    }

    /// Insert a declaration, returning the provider for chaining.
    pub fn with(mut self, declaration: TypeDeclaration) -> Self {
        self.insert(declaration);
        self
    }
}

impl MetadataProvider for MapMetadataProvider {
    fn declaration(&self, type_name: &str) -> Option<TypeDeclaration> {
        self.types.get(type_name).cloned()
    }
}
