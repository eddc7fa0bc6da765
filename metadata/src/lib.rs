//! Verity Metadata
//!
//! The immutable constraint-metadata model: which constraints apply to
//! which properties, parameters and return values of a type.
//!
//! Responsibilities:
//! - Describe declared constraints (`ConstraintDescriptor`) and the
//!   elements they attach to (`ConstrainedElement`)
//! - Flatten type hierarchies into one merged `BeanMetadata` per type,
//!   validated eagerly at build time
//! - Consume declarations from an external `MetadataProvider`
//! - Cache built metadata process-wide with a build-once guarantee

mod bean;
mod builder;
mod cache;
mod descriptor;
mod element;
mod provider;

pub use bean::{BeanMetadata, ExecutableKind, ExecutableMetadata};
pub use builder::MetadataBuilder;
pub use cache::MetadataCache;
pub use descriptor::{ConstraintDescriptor, ConstraintTarget};
pub use element::{ConstrainedElement, ElementKind};
pub use provider::{MapMetadataProvider, MetadataProvider, TypeDeclaration};
