//! Integration test support for the Verity validation engine.
//!
//! Scenario tests live in `tests/`; this crate provides the shared
//! assertion helpers and a prelude so each scenario file starts from
//! the same vocabulary.


pub mod prelude {
    pub use crate::assertion::*;

    pub use verity_core::{
        fields, ConfigurationError, ObjectRef, ProcessingError, ValidationError, Value,
    };
    pub use verity_dispatch::builtin::{constraints, kinds};
    pub use verity_dispatch::{
        ConstraintValidator, SupportedType, ValidatorContext, ValidatorRegistry,
    };
    pub use verity_engine::{DefaultMessageResolver, Validator, Violations};
    pub use verity_groups::{groups, Group, GroupSequence};
    pub use verity_metadata::{
        ConstrainedElement, ConstraintDescriptor, ExecutableMetadata, MapMetadataProvider,
        TypeDeclaration,
    };
    pub use verity_path::Path;

    use std::sync::Arc;

    /// Build a validator over an in-memory provider with the built-in
    /// validators and no named sequences.
    pub fn validator(provider: MapMetadataProvider) -> Validator {
        Validator::builder()
            .provider(Arc::new(provider))
            .build()
            .unwrap()
    }

    /// Build a validator with named group sequences registered.
    pub fn validator_with_sequences(
        provider: MapMetadataProvider,
        sequences: Vec<GroupSequence>,
    ) -> Validator {
        let mut builder = Validator::builder().provider(Arc::new(provider));
        for sequence in sequences {
            builder = builder.sequence(sequence);
        }
        builder.build().unwrap()
    }
}
