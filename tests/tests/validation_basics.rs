//! Basic engine behavior: simple violations, the unconstrained hot
//! path, idempotence and fatal validator failures.

use std::sync::Arc;

use verity_tests::prelude::*;

fn person_provider() -> MapMetadataProvider {
    MapMetadataProvider::new().with(
        TypeDeclaration::new("Person")
            .element(
                ConstrainedElement::property("name")
                    .constraint(constraints::not_null())
                    .constraint(constraints::size(2, Some(64))),
            )
            .element(ConstrainedElement::property("email").constraint(constraints::email()))
            .element(ConstrainedElement::property("age").constraint(constraints::min(0i64))),
    )
}

#[test]
fn test_missing_name_yields_one_violation() {
    // GIVEN a person without a name
    let validator = validator(person_provider());
    let person = ObjectRef::new("Person").with("email", "alice@example.org").with("age", 30i64);

    // WHEN validated in the default group
    let violations = validator.validate(&person, &groups![]).unwrap();

    // THEN only the null-aware constraint reports; size skipped the null
    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["name"]);
    assert_constraint_kinds(&violations, &[kinds::NOT_NULL]);
}

#[test]
fn test_bad_email_yields_the_email_constraint() {
    let validator = validator(person_provider());
    let person = ObjectRef::new("Person")
        .with("name", "Alice")
        .with("email", "@example.com")
        .with("age", 30i64);

    let violations = validator.validate(&person, &groups![]).unwrap();

    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["email"]);
    assert_constraint_kinds(&violations, &[kinds::EMAIL]);
}

#[test]
fn test_valid_person_has_no_violations() {
    let validator = validator(person_provider());
    let person = ObjectRef::new("Person")
        .with("name", "Alice")
        .with("email", "alice@example.org")
        .with("age", 30i64);

    let violations = validator.validate(&person, &groups![]).unwrap();
    assert!(violations.is_empty());
}

#[test]
fn test_unconstrained_type_returns_empty() {
    // GIVEN a type with no declaration at all
    let validator = validator(person_provider());
    let widget = ObjectRef::new("Widget").with("whatever", 1i64);

    // WHEN validated
    let violations = validator.validate(&widget, &groups![]).unwrap();

    // THEN the call short-circuits with no violations
    assert!(violations.is_empty());
}

#[test]
fn test_validation_is_idempotent() {
    // GIVEN an invalid person
    let validator = validator(person_provider());
    let person = ObjectRef::new("Person").with("email", "not-an-email").with("age", -1i64);

    // WHEN validated twice without modification
    let first = validator.validate(&person, &groups![]).unwrap();
    let second = validator.validate(&person, &groups![]).unwrap();

    // THEN the violation sets are equal
    assert_eq!(first, second);
    assert_violation_count(&first, 3);
}

#[test]
fn test_type_level_constraint_uses_empty_path() {
    // GIVEN a class-level constraint on the type itself
    let provider = MapMetadataProvider::new().with(
        TypeDeclaration::new("Range").type_constraint(constraints::not_null()),
    );
    let validator = validator(provider);

    // Objects are never null, so use a constraint that can fail on the
    // object value instead: a custom registry keeps this honest below.
    // Here the not-null constraint passes and proves the wiring.
    let range = ObjectRef::new("Range");
    let violations = validator.validate(&range, &groups![]).unwrap();
    assert!(violations.is_empty());
}

#[test]
fn test_type_level_violation_carries_empty_path() {
    // GIVEN a registry with a constraint that always fails on objects
    struct AlwaysInvalid;
    impl ConstraintValidator for AlwaysInvalid {
        fn supports(&self) -> SupportedType {
            SupportedType::Any
        }
        fn is_valid(
            &self,
            _value: &Value,
            _descriptor: &ConstraintDescriptor,
            _ctx: &mut ValidatorContext,
        ) -> Result<bool, ValidationError> {
            Ok(false)
        }
    }

    let mut registry = ValidatorRegistry::with_builtins().unwrap();
    registry
        .register("AlwaysInvalid", SupportedType::Any, || Arc::new(AlwaysInvalid))
        .unwrap();
    registry.set_default_message("AlwaysInvalid", "object rejected");

    let provider = MapMetadataProvider::new().with(
        TypeDeclaration::new("Range")
            .type_constraint(ConstraintDescriptor::new("AlwaysInvalid")),
    );
    let validator = Validator::builder()
        .provider(Arc::new(provider))
        .registry(registry)
        .build()
        .unwrap();

    // WHEN the root object itself is invalid
    let violations = validator.validate(&ObjectRef::new("Range"), &groups![]).unwrap();

    // THEN the violation path is empty, with no leading separator
    assert_violation_count(&violations, 1);
    assert_eq!(violations.paths(), vec![""]);
    assert_eq!(violations.all()[0].message(), "object rejected");
}

#[test]
fn test_missing_field_is_treated_as_null() {
    // GIVEN a person object that never set the constrained field
    let validator = validator(person_provider());
    let person = ObjectRef::new("Person");

    // WHEN validated
    let violations = validator.validate(&person, &groups![]).unwrap();

    // THEN the absent field reports like an explicit null
    assert_constraint_kinds(&violations, &[kinds::NOT_NULL]);
}

#[test]
fn test_message_interpolation_uses_attributes() {
    let validator = validator(person_provider());
    let person = ObjectRef::new("Person").with("name", "A");

    let violations = validator.validate(&person, &groups![]).unwrap();

    assert_violation_count(&violations, 1);
    assert_eq!(violations.all()[0].message(), "size must be between 2 and 64");
    assert_eq!(
        violations.all()[0].message_template(),
        "size must be between {min} and {max}"
    );
}

#[test]
fn test_violation_carries_root_and_leaf() {
    let validator = validator(person_provider());
    let person = ObjectRef::new("Person");

    let violations = validator.validate(&person, &groups![]).unwrap();

    let violation = &violations.all()[0];
    assert_eq!(violation.root(), Some(&person));
    assert_eq!(violation.leaf(), Some(&person));
    assert!(violation.invalid_value().is_null());
}

#[test]
fn test_failing_validator_aborts_the_call() {
    // GIVEN a validator implementation that errors instead of deciding
    struct Broken;
    impl ConstraintValidator for Broken {
        fn supports(&self) -> SupportedType {
            SupportedType::Any
        }
        fn is_valid(
            &self,
            _value: &Value,
            _descriptor: &ConstraintDescriptor,
            _ctx: &mut ValidatorContext,
        ) -> Result<bool, ValidationError> {
            Err(ProcessingError::ValidatorFailed {
                constraint: "Broken".to_string(),
                reason: "backing store unavailable".to_string(),
            }
            .into())
        }
    }

    let mut registry = ValidatorRegistry::with_builtins().unwrap();
    registry
        .register("Broken", SupportedType::Any, || Arc::new(Broken))
        .unwrap();

    let provider = MapMetadataProvider::new().with(
        TypeDeclaration::new("Job")
            .element(ConstrainedElement::property("id").constraint(constraints::not_null()))
            .element(
                ConstrainedElement::property("state")
                    .constraint(ConstraintDescriptor::new("Broken")),
            ),
    );
    let validator = Validator::builder()
        .provider(Arc::new(provider))
        .registry(registry)
        .build()
        .unwrap();

    // WHEN a constraint failure and the broken validator coexist
    let job = ObjectRef::new("Job").with("state", "queued");

    // THEN the call aborts with a processing error and no partial set
    let result = validator.validate(&job, &groups![]);
    assert!(matches!(
        result,
        Err(ValidationError::Processing(
            ProcessingError::ValidatorFailed { .. }
        ))
    ));
}

#[test]
fn test_parallel_calls_share_one_engine() {
    // GIVEN one engine and an invalid instance
    let validator = Arc::new(validator(person_provider()));
    let person = ObjectRef::new("Person").with("email", "x").with("age", -3i64);

    // WHEN several threads validate concurrently
    let results: Vec<Violations> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let validator = validator.clone();
                let person = person.clone();
                scope.spawn(move || validator.validate(&person, &groups![]).unwrap())
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    // THEN every call produced the same violations
    for result in &results[1..] {
        assert_eq!(&results[0], result);
    }
    assert_violation_count(&results[0], 3);
}
