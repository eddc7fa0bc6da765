//! `validate_property` and `validate_value`: dotted paths, null-link
//! rules and metadata-only traversal.

use verity_tests::prelude::*;

fn provider() -> MapMetadataProvider {
    MapMetadataProvider::new()
        .with(
            TypeDeclaration::new("Person")
                .element(ConstrainedElement::property("name").constraint(constraints::not_null()))
                .element(
                    ConstrainedElement::property("address")
                        .of_type("Address")
                        .cascade(),
                )
                .element(
                    ConstrainedElement::property("mentor")
                        .of_type("Person"),
                )
                .element(
                    ConstrainedElement::property("nicknames")
                        .element_constraint(constraints::not_blank()),
                ),
        )
        .with(
            TypeDeclaration::new("Address")
                .element(ConstrainedElement::property("city").constraint(constraints::not_null()))
                .element(
                    ConstrainedElement::property("zip")
                        .constraint(constraints::pattern("^[0-9]{5}$")),
                ),
        )
}

#[test]
fn test_validate_property_checks_only_the_named_property() {
    // GIVEN a person with two invalid properties
    let validator = validator(provider());
    let person = ObjectRef::new("Person");

    // WHEN validating just "name"
    let violations = validator
        .validate_property(&person, "name", &groups![])
        .unwrap();

    // THEN only the named property reports
    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["name"]);
}

#[test]
fn test_validate_property_walks_nested_paths() {
    let validator = validator(provider());
    let person = ObjectRef::new("Person")
        .with("name", "Alice")
        .with("address", ObjectRef::new("Address").with("zip", "abc"));

    let violations = validator
        .validate_property(&person, "address.zip", &groups![])
        .unwrap();

    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["address.zip"]);
    assert_constraint_kinds(&violations, &[kinds::PATTERN]);
}

#[test]
fn test_validate_property_with_indexed_final_segment() {
    // GIVEN a blank nickname at position 1
    let validator = validator(provider());
    let person = ObjectRef::new("Person").with("name", "Alice").with(
        "nicknames",
        vec![Value::from("Ace"), Value::from("  ")],
    );

    // WHEN validating the element
    let violations = validator
        .validate_property(&person, "nicknames[1]", &groups![])
        .unwrap();

    // THEN the violation renders the indexed path
    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["nicknames[1]"]);
}

#[test]
fn test_unknown_property_is_a_configuration_error() {
    let validator = validator(provider());
    let person = ObjectRef::new("Person");

    let result = validator.validate_property(&person, "shoe_size", &groups![]);
    assert!(matches!(
        result,
        Err(ValidationError::Configuration(
            ConfigurationError::UnknownProperty { .. }
        ))
    ));
}

#[test]
fn test_null_cascading_link_is_a_processing_error() {
    // GIVEN a path crossing a null link that was declared cascading
    let validator = validator(provider());
    let person = ObjectRef::new("Person").with("name", "Alice");

    let result = validator.validate_property(&person, "address.city", &groups![]);
    assert!(matches!(
        result,
        Err(ValidationError::Processing(
            ProcessingError::MissingCascadeTarget { .. }
        ))
    ));
}

#[test]
fn test_null_non_cascading_link_is_a_configuration_error() {
    // GIVEN a path crossing a null link that never cascades
    let validator = validator(provider());
    let person = ObjectRef::new("Person").with("name", "Alice");

    let result = validator.validate_property(&person, "mentor.name", &groups![]);
    assert!(matches!(
        result,
        Err(ValidationError::Configuration(
            ConfigurationError::UnreachablePath { .. }
        ))
    ));
}

#[test]
fn test_validate_value_without_an_instance() {
    // GIVEN a candidate value for Person.name
    let validator = validator(provider());

    // WHEN validating a null candidate
    let violations = validator
        .validate_value("Person", "name", &Value::Null, &groups![])
        .unwrap();

    // THEN the violation reports without any root object
    assert_violation_count(&violations, 1);
    assert!(violations.all()[0].root().is_none());
    assert_paths(&violations, &["name"]);
}

#[test]
fn test_validate_value_traverses_declared_types() {
    // GIVEN a nested path resolved through declared element types
    let validator = validator(provider());

    let violations = validator
        .validate_value("Person", "address.zip", &Value::from("abc"), &groups![])
        .unwrap();

    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["address.zip"]);

    let violations = validator
        .validate_value("Person", "address.zip", &Value::from("12345"), &groups![])
        .unwrap();
    assert!(violations.is_empty());
}

#[test]
fn test_validate_value_needs_declared_types_for_nesting() {
    // GIVEN a nested path through an element without a declared type
    let provider = MapMetadataProvider::new()
        .with(
            TypeDeclaration::new("Holder")
                .element(ConstrainedElement::property("child").cascade()),
        );
    let validator = validator(provider);

    let result = validator.validate_value("Holder", "child.x", &Value::Null, &groups![]);
    assert!(matches!(
        result,
        Err(ValidationError::Configuration(
            ConfigurationError::InvalidPropertyPath { .. }
        ))
    ));
}

#[test]
fn test_property_validation_honors_redefined_default_sequence() {
    // GIVEN an account type with a redefined default sequence reached
    // through a property walk
    let provider = MapMetadataProvider::new()
        .with(
            TypeDeclaration::new("Holder").element(
                ConstrainedElement::property("account")
                    .of_type("Account")
                    .cascade(),
            ),
        )
        .with(
            TypeDeclaration::new("Account")
                .default_sequence(["Strict", "Account"])
                .element(
                    ConstrainedElement::property("code")
                        .constraint(constraints::pattern("^[A-Z]+$").in_group("Strict"))
                        .constraint(constraints::size(3, Some(8))),
                ),
        );
    let validator = validator(provider);

    let holder = ObjectRef::new("Holder")
        .with("account", ObjectRef::new("Account").with("code", "x"));

    // WHEN validating the nested property in the default group
    let violations = validator
        .validate_property(&holder, "account.code", &groups![])
        .unwrap();

    // THEN the Strict group ran first and its failure suppressed the
    // account's own default-group constraint
    assert_violation_count(&violations, 1);
    assert_constraint_kinds(&violations, &[kinds::PATTERN]);
    assert_paths(&violations, &["account.code"]);
}

#[test]
fn test_value_validation_honors_redefined_default_sequence() {
    let provider = MapMetadataProvider::new().with(
        TypeDeclaration::new("Account")
            .default_sequence(["Strict", "Account"])
            .element(
                ConstrainedElement::property("code")
                    .constraint(constraints::pattern("^[A-Z]+$").in_group("Strict"))
                    .constraint(constraints::size(3, Some(8))),
            ),
    );
    let validator = validator(provider);

    let violations = validator
        .validate_value("Account", "code", &Value::from("x"), &groups![])
        .unwrap();

    assert_violation_count(&violations, 1);
    assert_constraint_kinds(&violations, &[kinds::PATTERN]);
}

#[test]
fn test_malformed_path_is_a_configuration_error() {
    let validator = validator(provider());
    let person = ObjectRef::new("Person");

    for path in ["", "a..b", "items[", "items[]"] {
        let result = validator.validate_property(&person, path, &groups![]);
        assert!(
            matches!(
                result,
                Err(ValidationError::Configuration(
                    ConfigurationError::InvalidPropertyPath { .. }
                ))
            ),
            "path {:?} should be rejected",
            path
        );
    }
}
