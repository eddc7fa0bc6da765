//! Executable validation: method parameters, cross-parameter
//! constraints, return values and constructors.

use verity_tests::prelude::*;

/// An account service with a `transfer` method: both parameters are
/// individually constrained and a cross-parameter size check watches
/// the argument list as a whole.
fn service_provider() -> MapMetadataProvider {
    MapMetadataProvider::new()
        .with(
            TypeDeclaration::new("AccountService").executable(
                ExecutableMetadata::method("transfer")
                    .parameter(
                        ConstrainedElement::named_parameter(0, "target")
                            .constraint(constraints::not_null()),
                    )
                    .parameter(
                        ConstrainedElement::named_parameter(1, "amount")
                            .constraint(constraints::min(1i64)),
                    )
                    .cross_constraint(constraints::size(3, None).message("missing arguments"))
                    .returns(
                        ConstrainedElement::return_value().constraint(constraints::not_null()),
                    ),
            ),
        )
        .with(
            TypeDeclaration::new("Registration").executable(
                ExecutableMetadata::method("register")
                    .parameter(ConstrainedElement::parameter(0).cascade()),
            ),
        )
        .with(
            TypeDeclaration::new("Customer")
                .element(ConstrainedElement::property("name").constraint(constraints::not_null())),
        )
        .with(
            TypeDeclaration::new("Account").executable(
                ExecutableMetadata::constructor("Account")
                    .parameter(
                        ConstrainedElement::named_parameter(0, "owner")
                            .constraint(constraints::not_blank()),
                    )
                    .returns(ConstrainedElement::return_value().cascade()),
            ),
        )
        .with(
            TypeDeclaration::new("AccountState")
                .element(ConstrainedElement::property("id").constraint(constraints::not_null())),
        )
}

#[test]
fn test_parameter_violations_use_parameter_paths() {
    // GIVEN a transfer invocation with two invalid arguments
    let validator = validator(service_provider());
    let service = ObjectRef::new("AccountService");

    // WHEN validating the parameter list
    let violations = validator
        .validate_parameters(
            &service,
            "transfer",
            &[Value::Null, Value::Int(0)],
            &groups![],
        )
        .unwrap();

    // THEN each parameter reports under its declared name, and the
    // cross-parameter check comes after the single-parameter ones
    assert_violation_count(&violations, 3);
    assert_eq!(
        violations.paths(),
        vec![
            "transfer.target",
            "transfer.amount",
            "transfer.<cross-parameter>"
        ]
    );
}

#[test]
fn test_cross_parameter_constraint_sees_the_argument_list() {
    let validator = validator(service_provider());
    let service = ObjectRef::new("AccountService");

    // Two valid arguments still fail the cross-parameter arity rule
    // (it wants at least three).
    let violations = validator
        .validate_parameters(
            &service,
            "transfer",
            &[Value::from("savings"), Value::Int(10)],
            &groups![],
        )
        .unwrap();

    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["transfer.<cross-parameter>"]);
    assert_eq!(violations.all()[0].message(), "missing arguments");
    assert!(matches!(
        violations.all()[0].invalid_value(),
        Value::List(_)
    ));
}

#[test]
fn test_unnamed_parameters_render_positionally() {
    let validator = validator(service_provider());
    let registration = ObjectRef::new("Registration");

    let customer = ObjectRef::new("Customer");
    let violations = validator
        .validate_parameters(
            &registration,
            "register",
            &[Value::from(customer)],
            &groups![],
        )
        .unwrap();

    // The cascaded argument object reports through the positional node.
    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["register.arg0.name"]);
}

#[test]
fn test_return_value_validation() {
    let validator = validator(service_provider());
    let service = ObjectRef::new("AccountService");

    let violations = validator
        .validate_return_value(&service, "transfer", &Value::Null, &groups![])
        .unwrap();

    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["transfer.<return value>"]);
    assert_constraint_kinds(&violations, &[kinds::NOT_NULL]);
}

#[test]
fn test_constructor_parameter_validation() {
    let validator = validator(service_provider());

    let violations = validator
        .validate_constructor_parameters(
            "Account",
            "Account",
            &[Value::from("  ")],
            &groups![],
        )
        .unwrap();

    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["Account.owner"]);
    assert_constraint_kinds(&violations, &[kinds::NOT_BLANK]);
}

#[test]
fn test_constructor_return_value_cascades_into_the_instance() {
    // GIVEN a freshly constructed, invalid account state
    let validator = validator(service_provider());
    let created = ObjectRef::new("AccountState");

    // WHEN validating it as the constructor's return value
    let violations = validator
        .validate_constructor_return_value("Account", "Account", &created, &groups![])
        .unwrap();

    // THEN the cascade reports through the return-value node
    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["Account.<return value>.id"]);
}

#[test]
fn test_argument_count_mismatch_is_a_configuration_error() {
    let validator = validator(service_provider());
    let service = ObjectRef::new("AccountService");

    let result = validator.validate_parameters(&service, "transfer", &[Value::Null], &groups![]);
    assert!(matches!(
        result,
        Err(ValidationError::Configuration(
            ConfigurationError::ArgumentCountMismatch { .. }
        ))
    ));
}

#[test]
fn test_unknown_executable_is_a_configuration_error() {
    let validator = validator(service_provider());
    let service = ObjectRef::new("AccountService");

    let result = validator.validate_parameters(&service, "close", &[], &groups![]);
    assert!(matches!(
        result,
        Err(ValidationError::Configuration(
            ConfigurationError::UnknownExecutable { .. }
        ))
    ));

    // A constructor name does not resolve as a method either.
    let result = validator.validate_parameters(
        &ObjectRef::new("Account"),
        "Account",
        &[Value::from("x")],
        &groups![],
    );
    assert!(matches!(
        result,
        Err(ValidationError::Configuration(
            ConfigurationError::UnknownExecutable { .. }
        ))
    ));
}

#[test]
fn test_parameter_constraints_respect_groups() {
    // GIVEN a method whose parameter constraint lives in a named group
    let provider = MapMetadataProvider::new().with(
        TypeDeclaration::new("Admin").executable(
            ExecutableMetadata::method("purge").parameter(
                ConstrainedElement::named_parameter(0, "confirmation")
                    .constraint(constraints::assert_true().in_group("Dangerous")),
            ),
        ),
    );
    let validator = validator(provider);
    let admin = ObjectRef::new("Admin");

    // Default group: silent.
    let violations = validator
        .validate_parameters(&admin, "purge", &[Value::Bool(false)], &groups![])
        .unwrap();
    assert!(violations.is_empty());

    // The declared group reports.
    let violations = validator
        .validate_parameters(&admin, "purge", &[Value::Bool(false)], &groups!["Dangerous"])
        .unwrap();
    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["purge.confirmation"]);
}
