//! Group selection, named sequences and redefined default sequences.

use verity_tests::prelude::*;

/// A payment with one constraint per group: Basic checks the card,
/// Extended checks the amount.
fn payment_provider() -> MapMetadataProvider {
    MapMetadataProvider::new().with(
        TypeDeclaration::new("Payment")
            .element(
                ConstrainedElement::property("card")
                    .constraint(constraints::not_null().in_group("Basic")),
            )
            .element(
                ConstrainedElement::property("amount")
                    .constraint(constraints::min(1i64).in_group("Extended")),
            ),
    )
}

fn invalid_payment() -> ObjectRef {
    // Fails both Basic (null card) and Extended (amount below one).
    ObjectRef::new("Payment").with("amount", 0i64)
}

#[test]
fn test_constraints_run_only_in_their_groups() {
    let validator = validator(payment_provider());
    let payment = invalid_payment();

    // Default requests nothing that is declared here.
    let violations = validator.validate(&payment, &groups![]).unwrap();
    assert!(violations.is_empty());

    // Each named group sees only its own constraint.
    let violations = validator.validate(&payment, &groups!["Basic"]).unwrap();
    assert_constraint_kinds(&violations, &[kinds::NOT_NULL]);

    let violations = validator.validate(&payment, &groups!["Extended"]).unwrap();
    assert_constraint_kinds(&violations, &[kinds::MIN]);
}

#[test]
fn test_sequence_fails_fast_across_groups() {
    // GIVEN the sequence [Basic, Extended]
    let validator = validator_with_sequences(
        payment_provider(),
        vec![GroupSequence::new("Checkout", ["Basic", "Extended"])],
    );
    let payment = invalid_payment();

    // WHEN the first group fails
    let violations = validator.validate(&payment, &groups!["Checkout"]).unwrap();

    // THEN the second group never runs
    assert_violation_count(&violations, 1);
    assert_constraint_kinds(&violations, &[kinds::NOT_NULL]);
    assert_no_kind(&violations, kinds::MIN);
}

#[test]
fn test_sequence_proceeds_when_earlier_groups_pass() {
    let validator = validator_with_sequences(
        payment_provider(),
        vec![GroupSequence::new("Checkout", ["Basic", "Extended"])],
    );
    let payment = ObjectRef::new("Payment").with("card", "4111").with("amount", 0i64);

    let violations = validator.validate(&payment, &groups!["Checkout"]).unwrap();

    assert_constraint_kinds(&violations, &[kinds::MIN]);
}

#[test]
fn test_groups_outside_a_sequence_still_run() {
    // GIVEN a failed sequence and a standalone group in one request
    let validator = validator_with_sequences(
        payment_provider(),
        vec![GroupSequence::new("Checkout", ["Basic", "Extended"])],
    );
    let payment = invalid_payment();

    // WHEN requesting the sequence plus the standalone Extended group
    let violations = validator
        .validate(&payment, &[Group::new("Checkout"), Group::new("Extended")])
        .unwrap();

    // THEN the sequence aborted after Basic, but the standalone unit
    // still validated Extended
    assert_constraint_kinds(&violations, &[kinds::NOT_NULL, kinds::MIN]);
}

#[test]
fn test_nested_sequences_expand_transitively() {
    let validator = validator_with_sequences(
        payment_provider(),
        vec![
            GroupSequence::new("Inner", ["Basic"]),
            GroupSequence::new("Outer", ["Inner", "Extended"]),
        ],
    );
    let payment = ObjectRef::new("Payment").with("card", "4111").with("amount", 0i64);

    let violations = validator.validate(&payment, &groups!["Outer"]).unwrap();

    assert_constraint_kinds(&violations, &[kinds::MIN]);
}

#[test]
fn test_sequence_cycle_is_a_configuration_error() {
    let validator = validator_with_sequences(
        payment_provider(),
        vec![
            GroupSequence::new("A", ["B"]),
            GroupSequence::new("B", ["A"]),
        ],
    );

    let result = validator.validate(&invalid_payment(), &groups!["A"]);
    assert!(matches!(
        result,
        Err(ValidationError::Configuration(
            ConfigurationError::GroupSequenceCycle(_)
        ))
    ));
}

#[test]
fn test_empty_group_request_is_a_configuration_error() {
    let validator = validator(payment_provider());
    let result = validator.validate(&invalid_payment(), &[]);
    assert!(matches!(
        result,
        Err(ValidationError::Configuration(
            ConfigurationError::EmptyGroupRequest
        ))
    ));
}

/// An account that redefines its default sequence: Strict runs before
/// the account's own default-group constraints.
fn account_provider() -> MapMetadataProvider {
    MapMetadataProvider::new().with(
        TypeDeclaration::new("Account")
            .default_sequence(["Strict", "Account"])
            .element(
                ConstrainedElement::property("code")
                    .constraint(constraints::pattern("^[A-Z]+$").in_group("Strict")),
            )
            .element(ConstrainedElement::property("id").constraint(constraints::not_null())),
    )
}

#[test]
fn test_redefined_default_sequence_fails_fast() {
    // GIVEN an account failing both Strict and its own defaults
    let validator = validator(account_provider());
    let account = ObjectRef::new("Account").with("code", "abc");

    // WHEN validating the default group
    let violations = validator.validate(&account, &groups![]).unwrap();

    // THEN only the Strict violation appears
    assert_violation_count(&violations, 1);
    assert_constraint_kinds(&violations, &[kinds::PATTERN]);
}

#[test]
fn test_redefined_default_sequence_reaches_own_constraints() {
    let validator = validator(account_provider());
    let account = ObjectRef::new("Account").with("code", "ABC");

    let violations = validator.validate(&account, &groups![]).unwrap();

    assert_violation_count(&violations, 1);
    assert_constraint_kinds(&violations, &[kinds::NOT_NULL]);
    assert_paths(&violations, &["id"]);
}

#[test]
fn test_redefined_default_sequence_applies_to_cascaded_beans() {
    // GIVEN a holder cascading into an account with a redefined
    // default sequence
    let provider = account_provider().with(
        TypeDeclaration::new("Holder")
            .element(ConstrainedElement::property("account").cascade()),
    );
    let validator = validator(provider);

    let holder = ObjectRef::new("Holder")
        .with("account", ObjectRef::new("Account").with("code", "abc"));

    // WHEN validating the holder in the default group
    let violations = validator.validate(&holder, &groups![]).unwrap();

    // THEN the cascaded account honored its own sequence
    assert_violation_count(&violations, 1);
    assert_paths(&violations, &["account.code"]);
    assert_constraint_kinds(&violations, &[kinds::PATTERN]);
}

#[test]
fn test_requested_named_group_ignores_redefined_default() {
    // Strict requested directly runs without the sequence machinery.
    let validator = validator(account_provider());
    let account = ObjectRef::new("Account").with("code", "abc");

    let violations = validator.validate(&account, &groups!["Strict"]).unwrap();

    assert_violation_count(&violations, 1);
    assert_constraint_kinds(&violations, &[kinds::PATTERN]);
}
