//! End-to-end form session workflow tests
//!
//! These drive the engine through the full guided workflow against the
//! builtin catalog: section selection, required-field validation, progress,
//! submission storage, editing and deleting prior submissions, and the
//! fixed traversal sequence.

use std::sync::Arc;

use formflow::catalog::{FieldDescriptor, FieldKind, FormCatalog, SectionDefinition};
use formflow::session::{AdvanceTarget, FormOrder, FormSession, SessionError, SessionPhase, SubmitOutcome};

fn builtin_session() -> FormSession {
    let catalog = Arc::new(FormCatalog::builtin());
    let order = FormOrder::of_catalog(&catalog);
    FormSession::new(catalog, order).unwrap()
}

fn fill_user_information(session: &mut FormSession) {
    session.select_section("User Information").unwrap();
    session.edit_field("firstName", "Ann").unwrap();
    session.edit_field("lastName", "Lee").unwrap();
}

#[test]
fn scenario_a_partial_draft_is_rejected_with_labelled_error() {
    let mut session = builtin_session();
    session.select_section("User Information").unwrap();
    session.edit_field("firstName", "Ann").unwrap();

    assert_eq!(session.progress(), 50);
    let outcome = session.submit().unwrap();
    match outcome {
        SubmitOutcome::Rejected { errors } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.get("lastName").unwrap(), "Last Name is required");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(session.submissions().is_empty());
}

#[test]
fn scenario_b_complete_draft_is_accepted_and_stored() {
    let mut session = builtin_session();
    fill_user_information(&mut session);

    assert_eq!(session.progress(), 100);
    let outcome = session.submit().unwrap();
    assert!(matches!(outcome, SubmitOutcome::Accepted { was_edit: false, .. }));

    let record = session.submissions().get("User Information").unwrap();
    assert_eq!(record.values.len(), 2);
    assert_eq!(record.values.get("firstName").unwrap(), "Ann");
    assert_eq!(record.values.get("lastName").unwrap(), "Lee");
}

#[test]
fn scenario_c_sequence_follows_form_order_and_ends_idle() {
    let catalog = FormCatalog::builtin();
    let order = FormOrder::of_catalog(&catalog);

    assert_eq!(
        order.next_after("User Information"),
        Some("Address Information")
    );
    assert_eq!(
        order.next_after("Address Information"),
        Some("Payment Information")
    );
    assert_eq!(order.next_after("Payment Information"), None);

    // submitting the last section in the order schedules a return to idle
    let mut session = builtin_session();
    session.select_section("Payment Information").unwrap();
    session.edit_field("cardNumber", "4111 1111 1111 1111").unwrap();
    session.edit_field("expiryDate", "12/30").unwrap();
    session.edit_field("cvv", "123").unwrap();
    session.edit_field("cardholderName", "Ann Lee").unwrap();

    let outcome = session.submit().unwrap();
    assert!(matches!(
        outcome,
        SubmitOutcome::Accepted { next: None, .. }
    ));
    assert_eq!(session.apply_pending_advance(), Some(AdvanceTarget::Idle));
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(session.active_section(), None);
}

#[test]
fn scenario_d_delete_requires_an_existing_submission() {
    let mut session = builtin_session();
    assert_eq!(
        session.delete_entry("User Information").unwrap_err(),
        SessionError::NoSuchSubmission {
            name: "User Information".to_string()
        }
    );

    fill_user_information(&mut session);
    session.submit().unwrap();
    assert!(session.submissions().contains("User Information"));

    session.delete_entry("User Information").unwrap();
    assert!(!session.submissions().contains("User Information"));
    assert!(session.submissions().is_empty());
}

#[test]
fn scenario_e_whitespace_never_satisfies_required() {
    // a one-section catalog where zipCode is required
    let catalog = Arc::new(FormCatalog::new(vec![SectionDefinition {
        name: "Shipping".to_string(),
        fields: vec![FieldDescriptor {
            name: "zipCode".to_string(),
            kind: FieldKind::Text,
            label: "Zip Code".to_string(),
            required: true,
            placeholder: String::new(),
            options: Vec::new(),
        }],
    }]));
    let order = FormOrder::of_catalog(&catalog);
    let mut session = FormSession::new(catalog, order).unwrap();

    session.select_section("Shipping").unwrap();
    session.edit_field("zipCode", "  ").unwrap();
    assert_eq!(session.progress(), 0);

    let outcome = session.submit().unwrap();
    match outcome {
        SubmitOutcome::Rejected { errors } => {
            assert_eq!(errors.get("zipCode").unwrap(), "Zip Code is required");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn edit_entry_round_trip_preserves_values() {
    let mut session = builtin_session();
    fill_user_information(&mut session);
    session.submit().unwrap();
    let original = session
        .submissions()
        .get("User Information")
        .unwrap()
        .values
        .clone();

    // re-open and submit untouched: stored values come back unchanged
    session.edit_entry("User Information").unwrap();
    let outcome = session.submit().unwrap();
    assert!(matches!(outcome, SubmitOutcome::Accepted { was_edit: true, .. }));

    let resubmitted = &session.submissions().get("User Information").unwrap().values;
    assert_eq!(resubmitted, &original);
}

#[test]
fn resubmitting_a_section_overwrites_the_previous_record() {
    let mut session = builtin_session();
    fill_user_information(&mut session);
    session.submit().unwrap();

    session.select_section("User Information").unwrap();
    session.edit_field("firstName", "Bea").unwrap();
    session.edit_field("lastName", "Kim").unwrap();
    session.edit_field("age", "30").unwrap();
    session.submit().unwrap();

    assert_eq!(session.submissions().len(), 1);
    let record = session.submissions().get("User Information").unwrap();
    assert_eq!(record.values.get("firstName").unwrap(), "Bea");
    assert_eq!(record.values.get("age").unwrap(), "30");
}

#[test]
fn entries_list_keeps_first_submission_order() {
    let mut session = builtin_session();
    session.select_section("Address Information").unwrap();
    session.edit_field("street", "123 Main Street").unwrap();
    session.edit_field("city", "Kolkata").unwrap();
    session.edit_field("state", "West Bengal").unwrap();
    session.submit().unwrap();

    fill_user_information(&mut session);
    session.submit().unwrap();

    let names: Vec<&str> = session.submissions().entries().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Address Information", "User Information"]);
}

#[test]
fn optional_fields_are_stored_but_never_validated() {
    let mut session = builtin_session();
    fill_user_information(&mut session);
    session.edit_field("age", "21").unwrap();
    // optional field does not move required-field progress
    assert_eq!(session.progress(), 100);

    session.submit().unwrap();
    let record = session.submissions().get("User Information").unwrap();
    assert_eq!(record.values.get("age").unwrap(), "21");
}

#[test]
fn order_may_be_a_subset_of_the_catalog() {
    let catalog = Arc::new(FormCatalog::builtin());
    let order = FormOrder::new(vec!["User Information".to_string()]);
    let mut session = FormSession::new(catalog, order).unwrap();

    fill_user_information(&mut session);
    let outcome = session.submit().unwrap();
    // only section in the order: sequence ends immediately
    assert!(matches!(outcome, SubmitOutcome::Accepted { next: None, .. }));

    // sections outside the order can still be filled; they just never chain
    session.select_section("Payment Information").unwrap();
    assert_eq!(session.active_section(), Some("Payment Information"));
}

#[test]
fn session_construction_rejects_order_outside_catalog() {
    let catalog = Arc::new(FormCatalog::builtin());
    let order = FormOrder::new(vec!["Ghost Section".to_string()]);
    assert_eq!(
        FormSession::new(catalog, order).unwrap_err(),
        SessionError::UnknownSection {
            name: "Ghost Section".to_string()
        }
    );
}
