use super::common::*;
use std::sync::Arc;

use crate::workflows::registration::domain::{
    AttachmentKind, CommitteePreferences, EssayResponses, RegistrationFormState, StepData,
    WizardStep,
};
use crate::workflows::registration::service::SubmissionOutcome;
use crate::workflows::registration::validation::FieldValidator;
use crate::workflows::registration::wizard::{
    reduce, TransitionOutcome, WizardAction, WizardController, WizardEffect, WizardState,
};

fn at(step: WizardStep, form: RegistrationFormState) -> WizardState {
    WizardState {
        step,
        form,
        accepted: None,
    }
}

fn controller_at(
    step: WizardStep,
    store: MemoryBlobStore,
) -> (
    WizardController<MemoryBlobStore, MemoryRepository, RecordingNotifier>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let coordinator = coordinator(
        Arc::new(store),
        repository.clone(),
        Arc::new(RecordingNotifier::default()),
        sequential_ids(),
    );
    let controller = WizardController::with_state(coordinator, at(step, valid_form()));
    (controller, repository)
}

#[test]
fn advance_moves_only_when_current_step_is_valid() {
    let gated = [
        WizardStep::Identity,
        WizardStep::Experience,
        WizardStep::Committees,
        WizardStep::Essays,
    ];

    for step in gated {
        let empty = RegistrationFormState::default();
        assert!(!FieldValidator::is_step_valid(step, &empty));
        let blocked = reduce(at(step, empty), WizardAction::Advance);
        assert_eq!(blocked.state.step, step, "{step} advanced while invalid");
        assert!(matches!(blocked.outcome, TransitionOutcome::Blocked(ref issues) if !issues.is_empty()));
        assert!(blocked.effects.is_empty());

        let form = valid_form();
        assert!(FieldValidator::is_step_valid(step, &form));
        let moved = reduce(at(step, form), WizardAction::Advance);
        assert_eq!(moved.state.step.number(), step.number() + 1);
        assert_eq!(moved.effects, vec![WizardEffect::ScrollFormIntoView]);
    }
}

#[test]
fn advance_never_reaches_confirmation() {
    let transition = reduce(at(WizardStep::Payment, valid_form()), WizardAction::Advance);
    assert_eq!(transition.state.step, WizardStep::Payment);
    assert_eq!(transition.outcome, TransitionOutcome::Unchanged);
}

#[test]
fn repeated_committee_keeps_step_three_invalid() {
    let mut form = valid_form();
    form.committees = CommitteePreferences {
        first: "UNSC".to_string(),
        second: "UNSC".to_string(),
        third: "WHO".to_string(),
    };

    let issues = FieldValidator::check_step(WizardStep::Committees, &form);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, "second");

    let transition = reduce(at(WizardStep::Committees, form), WizardAction::Advance);
    assert_eq!(transition.state.step, WizardStep::Committees);
}

#[test]
fn committee_repeats_ignore_surrounding_whitespace() {
    let mut form = valid_form();
    form.committees.third = " UNSC ".to_string();
    assert!(!FieldValidator::is_step_valid(WizardStep::Committees, &form));
}

#[test]
fn whitespace_only_answers_count_as_missing() {
    let mut form = valid_form();
    form.identity.full_name = "   ".to_string();
    form.essays.contribution = "\n\t".to_string();

    assert!(!FieldValidator::is_step_valid(WizardStep::Identity, &form));
    assert!(!FieldValidator::is_step_valid(WizardStep::Essays, &form));
}

#[test]
fn phone_is_optional() {
    let mut form = valid_form();
    form.identity.phone.clear();
    assert!(FieldValidator::is_step_valid(WizardStep::Identity, &form));
}

#[test]
fn long_essays_do_not_block_advancing() {
    let mut form = valid_form();
    form.essays = EssayResponses {
        motivation: "diplomacy ".repeat(400),
        contribution: "research ".repeat(400),
    };

    let transition = reduce(at(WizardStep::Essays, form), WizardAction::Advance);
    assert_eq!(transition.state.step, WizardStep::Payment);
}

#[test]
fn retreat_skips_validation() {
    let transition = reduce(
        at(WizardStep::Essays, RegistrationFormState::default()),
        WizardAction::Retreat,
    );
    assert_eq!(transition.state.step, WizardStep::Committees);
    assert_eq!(transition.effects, vec![WizardEffect::ScrollFormIntoView]);
}

#[test]
fn boundaries_leave_step_unchanged() {
    let first = reduce(at(WizardStep::Identity, valid_form()), WizardAction::Retreat);
    assert_eq!(first.state.step, WizardStep::Identity);
    assert_eq!(first.outcome, TransitionOutcome::Unchanged);

    for action in [WizardAction::Advance, WizardAction::Retreat] {
        let last = reduce(at(WizardStep::Confirmation, valid_form()), action);
        assert_eq!(last.state.step, WizardStep::Confirmation);
        assert!(last.effects.is_empty());
    }
}

#[test]
fn edits_replace_only_their_section() {
    let essays = EssayResponses {
        motivation: "new".to_string(),
        contribution: "answers".to_string(),
    };
    let transition = reduce(
        at(WizardStep::Essays, valid_form()),
        WizardAction::Edit(StepData::Essays(essays.clone())),
    );

    assert_eq!(transition.outcome, TransitionOutcome::Edited(WizardStep::Essays));
    assert_eq!(transition.state.form.essays, essays);
    assert_eq!(transition.state.form.identity, valid_form().identity);
}

#[test]
fn controller_queues_scroll_effects_until_drained() {
    let (mut controller, _) = controller_at(WizardStep::Identity, MemoryBlobStore::default());

    assert!(controller.advance());
    assert!(controller.retreat());
    assert!(!controller.retreat());
    assert_eq!(
        controller.drain_effects(),
        vec![
            WizardEffect::ScrollFormIntoView,
            WizardEffect::ScrollFormIntoView
        ]
    );
    assert!(controller.drain_effects().is_empty());
}

#[tokio::test]
async fn submit_from_payment_reaches_confirmation_and_clears_form() {
    let (mut controller, repository) =
        controller_at(WizardStep::Payment, MemoryBlobStore::default());

    let outcome = controller.submit().await;

    assert!(outcome.is_success());
    assert_eq!(controller.step(), WizardStep::Confirmation);
    assert_eq!(controller.form(), &RegistrationFormState::default());
    let stored = repository.records();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        controller.state().accepted.as_ref(),
        Some(&stored[0].record.application_id)
    );
    assert_eq!(
        controller.drain_effects(),
        vec![WizardEffect::ScrollFormIntoView]
    );
}

#[tokio::test]
async fn failed_submit_stays_on_payment_with_form_intact() {
    let (mut controller, repository) = controller_at(
        WizardStep::Payment,
        MemoryBlobStore::failing_on(AttachmentKind::Photo),
    );
    controller.edit(StepData::Identity({
        let mut identity = valid_form().identity;
        identity.photo = Some(photo());
        identity
    }));

    let outcome = controller.submit().await;

    assert!(!outcome.is_success());
    assert_eq!(controller.step(), WizardStep::Payment);
    assert!(controller.form().identity.photo.is_some());
    assert!(repository.records().is_empty());
}

#[tokio::test]
async fn submit_outside_payment_step_is_ignored() {
    let (mut controller, repository) =
        controller_at(WizardStep::Essays, MemoryBlobStore::default());

    let outcome = controller.submit().await;

    assert!(matches!(outcome, SubmissionOutcome::Ignored));
    assert_eq!(controller.step(), WizardStep::Essays);
    assert!(repository.records().is_empty());
}
