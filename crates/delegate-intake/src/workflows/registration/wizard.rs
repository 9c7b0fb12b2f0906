use std::collections::VecDeque;

use tracing::debug;

use super::domain::{ApplicationId, RegistrationFormState, StepData, WizardStep};
use super::repository::{ApplicationRepository, Notifier};
use super::service::{SubmissionCoordinator, SubmissionOutcome};
use super::storage::BlobStore;
use super::validation::{FieldValidator, ValidationIssue};

/// Current screen plus everything collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    pub step: WizardStep,
    pub form: RegistrationFormState,
    /// Set once the confirmation screen is reached.
    pub accepted: Option<ApplicationId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    Edit(StepData),
    Advance,
    Retreat,
    SubmissionAccepted(ApplicationId),
}

/// Side effects the UI layer performs after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEffect {
    ScrollFormIntoView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Moved { from: WizardStep, to: WizardStep },
    Edited(WizardStep),
    Blocked(Vec<ValidationIssue>),
    Completed(ApplicationId),
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: WizardState,
    pub outcome: TransitionOutcome,
    pub effects: Vec<WizardEffect>,
}

impl Transition {
    fn unchanged(state: WizardState) -> Self {
        Self {
            state,
            outcome: TransitionOutcome::Unchanged,
            effects: Vec::new(),
        }
    }

    fn moved(mut state: WizardState, to: WizardStep) -> Self {
        let from = state.step;
        state.step = to;
        Self {
            state,
            outcome: TransitionOutcome::Moved { from, to },
            effects: vec![WizardEffect::ScrollFormIntoView],
        }
    }
}

/// Pure wizard transition function.
///
/// `Advance` is gated on the current step's checks and never reaches the
/// confirmation screen; only `SubmissionAccepted` on the payment step does.
/// `Retreat` never validates. Neither moves off the confirmation screen.
pub fn reduce(mut state: WizardState, action: WizardAction) -> Transition {
    match action {
        WizardAction::Edit(data) => {
            if state.step == WizardStep::Confirmation {
                return Transition::unchanged(state);
            }
            let step = data.step();
            state.form.apply(data);
            Transition {
                state,
                outcome: TransitionOutcome::Edited(step),
                effects: Vec::new(),
            }
        }
        WizardAction::Advance => {
            let Some(next) = state.step.next_input() else {
                return Transition::unchanged(state);
            };
            let issues = FieldValidator::check_step(state.step, &state.form);
            if issues.is_empty() {
                Transition::moved(state, next)
            } else {
                Transition {
                    state,
                    outcome: TransitionOutcome::Blocked(issues),
                    effects: Vec::new(),
                }
            }
        }
        WizardAction::Retreat => match state.step.previous() {
            Some(previous) => Transition::moved(state, previous),
            None => Transition::unchanged(state),
        },
        WizardAction::SubmissionAccepted(application_id) => {
            if state.step != WizardStep::Payment {
                return Transition::unchanged(state);
            }
            let state = WizardState {
                step: WizardStep::Confirmation,
                form: RegistrationFormState::default(),
                accepted: Some(application_id.clone()),
            };
            Transition {
                state,
                outcome: TransitionOutcome::Completed(application_id),
                effects: vec![WizardEffect::ScrollFormIntoView],
            }
        }
    }
}

/// Owns one registration session: wizard state, pending UI effects and the
/// session's submission coordinator.
pub struct WizardController<B: ?Sized, R: ?Sized, N: ?Sized> {
    state: WizardState,
    effects: VecDeque<WizardEffect>,
    coordinator: SubmissionCoordinator<B, R, N>,
}

impl<B, R, N> WizardController<B, R, N>
where
    B: BlobStore + ?Sized + 'static,
    R: ApplicationRepository + ?Sized + 'static,
    N: Notifier + ?Sized + 'static,
{
    pub fn new(coordinator: SubmissionCoordinator<B, R, N>) -> Self {
        Self::with_state(coordinator, WizardState::default())
    }

    pub fn with_state(coordinator: SubmissionCoordinator<B, R, N>, state: WizardState) -> Self {
        Self {
            state,
            effects: VecDeque::new(),
            coordinator,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    pub fn form(&self) -> &RegistrationFormState {
        &self.state.form
    }

    pub fn edit(&mut self, data: StepData) -> TransitionOutcome {
        self.dispatch(WizardAction::Edit(data))
    }

    /// Moves forward when the current step is complete. Returns `true` on a move.
    pub fn advance(&mut self) -> bool {
        matches!(
            self.dispatch(WizardAction::Advance),
            TransitionOutcome::Moved { .. }
        )
    }

    pub fn retreat(&mut self) -> bool {
        matches!(
            self.dispatch(WizardAction::Retreat),
            TransitionOutcome::Moved { .. }
        )
    }

    /// Effects queued since the last drain, oldest first.
    pub fn drain_effects(&mut self) -> Vec<WizardEffect> {
        self.effects.drain(..).collect()
    }

    /// Submits from the payment step. Other steps are ignored.
    pub async fn submit(&mut self) -> SubmissionOutcome {
        if self.state.step != WizardStep::Payment {
            debug!(step = %self.state.step, "submit ignored outside the payment step");
            return SubmissionOutcome::Ignored;
        }

        let outcome = self.coordinator.submit(&self.state.form).await;
        if let SubmissionOutcome::Submitted(stored) = &outcome {
            let application_id = stored.record.application_id.clone();
            self.dispatch(WizardAction::SubmissionAccepted(application_id));
        }
        outcome
    }

    fn dispatch(&mut self, action: WizardAction) -> TransitionOutcome {
        let state = std::mem::take(&mut self.state);
        let transition = reduce(state, action);

        debug!(step = %transition.state.step, outcome = ?transition.outcome, "wizard transition");
        self.state = transition.state;
        self.effects.extend(transition.effects);
        transition.outcome
    }
}
