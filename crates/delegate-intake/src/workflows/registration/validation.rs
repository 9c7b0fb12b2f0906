use serde::Serialize;

use super::domain::{RegistrationFormState, WizardStep};

/// Word count the essay screens suggest. Advisory only.
pub const SUGGESTED_ESSAY_WORDS: usize = 250;

/// A single reason a step cannot be left yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub step: WizardStep,
    pub field: &'static str,
    pub message: String,
}

impl ValidationIssue {
    fn new(step: WizardStep, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            step,
            field,
            message: message.into(),
        }
    }
}

/// How an essay's length compares with the suggested word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WordCountStatus {
    Empty,
    WithinLimit,
    OverLimit,
}

/// Display hint for an essay field. Colours feedback; never gates the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EssayFeedback {
    pub words: usize,
    pub suggested: usize,
    pub status: WordCountStatus,
}

/// Per-step completeness checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldValidator;

impl FieldValidator {
    pub fn is_step_valid(step: WizardStep, form: &RegistrationFormState) -> bool {
        Self::check_step(step, form).is_empty()
    }

    pub fn check_step(step: WizardStep, form: &RegistrationFormState) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        match step {
            WizardStep::Identity => {
                let identity = &form.identity;
                let required = [
                    ("full_name", "Full name", &identity.full_name),
                    ("email", "Email", &identity.email),
                    ("social_handle", "Social media handle", &identity.social_handle),
                    ("institution", "School or institution", &identity.institution),
                    ("birth_date", "Date of birth", &identity.birth_date),
                    ("location", "City", &identity.location),
                ];
                for (field, label, value) in required {
                    if is_blank(value) {
                        issues.push(ValidationIssue::new(
                            step,
                            field,
                            format!("{label} is required."),
                        ));
                    }
                }
            }
            WizardStep::Experience => {
                if form.experience.level.is_none() {
                    issues.push(ValidationIssue::new(
                        step,
                        "level",
                        "Select your experience level.",
                    ));
                }
            }
            WizardStep::Committees => {
                let ranked = form.committees.ranked();
                let fields = ["first", "second", "third"];
                for (index, (field, value)) in fields.into_iter().zip(ranked).enumerate() {
                    if is_blank(value) {
                        issues.push(ValidationIssue::new(
                            step,
                            field,
                            format!("Choose your preference #{}.", index + 1),
                        ));
                        continue;
                    }

                    let repeated = ranked[..index]
                        .iter()
                        .any(|earlier| earlier.trim() == value.trim());
                    if repeated {
                        issues.push(ValidationIssue::new(
                            step,
                            field,
                            format!(
                                "Preference #{} repeats an earlier choice; pick a different committee.",
                                index + 1
                            ),
                        ));
                    }
                }
            }
            WizardStep::Essays => {
                if is_blank(&form.essays.motivation) {
                    issues.push(ValidationIssue::new(
                        step,
                        "motivation",
                        "Tell us why you want to join.",
                    ));
                }
                if is_blank(&form.essays.contribution) {
                    issues.push(ValidationIssue::new(
                        step,
                        "contribution",
                        "Tell us what you will contribute.",
                    ));
                }
            }
            WizardStep::Payment => {
                if form.payment.fee_agreement.is_none() {
                    issues.push(ValidationIssue::new(
                        step,
                        "fee_agreement",
                        "Answer the registration fee question.",
                    ));
                }
            }
            WizardStep::Confirmation => {}
        }

        issues
    }

    /// Issues across every input step, in step order.
    pub fn check_all(form: &RegistrationFormState) -> Vec<ValidationIssue> {
        WizardStep::INPUT
            .into_iter()
            .flat_map(|step| Self::check_step(step, form))
            .collect()
    }

    pub fn essay_feedback(text: &str) -> EssayFeedback {
        let words = word_count(text);
        let status = if words == 0 {
            WordCountStatus::Empty
        } else if words > SUGGESTED_ESSAY_WORDS {
            WordCountStatus::OverLimit
        } else {
            WordCountStatus::WithinLimit
        };

        EssayFeedback {
            words,
            suggested: SUGGESTED_ESSAY_WORDS,
            status,
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
