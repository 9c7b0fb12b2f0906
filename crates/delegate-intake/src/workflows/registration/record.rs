use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationStatus, ExperienceLevel, FeeAgreement, RegistrationFormState,
};
use super::fees::{DiscountTag, FeeBreakdown, FeeCalculator};
use super::uploads::UploadedFiles;
use super::validation::{FieldValidator, ValidationIssue};

/// Snapshot of a form that passed every step check.
///
/// Required answers are plain values here, so assembly never deals with a
/// missing selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRegistration {
    pub full_name: String,
    pub email: String,
    pub social_handle: String,
    pub institution: String,
    pub birth_date: String,
    pub location: String,
    pub phone: String,
    pub experience_level: ExperienceLevel,
    pub previous_conferences: String,
    pub portfolio_link: String,
    pub committees: [String; 3],
    pub motivation: String,
    pub contribution: String,
    pub fee_agreement: FeeAgreement,
    pub discount_tags: BTreeSet<String>,
    pub confirmed: bool,
}

impl CompletedRegistration {
    pub fn from_form(form: &RegistrationFormState) -> Result<Self, Vec<ValidationIssue>> {
        let issues = FieldValidator::check_all(form);
        let (Some(experience_level), Some(fee_agreement), true) = (
            form.experience.level,
            form.payment.fee_agreement,
            issues.is_empty(),
        ) else {
            return Err(issues);
        };

        let identity = &form.identity;
        let [first, second, third] = form.committees.ranked().map(|choice| choice.trim().to_string());

        Ok(Self {
            full_name: identity.full_name.trim().to_string(),
            email: identity.email.trim().to_string(),
            social_handle: identity.social_handle.trim().to_string(),
            institution: identity.institution.trim().to_string(),
            birth_date: identity.birth_date.trim().to_string(),
            location: identity.location.trim().to_string(),
            phone: identity.phone.trim().to_string(),
            experience_level,
            previous_conferences: form.experience.previous_conferences.clone(),
            portfolio_link: form.experience.portfolio_link.trim().to_string(),
            committees: [first, second, third],
            motivation: form.essays.motivation.clone(),
            contribution: form.essays.contribution.clone(),
            fee_agreement,
            discount_tags: form.payment.discount_tags.clone(),
            confirmed: form.payment.confirmed,
        })
    }

    pub fn fee(&self) -> FeeBreakdown {
        FeeCalculator.calculate(&self.discount_tags)
    }
}

/// Immutable application artifact handed to the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application_id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub social_handle: String,
    pub institution: String,
    pub birth_date: String,
    pub location: String,
    pub phone: String,
    pub photo_url: String,
    pub experience_level: ExperienceLevel,
    pub previous_conferences: String,
    pub portfolio_link: String,
    pub committee_first: String,
    pub committee_second: String,
    pub committee_third: String,
    pub motivation: String,
    pub contribution: String,
    pub fee_agreement: FeeAgreement,
    pub ielts_discount: bool,
    pub sat_discount: bool,
    pub ielts_proof_url: String,
    pub sat_proof_url: String,
    pub confirmed: bool,
    pub original_fee: i64,
    pub discount: i64,
    pub final_fee: i64,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn assemble(
        registration: CompletedRegistration,
        application_id: ApplicationId,
        files: UploadedFiles,
        fee: FeeBreakdown,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let tags = FeeCalculator::recognised(&registration.discount_tags);
        let [committee_first, committee_second, committee_third] = registration.committees;

        Self {
            application_id,
            full_name: registration.full_name,
            email: registration.email,
            social_handle: registration.social_handle,
            institution: registration.institution,
            birth_date: registration.birth_date,
            location: registration.location,
            phone: registration.phone,
            photo_url: files.photo_url,
            experience_level: registration.experience_level,
            previous_conferences: registration.previous_conferences,
            portfolio_link: registration.portfolio_link,
            committee_first,
            committee_second,
            committee_third,
            motivation: registration.motivation,
            contribution: registration.contribution,
            fee_agreement: registration.fee_agreement,
            ielts_discount: tags.contains(&DiscountTag::Ielts),
            sat_discount: tags.contains(&DiscountTag::Sat),
            ielts_proof_url: files.ielts_proof_url,
            sat_proof_url: files.sat_proof_url,
            confirmed: registration.confirmed,
            original_fee: fee.original_fee,
            discount: fee.discount,
            final_fee: fee.final_fee,
            status: ApplicationStatus::Pending,
            submitted_at,
        }
    }

    pub fn fee(&self) -> FeeBreakdown {
        FeeBreakdown {
            original_fee: self.original_fee,
            discount: self.discount,
            final_fee: self.final_fee,
        }
    }

    pub fn files(&self) -> UploadedFiles {
        UploadedFiles {
            photo_url: self.photo_url.clone(),
            ielts_proof_url: self.ielts_proof_url.clone(),
            sat_proof_url: self.sat_proof_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::registration::domain::{
        CommitteePreferences, EssayResponses, ExperienceDetails, IdentityDetails, PaymentDetails,
    };

    fn valid_form() -> RegistrationFormState {
        RegistrationFormState {
            application_id: None,
            identity: IdentityDetails {
                full_name: "  Ada Lovelace ".to_string(),
                email: "ada@example.org".to_string(),
                social_handle: "@ada".to_string(),
                institution: "Analytical College".to_string(),
                birth_date: "2007-12-10".to_string(),
                location: "London".to_string(),
                phone: String::new(),
                photo: None,
            },
            experience: ExperienceDetails {
                level: Some(ExperienceLevel::Intermediate),
                previous_conferences: "Two regional sessions".to_string(),
                portfolio_link: String::new(),
            },
            committees: CommitteePreferences {
                first: "UNSC".to_string(),
                second: "WHO".to_string(),
                third: "UNHRC".to_string(),
            },
            essays: EssayResponses {
                motivation: "Diplomacy".to_string(),
                contribution: "Research".to_string(),
            },
            payment: PaymentDetails {
                fee_agreement: Some(FeeAgreement::Agree),
                discount_tags: ["IELTS".to_string(), "TOEFL".to_string()]
                    .into_iter()
                    .collect(),
                ielts_proof: None,
                sat_proof: None,
                confirmed: true,
            },
        }
    }

    #[test]
    fn incomplete_form_returns_issues() {
        let mut form = valid_form();
        form.experience.level = None;
        let issues = CompletedRegistration::from_form(&form).expect_err("level missing");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "level");
    }

    #[test]
    fn assembled_record_starts_pending_with_resolved_discounts() {
        let completed = CompletedRegistration::from_form(&valid_form()).expect("complete");
        assert_eq!(completed.full_name, "Ada Lovelace");

        let fee = completed.fee();
        let record = ApplicationRecord::assemble(
            completed,
            ApplicationId("DLG-9".to_string()),
            UploadedFiles::default(),
            fee,
            Utc::now(),
        );

        assert_eq!(record.status, ApplicationStatus::Pending);
        assert!(record.ielts_discount);
        assert!(!record.sat_discount);
        assert_eq!(record.final_fee, 69_000);
        assert_eq!(record.committee_third, "UNHRC");
        assert!(record.photo_url.is_empty());
    }
}
