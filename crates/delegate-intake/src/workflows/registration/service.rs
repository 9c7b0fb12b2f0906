use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{ApplicationId, RegistrationFormState};
use super::ids::ApplicationIdGenerator;
use super::record::{ApplicationRecord, CompletedRegistration};
use super::repository::{
    ApplicationRepository, Notice, Notifier, RepositoryError, StoredApplication,
};
use super::storage::BlobStore;
use super::uploads::{FileUploadOrchestrator, UploadError};
use super::validation::ValidationIssue;

const PERSISTENCE_FAILED: &str = "Submission failed, please try again.";

/// Runs one submission attempt end to end: uploads, fee, record, insert.
///
/// One coordinator serves one registration session. A second `submit` while
/// the first is still running is ignored.
pub struct SubmissionCoordinator<B: ?Sized, R: ?Sized, N: ?Sized> {
    uploads: FileUploadOrchestrator<B>,
    repository: Arc<R>,
    notifier: Arc<N>,
    ids: Arc<dyn ApplicationIdGenerator>,
    submitting: AtomicBool,
}

impl<B, R, N> SubmissionCoordinator<B, R, N>
where
    B: BlobStore + ?Sized + 'static,
    R: ApplicationRepository + ?Sized + 'static,
    N: Notifier + ?Sized + 'static,
{
    pub fn new(
        store: Arc<B>,
        repository: Arc<R>,
        notifier: Arc<N>,
        ids: Arc<dyn ApplicationIdGenerator>,
    ) -> Self {
        Self {
            uploads: FileUploadOrchestrator::new(store),
            repository,
            notifier,
            ids,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub async fn submit(&self, form: &RegistrationFormState) -> SubmissionOutcome {
        let Some(_in_flight) = self.begin() else {
            return SubmissionOutcome::Ignored;
        };

        let registration = match CompletedRegistration::from_form(form) {
            Ok(registration) => registration,
            Err(issues) => return SubmissionOutcome::Rejected(issues),
        };

        let application_id = form
            .application_id
            .clone()
            .unwrap_or_else(|| self.ids.generate());

        match self.persist(registration, form, &application_id).await {
            Ok(stored) => {
                info!(
                    %application_id,
                    row_id = stored.row_id,
                    final_fee = stored.record.final_fee,
                    "registration submitted"
                );
                let outcome = SubmissionOutcome::Submitted(stored);
                self.notifier.notify(Notice::success(outcome.message()));
                outcome
            }
            Err(error) => {
                warn!(%application_id, error = %error, "registration submission failed");
                let outcome = SubmissionOutcome::Failed {
                    application_id,
                    error,
                };
                self.notifier.notify(Notice::error(outcome.message()));
                outcome
            }
        }
    }

    async fn persist(
        &self,
        registration: CompletedRegistration,
        form: &RegistrationFormState,
        application_id: &ApplicationId,
    ) -> Result<StoredApplication, SubmissionError> {
        let files = self
            .uploads
            .upload_all(form.attachments(), application_id)
            .await?;

        let fee = registration.fee();
        if fee.exceeds_advertised_cap() {
            warn!(
                %application_id,
                discount = fee.discount,
                "discount exceeds the advertised maximum"
            );
        }

        let record = ApplicationRecord::assemble(
            registration,
            application_id.clone(),
            files,
            fee,
            Utc::now(),
        );

        Ok(self.repository.insert(record).await?)
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.submitting))
    }
}

/// Clears the submitting flag however the attempt ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Gateway failure that ended a submission attempt.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Result of one `submit` call. Errors never escape the coordinator.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Submitted(StoredApplication),
    Rejected(Vec<ValidationIssue>),
    Failed {
        application_id: ApplicationId,
        error: SubmissionError,
    },
    Ignored,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Submitted(_))
    }

    pub fn message(&self) -> String {
        match self {
            SubmissionOutcome::Submitted(stored) => format!(
                "Registration submitted. Your application id is {}.",
                stored.record.application_id
            ),
            SubmissionOutcome::Rejected(_) => {
                "Please complete every required field before submitting.".to_string()
            }
            SubmissionOutcome::Failed {
                error: SubmissionError::Upload(error),
                ..
            } => format!("Could not upload your {}. Please try again.", error.kind),
            SubmissionOutcome::Failed {
                error: SubmissionError::Persistence(_),
                ..
            } => PERSISTENCE_FAILED.to_string(),
            SubmissionOutcome::Ignored => "A submission is already in progress.".to_string(),
        }
    }
}
