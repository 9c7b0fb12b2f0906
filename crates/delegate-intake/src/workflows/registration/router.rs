use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, RegistrationFormState, WizardStep};
use super::fees::FeeCalculator;
use super::ids::ApplicationIdGenerator;
use super::repository::{ApplicationRepository, Notifier};
use super::service::{SubmissionCoordinator, SubmissionError, SubmissionOutcome};
use super::storage::BlobStore;
use super::validation::FieldValidator;

/// Submissions carry base64 attachments, so allow more than axum's default.
const MAX_SUBMISSION_BYTES: usize = 16 * 1024 * 1024;

/// Gateway handles shared by every request.
pub struct RegistrationContext<B: ?Sized, R: ?Sized, N: ?Sized> {
    store: Arc<B>,
    repository: Arc<R>,
    notifier: Arc<N>,
    ids: Arc<dyn ApplicationIdGenerator>,
}

impl<B, R, N> RegistrationContext<B, R, N>
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
            store,
            repository,
            notifier,
            ids,
        }
    }

    /// Fresh coordinator for one session or request.
    pub fn coordinator(&self) -> SubmissionCoordinator<B, R, N> {
        SubmissionCoordinator::new(
            self.store.clone(),
            self.repository.clone(),
            self.notifier.clone(),
            self.ids.clone(),
        )
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }
}

pub fn registration_router<B, R, N>(context: Arc<RegistrationContext<B, R, N>>) -> Router
where
    B: BlobStore + ?Sized + 'static,
    R: ApplicationRepository + ?Sized + 'static,
    N: Notifier + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/registrations", post(submit_handler::<B, R, N>))
        .route(
            "/api/v1/registrations/steps/:step/validate",
            post(validate_step_handler),
        )
        .route("/api/v1/registrations/fee", get(fee_handler))
        .route(
            "/api/v1/registrations/:application_id",
            get(status_handler::<B, R, N>),
        )
        .layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES))
        .with_state(context)
}

pub(crate) async fn submit_handler<B, R, N>(
    State(context): State<Arc<RegistrationContext<B, R, N>>>,
    axum::Json(mut form): axum::Json<RegistrationFormState>,
) -> Response
where
    B: BlobStore + ?Sized + 'static,
    R: ApplicationRepository + ?Sized + 'static,
    N: Notifier + ?Sized + 'static,
{
    // Application ids are issued here, never taken from the request body.
    form.application_id = None;
    let outcome = context.coordinator().submit(&form).await;
    let message = outcome.message();

    match outcome {
        SubmissionOutcome::Submitted(stored) => {
            let record = &stored.record;
            let payload = json!({
                "application_id": record.application_id,
                "status": record.status.label(),
                "fee": record.fee(),
                "photo_url": record.photo_url,
                "ielts_proof_url": record.ielts_proof_url,
                "sat_proof_url": record.sat_proof_url,
                "message": message,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        SubmissionOutcome::Rejected(issues) => {
            let payload = json!({
                "error": message,
                "issues": issues,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        SubmissionOutcome::Failed {
            application_id,
            error: SubmissionError::Upload(error),
        } => {
            let payload = json!({
                "error": message,
                "application_id": application_id,
                "attachment": error.kind,
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        SubmissionOutcome::Failed {
            application_id,
            error: SubmissionError::Persistence(_),
        } => {
            let payload = json!({
                "error": message,
                "application_id": application_id,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        SubmissionOutcome::Ignored => {
            let payload = json!({ "error": message });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn validate_step_handler(
    Path(step): Path<u8>,
    axum::Json(form): axum::Json<RegistrationFormState>,
) -> Response {
    let Some(step) = WizardStep::from_number(step) else {
        let payload = json!({
            "error": format!("unknown wizard step {step}"),
        });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };

    let issues = FieldValidator::check_step(step, &form);
    let essay_feedback = (step == WizardStep::Essays).then(|| {
        json!({
            "motivation": FieldValidator::essay_feedback(&form.essays.motivation),
            "contribution": FieldValidator::essay_feedback(&form.essays.contribution),
        })
    });

    let payload = json!({
        "step": step.number(),
        "label": step.label(),
        "valid": issues.is_empty(),
        "issues": issues,
        "essay_feedback": essay_feedback,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeeQuery {
    #[serde(default)]
    tags: Option<String>,
}

pub(crate) async fn fee_handler(Query(query): Query<FeeQuery>) -> Response {
    let tags: Vec<&str> = query
        .tags
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect();

    let breakdown = FeeCalculator.calculate(&tags);
    let applied: Vec<&str> = FeeCalculator::recognised(&tags)
        .into_iter()
        .map(|tag| tag.as_str())
        .collect();

    let payload = json!({
        "original_fee": breakdown.original_fee,
        "discount": breakdown.discount,
        "final_fee": breakdown.final_fee,
        "applied_tags": applied,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn status_handler<B, R, N>(
    State(context): State<Arc<RegistrationContext<B, R, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    B: BlobStore + ?Sized + 'static,
    R: ApplicationRepository + ?Sized + 'static,
    N: Notifier + ?Sized + 'static,
{
    let id = ApplicationId(application_id);
    match context.repository().fetch(&id).await {
        Ok(Some(stored)) => (StatusCode::OK, axum::Json(stored.status_view())).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": "application not found",
                "application_id": id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
