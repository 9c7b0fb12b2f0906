use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use delegate_intake::config::UPLOADS_MOUNT;
use delegate_intake::workflows::registration::{
    registration_router, ApplicationRepository, BlobStore, Notifier, RegistrationContext,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Registration API plus stored attachments under `/uploads` and the
/// operational endpoints.
pub(crate) fn with_registration_routes<B, R, N>(
    context: Arc<RegistrationContext<B, R, N>>,
    upload_dir: &Path,
) -> axum::Router
where
    B: BlobStore + ?Sized + 'static,
    R: ApplicationRepository + ?Sized + 'static,
    N: Notifier + ?Sized + 'static,
{
    registration_router(context)
        .nest_service(UPLOADS_MOUNT, ServeDir::new(upload_dir))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
