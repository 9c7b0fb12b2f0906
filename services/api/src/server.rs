use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository, LogNotifier};
use crate::routes::with_registration_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use delegate_intake::config::AppConfig;
use delegate_intake::error::AppError;
use delegate_intake::telemetry;
use delegate_intake::workflows::registration::{
    ApplicationIdGenerator, LocalBlobStore, RegistrationContext, TimestampIdGenerator,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(LocalBlobStore::new(
        config.storage.upload_dir.clone(),
        config.public_base_url(),
    ));
    store.ensure_root().await?;
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let notifier = Arc::new(LogNotifier::default());
    let ids: Arc<dyn ApplicationIdGenerator> = Arc::new(TimestampIdGenerator::new(
        config.registration.id_prefix.clone(),
    ));
    let context = Arc::new(RegistrationContext::new(store, repository, notifier, ids));

    let app = with_registration_routes(context, &config.storage.upload_dir)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        upload_dir = %config.storage.upload_dir.display(),
        public_url = %config.public_base_url(),
        "delegate registration service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
