use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredPredictionClient, InMemoryPatientRepository};
use crate::routes::with_screening_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pancscreen::auth::MockAuthClient;
use pancscreen::config::AppConfig;
use pancscreen::error::AppError;
use pancscreen::patients::PatientService;
use pancscreen::screening::RiskAssessor;
use pancscreen::telemetry;
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

    let prediction = ConfiguredPredictionClient::from_config(&config.prediction)?;
    info!(endpoint = %prediction.describe(), "prediction service configured");

    let repository = Arc::new(InMemoryPatientRepository::seeded());
    let assessor = RiskAssessor::new(Arc::new(prediction));
    let patient_service = Arc::new(PatientService::new(repository, assessor));

    let app = with_screening_routes(patient_service, Arc::new(MockAuthClient))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pancreatic screening service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
