use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use pancscreen::auth::{AuthClient, User};
use pancscreen::error::AppError;
use pancscreen::patients::{patient_router, PatientRepository, PatientService};
use pancscreen::screening::{
    compute_fallback_risk_score, synthesize_fallback_prediction, AssessmentOutcome,
    AssessmentSource, BiomarkerKind, BiomarkerPanel, BiomarkerReading, ClassifiedBiomarker,
    Measurement, PredictionClient, PredictionResponse, RiskAssessment, Sex,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyRequest {
    pub(crate) biomarker: String,
    #[serde(default)]
    pub(crate) value: Measurement,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FallbackRequest {
    #[serde(alias = "plasma_CA19_9")]
    pub(crate) ca199: Measurement,
    pub(crate) creatinine: Measurement,
    pub(crate) age: Measurement,
}

#[derive(Debug, Serialize)]
pub(crate) struct FallbackResponse {
    #[serde(flatten)]
    pub(crate) assessment: RiskAssessment,
    pub(crate) risk_label: &'static str,
    pub(crate) risk_description: &'static str,
    pub(crate) prediction: PredictionResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AssessRequest {
    pub(crate) age: Measurement,
    pub(crate) sex: Option<Sex>,
    pub(crate) biomarkers: BiomarkerPanel,
}

/// Handles shared by the login and assessment endpoints.
pub(crate) struct ScreeningState<R, P, A> {
    pub(crate) patients: Arc<PatientService<R, P>>,
    pub(crate) auth: Arc<A>,
}

impl<R, P, A> Clone for ScreeningState<R, P, A> {
    fn clone(&self) -> Self {
        Self {
            patients: Arc::clone(&self.patients),
            auth: Arc::clone(&self.auth),
        }
    }
}

pub(crate) fn with_screening_routes<R, P, A>(
    patients: Arc<PatientService<R, P>>,
    auth: Arc<A>,
) -> Router
where
    R: PatientRepository + 'static,
    P: PredictionClient + 'static,
    A: AuthClient + 'static,
{
    let state = ScreeningState {
        patients: Arc::clone(&patients),
        auth,
    };

    let screening = Router::new()
        .route("/api/v1/auth/login", post(login_endpoint::<R, P, A>))
        .route("/api/v1/risk/assess", post(assess_endpoint::<R, P, A>))
        .with_state(state);

    patient_router(patients)
        .merge(screening)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/biomarkers/classify", post(classify_endpoint))
        .route("/api/v1/risk/fallback", post(fallback_endpoint))
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

pub(crate) async fn login_endpoint<R, P, A>(
    State(state): State<ScreeningState<R, P, A>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<User>, AppError>
where
    R: PatientRepository + 'static,
    P: PredictionClient + 'static,
    A: AuthClient + 'static,
{
    let user = state
        .auth
        .authenticate(&payload.email, &payload.password)
        .await?;
    Ok(Json(user))
}

pub(crate) async fn classify_endpoint(
    Json(payload): Json<ClassifyRequest>,
) -> Result<Json<ClassifiedBiomarker>, AppError> {
    let kind: BiomarkerKind = payload.biomarker.parse()?;
    Ok(Json(BiomarkerReading::new(kind, payload.value).classify()))
}

pub(crate) async fn fallback_endpoint(Json(payload): Json<FallbackRequest>) -> Json<FallbackResponse> {
    let score = compute_fallback_risk_score(payload.ca199, payload.creatinine, payload.age);
    let assessment = RiskAssessment::new(score, AssessmentSource::LocalFallback);

    Json(FallbackResponse {
        risk_label: assessment.risk_level.label(),
        risk_description: assessment.risk_level.description(),
        prediction: synthesize_fallback_prediction(score),
        assessment,
    })
}

pub(crate) async fn assess_endpoint<R, P, A>(
    State(state): State<ScreeningState<R, P, A>>,
    Json(payload): Json<AssessRequest>,
) -> Json<AssessmentOutcome>
where
    R: PatientRepository + 'static,
    P: PredictionClient + 'static,
    A: AuthClient + 'static,
{
    let outcome = state
        .patients
        .assessor()
        .assess(payload.age, payload.sex, &payload.biomarkers)
        .await;
    Json(outcome)
}
