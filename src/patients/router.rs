use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{PatientId, PatientIntake};
use super::repository::{PatientRepository, PatientSummaryView, RepositoryError};
use super::service::{PatientService, PatientServiceError};
use crate::screening::PredictionClient;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PatientListQuery {
    #[serde(default)]
    q: Option<String>,
}

/// Router exposing the registry list, detail and intake endpoints.
pub fn patient_router<R, P>(service: Arc<PatientService<R, P>>) -> Router
where
    R: PatientRepository + 'static,
    P: PredictionClient + 'static,
{
    Router::new()
        .route(
            "/api/v1/patients",
            get(list_handler::<R, P>).post(register_handler::<R, P>),
        )
        .route("/api/v1/patients/:patient_id", get(detail_handler::<R, P>))
        .with_state(service)
}

pub(crate) async fn list_handler<R, P>(
    State(service): State<Arc<PatientService<R, P>>>,
    Query(query): Query<PatientListQuery>,
) -> Response
where
    R: PatientRepository + 'static,
    P: PredictionClient + 'static,
{
    match service.list(query.q.as_deref()) {
        Ok(patients) => {
            let views: Vec<PatientSummaryView> =
                patients.iter().map(|patient| patient.summary_view()).collect();
            let payload = json!({
                "count": views.len(),
                "patients": views,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn detail_handler<R, P>(
    State(service): State<Arc<PatientService<R, P>>>,
    Path(patient_id): Path<String>,
) -> Response
where
    R: PatientRepository + 'static,
    P: PredictionClient + 'static,
{
    let id = PatientId(patient_id);
    match service.get(&id) {
        Ok(patient) => (StatusCode::OK, Json(patient.detail_view())).into_response(),
        Err(PatientServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": format!("patient {id} not found"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn register_handler<R, P>(
    State(service): State<Arc<PatientService<R, P>>>,
    Json(intake): Json<PatientIntake>,
) -> Response
where
    R: PatientRepository + 'static,
    P: PredictionClient + 'static,
{
    match service.register(intake).await {
        Ok(registration) => {
            let payload = json!({
                "patient": registration.patient.detail_view(),
                "notice": registration.notice,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(PatientServiceError::Intake(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(PatientServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "patient already exists",
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

fn internal_error(error: PatientServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
