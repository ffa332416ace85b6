use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use crate::screening::biomarkers::{BiomarkerKind, BiomarkerPanel};
use crate::screening::prediction::{
    ClassProbabilities, PredictionClass, PredictionClient, PredictionError, PredictionRequest,
    PredictionResponse,
};
use crate::screening::scoring::RiskScore;

pub(super) fn complete_panel() -> BiomarkerPanel {
    BiomarkerPanel::default()
        .with(BiomarkerKind::Ca199, 150.0)
        .with(BiomarkerKind::Creatinine, 2.0)
        .with(BiomarkerKind::Lyve1, 12.5)
        .with(BiomarkerKind::Reg1a, 640.0)
        .with(BiomarkerKind::Reg1b, 380.0)
        .with(BiomarkerKind::Tff1, 250.0)
}

pub(super) fn model_prediction() -> PredictionResponse {
    PredictionResponse {
        prediction_class: PredictionClass::Cancer,
        prediction_label: "Cancer".to_string(),
        confidence: 0.912,
        risk_score: RiskScore::new(97),
        probabilities: ClassProbabilities {
            control: 0.021,
            benign: 0.067,
            cancer: 0.912,
        },
    }
}

/// Returns a canned prediction and counts calls.
#[derive(Default)]
pub(super) struct StubClient {
    pub(super) calls: AtomicUsize,
}

impl StubClient {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PredictionClient for StubClient {
    async fn predict(
        &self,
        _request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(model_prediction())
    }
}

pub(super) struct UnreachableClient;

impl PredictionClient for UnreachableClient {
    async fn predict(
        &self,
        _request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        Err(PredictionError::Transport("connection refused".to_string()))
    }
}

/// Serves a single fixed response on the prediction path and returns its address.
pub(super) async fn spawn_prediction_service(status: StatusCode, body: Value) -> SocketAddr {
    let app = Router::new().route(
        "/api/predict/biomarkers",
        post(move |Json(_request): Json<Value>| {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server runs");
    });
    addr
}
