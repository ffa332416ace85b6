use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{PredictionClient, PredictionError, PredictionRequest, PredictionResponse};

const PREDICT_PATH: &str = "/api/predict/biomarkers";

/// Body returned by the service; failures carry `success: false` and an error.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    payload: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: Client,
    base_url: String,
}

impl HttpPredictionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PredictionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PredictionError::Transport(err.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{PREDICT_PATH}", self.base_url)
    }
}

impl PredictionClient for HttpPredictionClient {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        let url = self.endpoint();
        debug!(%url, "requesting biomarker prediction");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| PredictionError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| PredictionError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_prediction(&body)
    }
}

pub(crate) fn parse_prediction(body: &str) -> Result<PredictionResponse, PredictionError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|err| PredictionError::Malformed(err.to_string()))?;

    if envelope.success == Some(false) {
        let reason = envelope
            .error
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(PredictionError::Rejected(reason));
    }

    serde_json::from_value(serde_json::Value::Object(envelope.payload))
        .map_err(|err| PredictionError::Malformed(err.to_string()))
}
