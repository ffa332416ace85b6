//! Contract with the external biomarker prediction service.
//!
//! The service itself is opaque; this module owns the wire types, the client
//! capability, and the synthesized result used when the service cannot answer.

pub(crate) mod http;

pub use http::HttpPredictionClient;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use super::biomarkers::{BiomarkerKind, BiomarkerPanel, Measurement};
use super::scoring::{RiskLevel, RiskScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M", alias = "Male", alias = "male", alias = "m")]
    Male,
    #[serde(rename = "F", alias = "Female", alias = "female", alias = "f")]
    Female,
}

impl Sex {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Sex::Male),
            "f" | "female" => Some(Sex::Female),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

/// Request body accepted by `/api/predict/biomarkers`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub age: f64,
    pub sex: Sex,
    #[serde(rename = "plasma_CA19_9")]
    pub plasma_ca19_9: f64,
    pub creatinine: f64,
    #[serde(rename = "LYVE1")]
    pub lyve1: f64,
    #[serde(rename = "REG1A")]
    pub reg1a: f64,
    #[serde(rename = "REG1B")]
    pub reg1b: f64,
    #[serde(rename = "TFF1")]
    pub tff1: f64,
}

impl PredictionRequest {
    /// Builds a request when every field is present, otherwise lists the missing field names.
    pub fn from_panel(
        age: Measurement,
        sex: Option<Sex>,
        panel: &BiomarkerPanel,
    ) -> Result<Self, MissingFields> {
        let mut missing = Vec::new();
        if !age.is_available() {
            missing.push("age");
        }
        if sex.is_none() {
            missing.push("sex");
        }
        missing.extend(panel.missing().into_iter().map(BiomarkerKind::field_name));

        match (age.value(), sex, missing.is_empty()) {
            (Some(age), Some(sex), true) => {
                let value = |kind| panel.get(kind).value().unwrap_or_default();
                Ok(Self {
                    age,
                    sex,
                    plasma_ca19_9: value(BiomarkerKind::Ca199),
                    creatinine: value(BiomarkerKind::Creatinine),
                    lyve1: value(BiomarkerKind::Lyve1),
                    reg1a: value(BiomarkerKind::Reg1a),
                    reg1b: value(BiomarkerKind::Reg1b),
                    tff1: value(BiomarkerKind::Tff1),
                })
            }
            _ => Err(MissingFields(missing)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

/// Outcome classes emitted by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PredictionClass {
    Control,
    Benign,
    Cancer,
}

impl PredictionClass {
    pub fn label(self) -> &'static str {
        match self {
            PredictionClass::Control => "Control",
            PredictionClass::Benign => "Benign",
            PredictionClass::Cancer => "Cancer",
        }
    }

    pub fn from_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => PredictionClass::Control,
            RiskLevel::Moderate => PredictionClass::Benign,
            RiskLevel::High => PredictionClass::Cancer,
        }
    }
}

impl From<PredictionClass> for u8 {
    fn from(value: PredictionClass) -> Self {
        match value {
            PredictionClass::Control => 0,
            PredictionClass::Benign => 1,
            PredictionClass::Cancer => 2,
        }
    }
}

impl TryFrom<u8> for PredictionClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PredictionClass::Control),
            1 => Ok(PredictionClass::Benign),
            2 => Ok(PredictionClass::Cancer),
            other => Err(format!("unknown prediction class {other}")),
        }
    }
}

impl fmt::Display for PredictionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    #[serde(rename = "Control")]
    pub control: f64,
    #[serde(rename = "Benign")]
    pub benign: f64,
    #[serde(rename = "Cancer")]
    pub cancer: f64,
}

/// Fields of a successful prediction that the rest of the system consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction_class: PredictionClass,
    pub prediction_label: String,
    pub confidence: f64,
    pub risk_score: RiskScore,
    pub probabilities: ClassProbabilities,
}

const FALLBACK_CONFIDENCE: f64 = 0.75;

/// Placeholder prediction dominated by the class matching the score's bucket.
///
/// The numbers are display placeholders and carry no calibration.
pub fn synthesize_fallback_prediction(score: RiskScore) -> PredictionResponse {
    let level = score.level();
    let class = PredictionClass::from_level(level);

    PredictionResponse {
        prediction_class: class,
        prediction_label: class.label().to_string(),
        confidence: FALLBACK_CONFIDENCE,
        risk_score: score,
        probabilities: ClassProbabilities {
            control: if level == RiskLevel::Low { 0.75 } else { 0.15 },
            benign: if level == RiskLevel::Moderate { 0.75 } else { 0.20 },
            cancer: if level == RiskLevel::High { 0.75 } else { 0.05 },
        },
    }
}

/// Capability for obtaining a model prediction; swap implementations without
/// touching the engine.
pub trait PredictionClient: Send + Sync {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> impl Future<Output = Result<PredictionResponse, PredictionError>> + Send;
}

/// Client used when no prediction service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPredictionClient;

impl PredictionClient for DisabledPredictionClient {
    async fn predict(
        &self,
        _request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        Err(PredictionError::Disabled)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("prediction service is not configured")]
    Disabled,
    #[error("prediction transport failed: {0}")]
    Transport(String),
    #[error("prediction service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed prediction response: {0}")]
    Malformed(String),
    #[error("prediction rejected: {0}")]
    Rejected(String),
}
