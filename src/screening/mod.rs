//! Risk classification engine for the pancreatic screening panel.
//!
//! `biomarkers` and `scoring` are pure and synchronous. `prediction` and
//! `assessor` wrap the external model and its deterministic fallback.

pub mod assessor;
pub mod biomarkers;
pub mod import;
pub mod prediction;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use assessor::{AssessmentOutcome, RiskAssessor};
pub use biomarkers::{
    classify_biomarker, BiomarkerClassification, BiomarkerKind, BiomarkerPanel, BiomarkerReading,
    BiomarkerStatus, ClassifiedBiomarker, Measurement, PanelClassification, PanelSummary,
    ReferenceRange, Severity, UnknownBiomarker,
};
pub use import::{read_panels, read_panels_from_path, PanelImportError, PanelRecord};
pub use prediction::{
    synthesize_fallback_prediction, ClassProbabilities, DisabledPredictionClient,
    HttpPredictionClient, MissingFields, PredictionClass, PredictionClient, PredictionError,
    PredictionRequest, PredictionResponse, Sex,
};
pub use scoring::{
    bucket_risk_level, compute_fallback_risk_score, fuse_scores, placeholder_imaging_score,
    AssessmentSource, RiskAssessment, RiskLevel, RiskScore,
};
