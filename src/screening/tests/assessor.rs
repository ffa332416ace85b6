use std::sync::Arc;

use super::common::*;
use crate::screening::assessor::RiskAssessor;
use crate::screening::biomarkers::{BiomarkerKind, BiomarkerPanel, Measurement};
use crate::screening::prediction::{DisabledPredictionClient, PredictionClass, Sex};
use crate::screening::scoring::{AssessmentSource, RiskLevel};

#[tokio::test]
async fn uses_model_prediction_when_available() {
    let client = Arc::new(StubClient::default());
    let assessor = RiskAssessor::new(client.clone());

    let outcome = assessor
        .assess(Measurement::Value(65.0), Some(Sex::Female), &complete_panel())
        .await;

    assert_eq!(client.calls(), 1);
    assert_eq!(outcome.assessment.source, AssessmentSource::ExternalModel);
    assert_eq!(outcome.assessment.risk_score.value(), 97);
    assert_eq!(outcome.assessment.risk_level, RiskLevel::High);
    assert_eq!(outcome.prediction, Some(model_prediction()));
    assert!(outcome.notice.is_none());
}

#[tokio::test]
async fn falls_back_when_service_fails() {
    let assessor = RiskAssessor::new(Arc::new(UnreachableClient));

    let outcome = assessor
        .assess(Measurement::Value(65.0), Some(Sex::Male), &complete_panel())
        .await;

    assert_eq!(outcome.assessment.source, AssessmentSource::LocalFallback);
    assert_eq!(outcome.assessment.risk_score.value(), 60);
    assert_eq!(outcome.assessment.risk_level, RiskLevel::Moderate);
    assert_eq!(
        outcome.prediction.map(|prediction| prediction.prediction_class),
        Some(PredictionClass::Benign)
    );
    assert!(outcome
        .notice
        .as_deref()
        .is_some_and(|notice| notice.contains("unavailable")));
}

#[tokio::test]
async fn skips_service_when_fields_are_missing() {
    let client = Arc::new(StubClient::default());
    let assessor = RiskAssessor::new(client.clone());
    let panel = BiomarkerPanel::default()
        .with(BiomarkerKind::Ca199, "125")
        .with(BiomarkerKind::Creatinine, "0.5");

    let outcome = assessor
        .assess(Measurement::Value(72.0), Some(Sex::Female), &panel)
        .await;

    assert_eq!(client.calls(), 0);
    assert_eq!(outcome.assessment.source, AssessmentSource::LocalFallback);
    assert_eq!(outcome.assessment.risk_score.value(), 55);
    assert!(outcome.prediction.is_none());
    let notice = outcome.notice.expect("notice present");
    assert!(notice.contains("LYVE1"));
}

#[tokio::test]
async fn disabled_service_degrades_to_fallback() {
    let assessor = RiskAssessor::new(Arc::new(DisabledPredictionClient));

    let outcome = assessor
        .assess(Measurement::Value(30.0), Some(Sex::Male), &complete_panel())
        .await;

    assert_eq!(outcome.assessment.source, AssessmentSource::LocalFallback);
    assert_eq!(
        outcome.prediction.map(|prediction| prediction.risk_score),
        Some(outcome.assessment.risk_score)
    );
}
