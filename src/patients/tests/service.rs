use std::sync::Arc;

use chrono::NaiveDate;

use super::common::*;
use crate::patients::domain::{Gender, PatientId};
use crate::patients::repository::RepositoryError;
use crate::patients::service::{generate_mrn, PatientService, PatientServiceError};
use crate::screening::{
    AssessmentSource, BiomarkerKind, BiomarkerPanel, DisabledPredictionClient, RiskAssessor,
    RiskLevel,
};

#[tokio::test]
async fn registration_falls_back_to_local_score() {
    let repository = MemoryRepository::seeded();
    let service = fallback_service(repository.clone());

    let registration = service
        .register_at(intake(), clinic_time())
        .await
        .expect("registration succeeds");
    let patient = registration.patient;

    assert_eq!(patient.id, PatientId("P006".to_string()));
    assert_eq!(patient.risk.risk_score.value(), 60);
    assert_eq!(patient.risk.risk_level, RiskLevel::Moderate);
    assert_eq!(patient.risk.source, AssessmentSource::LocalFallback);
    assert_eq!(patient.biomarker_score.value(), 60);
    assert_eq!(patient.ct_image_score.value(), 75);
    assert_eq!(patient.condition, "Benign");
    assert_eq!(
        patient.last_visit,
        NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date")
    );
    assert!(registration.notice.is_some());

    let listed = service.list(None).expect("list succeeds");
    assert_eq!(listed.len(), 6);
    assert_eq!(listed[0].id, patient.id);
}

#[tokio::test]
async fn registration_uses_model_prediction() {
    let service = model_service(MemoryRepository::seeded());

    let registration = service
        .register_at(intake(), clinic_time())
        .await
        .expect("registration succeeds");
    let patient = registration.patient;

    assert_eq!(patient.risk.source, AssessmentSource::ExternalModel);
    assert_eq!(patient.risk.risk_score.value(), 64);
    assert_eq!(patient.ct_image_score.value(), 79);
    assert_eq!(
        patient.prediction.as_ref().map(|p| p.confidence),
        Some(0.81)
    );
    assert!(registration.notice.is_none());
}

#[tokio::test]
async fn explicit_condition_wins_over_prediction_label() {
    let service = model_service(MemoryRepository::default());
    let mut raw = intake();
    raw.condition = "Family History Screening".to_string();

    let patient = service
        .register_at(raw, clinic_time())
        .await
        .expect("registration succeeds")
        .patient;

    assert_eq!(patient.condition, "Family History Screening");
    assert_eq!(patient.id, PatientId("P001".to_string()));
}

#[tokio::test]
async fn intake_without_biomarkers_is_under_assessment() {
    let service = model_service(MemoryRepository::default());
    let mut raw = intake();
    raw.biomarkers = BiomarkerPanel::default();

    let patient = service
        .register_at(raw, clinic_time())
        .await
        .expect("registration succeeds")
        .patient;

    assert_eq!(patient.condition, "Under Assessment");
    assert!(patient.prediction.is_none());
    assert_eq!(patient.risk.risk_score.value(), 15);
    assert_eq!(patient.risk.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn partial_panel_keeps_fallback_score_without_a_diagnosis() {
    let service = model_service(MemoryRepository::default());
    let mut raw = intake();
    raw.biomarkers = BiomarkerPanel::default().with(BiomarkerKind::Ca199, "150");

    let registration = service
        .register_at(raw, clinic_time())
        .await
        .expect("registration succeeds");
    let patient = registration.patient;

    assert_eq!(patient.condition, "Under Assessment");
    assert!(patient.prediction.is_none());
    assert_eq!(patient.risk.source, AssessmentSource::LocalFallback);
    assert_eq!(patient.risk.risk_score.value(), 45);
    assert_eq!(patient.biomarker_score.value(), 45);
    assert!(registration
        .notice
        .is_some_and(|notice| notice.contains("creatinine")));
}

#[tokio::test]
async fn unreachable_model_with_full_panel_stores_synthesized_prediction() {
    let service = fallback_service(MemoryRepository::default());

    let patient = service
        .register_at(intake(), clinic_time())
        .await
        .expect("registration succeeds")
        .patient;

    assert_eq!(
        patient
            .prediction
            .as_ref()
            .map(|prediction| prediction.prediction_label.as_str()),
        Some("Benign")
    );
    assert_eq!(patient.condition, "Benign");
}

#[tokio::test]
async fn other_gender_skips_the_model() {
    let service = model_service(MemoryRepository::default());
    let mut raw = intake();
    raw.gender = "Other".to_string();

    let registration = service
        .register_at(raw, clinic_time())
        .await
        .expect("registration succeeds");

    assert_eq!(registration.patient.gender, Gender::Other);
    assert_eq!(registration.patient.condition, "Under Assessment");
    assert!(registration.patient.prediction.is_none());
    assert_eq!(
        registration.patient.risk.source,
        AssessmentSource::LocalFallback
    );
    assert!(registration
        .notice
        .is_some_and(|notice| notice.contains("sex")));
}

#[tokio::test]
async fn blank_mrn_is_generated_from_the_clock() {
    let service = fallback_service(MemoryRepository::default());
    let mut raw = intake();
    raw.mrn = String::new();
    let now = clinic_time();

    let patient = service
        .register_at(raw, now)
        .await
        .expect("registration succeeds")
        .patient;

    assert_eq!(patient.mrn, generate_mrn(now));
    assert!(patient.mrn.starts_with("MRN-"));
    assert_eq!(patient.mrn.len(), "MRN-".len() + 9);
}

#[tokio::test]
async fn invalid_intake_is_not_stored() {
    let repository = MemoryRepository::default();
    let service = fallback_service(repository.clone());
    let mut raw = intake();
    raw.name = String::new();

    let result = service.register_at(raw, clinic_time()).await;

    assert!(matches!(result, Err(PatientServiceError::Intake(_))));
    assert!(service.list(None).expect("list").is_empty());
}

#[test]
fn list_filters_by_query() {
    let service = fallback_service(MemoryRepository::seeded());

    let results = service.list(Some("pancrea")).expect("list succeeds");
    let ids: Vec<_> = results.iter().map(|patient| patient.id.0.as_str()).collect();

    assert_eq!(ids, vec!["P001", "P002", "P004"]);
}

#[test]
fn get_reports_missing_patients() {
    let service = fallback_service(MemoryRepository::seeded());

    assert_eq!(
        service
            .get(&PatientId("P003".to_string()))
            .expect("found")
            .name,
        "Emily Rodriguez"
    );
    assert!(matches!(
        service.get(&PatientId("P999".to_string())),
        Err(PatientServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn repository_failures_propagate() {
    let service = PatientService::new(
        Arc::new(UnavailableRepository),
        RiskAssessor::new(Arc::new(DisabledPredictionClient)),
    );

    assert!(matches!(
        service.list(None),
        Err(PatientServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}
