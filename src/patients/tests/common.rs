use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;

use crate::patients::domain::{Patient, PatientId, PatientIntake};
use crate::patients::repository::{PatientRepository, RepositoryError};
use crate::patients::seed::mock_patients;
use crate::patients::service::PatientService;
use crate::screening::{
    BiomarkerKind, BiomarkerPanel, ClassProbabilities, DisabledPredictionClient,
    PredictionClass, PredictionClient, PredictionError, PredictionRequest, PredictionResponse,
    RiskAssessor, RiskScore,
};

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    patients: Arc<Mutex<Vec<Patient>>>,
}

impl MemoryRepository {
    pub(super) fn seeded() -> Self {
        Self {
            patients: Arc::new(Mutex::new(mock_patients())),
        }
    }
}

impl PatientRepository for MemoryRepository {
    fn insert(&self, patient: Patient) -> Result<Patient, RepositoryError> {
        let mut guard = self.patients.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == patient.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(0, patient.clone());
        Ok(patient)
    }

    fn fetch(&self, id: &PatientId) -> Result<Option<Patient>, RepositoryError> {
        let guard = self.patients.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|patient| &patient.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Patient>, RepositoryError> {
        Ok(self.patients.lock().expect("repository mutex poisoned").clone())
    }
}

pub(super) struct UnavailableRepository;

impl PatientRepository for UnavailableRepository {
    fn insert(&self, _patient: Patient) -> Result<Patient, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn fetch(&self, _id: &PatientId) -> Result<Option<Patient>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn list(&self) -> Result<Vec<Patient>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }
}

/// Model that always predicts a benign finding.
pub(super) struct BenignModel;

impl PredictionClient for BenignModel {
    async fn predict(
        &self,
        _request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        Ok(PredictionResponse {
            prediction_class: PredictionClass::Benign,
            prediction_label: "Benign".to_string(),
            confidence: 0.81,
            risk_score: RiskScore::new(64),
            probabilities: ClassProbabilities {
                control: 0.12,
                benign: 0.81,
                cancer: 0.07,
            },
        })
    }
}

pub(super) fn fallback_service(
    repository: MemoryRepository,
) -> PatientService<MemoryRepository, DisabledPredictionClient> {
    PatientService::new(
        Arc::new(repository),
        RiskAssessor::new(Arc::new(DisabledPredictionClient)),
    )
}

pub(super) fn model_service(
    repository: MemoryRepository,
) -> PatientService<MemoryRepository, BenignModel> {
    PatientService::new(Arc::new(repository), RiskAssessor::new(Arc::new(BenignModel)))
}

pub(super) fn clinic_time() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 2, 1, 9, 30, 0)
        .single()
        .expect("unambiguous local time")
}

pub(super) fn intake() -> PatientIntake {
    PatientIntake {
        name: "Grace Hopper".to_string(),
        age: "65".to_string(),
        gender: "Female".to_string(),
        mrn: "MRN-000111222".to_string(),
        biomarkers: full_panel(),
        ..PatientIntake::default()
    }
}

pub(super) fn full_panel() -> BiomarkerPanel {
    BiomarkerPanel::default()
        .with(BiomarkerKind::Ca199, "150")
        .with(BiomarkerKind::Creatinine, "2.0")
        .with(BiomarkerKind::Lyve1, "12.5")
        .with(BiomarkerKind::Reg1a, "640")
        .with(BiomarkerKind::Reg1b, "380")
        .with(BiomarkerKind::Tff1, "250")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
