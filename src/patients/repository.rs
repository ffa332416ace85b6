use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{ClinicalNotes, ContactDetails, Patient, PatientId};
use crate::screening::{
    AssessmentSource, PanelClassification, PredictionResponse, RiskLevel, RiskScore,
};

/// Storage abstraction so the service can run against any backing store.
pub trait PatientRepository: Send + Sync {
    fn insert(&self, patient: Patient) -> Result<Patient, RepositoryError>;
    fn fetch(&self, id: &PatientId) -> Result<Option<Patient>, RepositoryError>;
    /// Newest registrations first.
    fn list(&self) -> Result<Vec<Patient>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("patient already exists")]
    Conflict,
    #[error("patient not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Row shown in the patient list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSummaryView {
    pub id: PatientId,
    pub name: String,
    pub age: u8,
    pub gender: &'static str,
    pub mrn: String,
    pub condition: String,
    pub last_visit: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_appointment: Option<NaiveDate>,
    pub risk_score: RiskScore,
    pub risk_level: RiskLevel,
    pub risk_label: &'static str,
    pub biomarker_score: RiskScore,
    pub ct_image_score: RiskScore,
}

/// Full clinical view backing the detail tabs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientDetailView {
    #[serde(flatten)]
    pub summary: PatientSummaryView,
    pub risk_description: &'static str,
    pub risk_source: AssessmentSource,
    pub biomarker_level: RiskLevel,
    pub ct_image_level: RiskLevel,
    pub biomarkers: PanelClassification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResponse>,
    pub contact: ContactDetails,
    pub notes: ClinicalNotes,
}

impl Patient {
    pub fn summary_view(&self) -> PatientSummaryView {
        PatientSummaryView {
            id: self.id.clone(),
            name: self.name.clone(),
            age: self.age,
            gender: self.gender.label(),
            mrn: self.mrn.clone(),
            condition: self.condition.clone(),
            last_visit: self.last_visit,
            next_appointment: self.next_appointment,
            risk_score: self.risk.risk_score,
            risk_level: self.risk.risk_level,
            risk_label: self.risk.risk_level.label(),
            biomarker_score: self.biomarker_score,
            ct_image_score: self.ct_image_score,
        }
    }

    pub fn detail_view(&self) -> PatientDetailView {
        PatientDetailView {
            summary: self.summary_view(),
            risk_description: self.risk.risk_level.description(),
            risk_source: self.risk.source,
            biomarker_level: self.biomarker_score.level(),
            ct_image_level: self.ct_image_score.level(),
            biomarkers: self.biomarkers.classify(),
            prediction: self.prediction.clone(),
            contact: self.contact.clone(),
            notes: self.notes.clone(),
        }
    }
}
