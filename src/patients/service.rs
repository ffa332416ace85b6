use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use super::domain::{IntakeError, Patient, PatientId, PatientIntake};
use super::repository::{PatientRepository, RepositoryError};
use crate::screening::{
    fuse_scores, placeholder_imaging_score, PredictionClient, RiskAssessment, RiskAssessor,
};

const UNASSESSED_CONDITION: &str = "Under Assessment";

/// Registry service composing validation, risk assessment and storage.
pub struct PatientService<R, P> {
    repository: Arc<R>,
    assessor: RiskAssessor<P>,
    sequence: AtomicU64,
}

/// Newly stored patient plus any informational notice from the assessment.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub patient: Patient,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl<R, P> PatientService<R, P>
where
    R: PatientRepository + 'static,
    P: PredictionClient + 'static,
{
    pub fn new(repository: Arc<R>, assessor: RiskAssessor<P>) -> Self {
        Self {
            repository,
            assessor,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn assessor(&self) -> &RiskAssessor<P> {
        &self.assessor
    }

    pub async fn register(
        &self,
        intake: PatientIntake,
    ) -> Result<Registration, PatientServiceError> {
        self.register_at(intake, Local::now()).await
    }

    /// Validate, assess and store an intake as of `now`.
    pub async fn register_at(
        &self,
        intake: PatientIntake,
        now: DateTime<Local>,
    ) -> Result<Registration, PatientServiceError> {
        let intake = intake.validate()?;

        let outcome = self
            .assessor
            .assess(
                intake.age_measurement(),
                intake.gender.prediction_sex(),
                &intake.biomarkers,
            )
            .await;

        let biomarker_score = outcome.assessment.risk_score;
        let ct_image_score = placeholder_imaging_score(biomarker_score);
        let risk = RiskAssessment::new(
            fuse_scores(biomarker_score, Some(ct_image_score)),
            outcome.assessment.source,
        );

        // Only a complete panel yields a prediction; partial panels stay unassessed.
        let prediction = outcome.prediction;

        let condition = intake
            .condition
            .or_else(|| prediction.as_ref().map(|p| p.prediction_label.clone()))
            .unwrap_or_else(|| UNASSESSED_CONDITION.to_string());
        let mrn = intake.mrn.unwrap_or_else(|| generate_mrn(now));

        let patient = Patient {
            id: self.next_patient_id()?,
            name: intake.name,
            age: intake.age,
            gender: intake.gender,
            mrn,
            condition,
            last_visit: now.date_naive(),
            next_appointment: None,
            risk,
            biomarker_score,
            ct_image_score,
            contact: intake.contact,
            notes: intake.notes,
            biomarkers: intake.biomarkers,
            prediction,
        };

        let stored = self.repository.insert(patient)?;
        info!(
            patient_id = %stored.id,
            risk_level = %stored.risk.risk_level,
            source = ?stored.risk.source,
            "patient registered"
        );

        Ok(Registration {
            patient: stored,
            notice: outcome.notice,
        })
    }

    /// Patients in display order, filtered by name, MRN or condition.
    pub fn list(&self, query: Option<&str>) -> Result<Vec<Patient>, PatientServiceError> {
        let patients = self.repository.list()?;
        Ok(match query {
            Some(query) => patients
                .into_iter()
                .filter(|patient| patient.matches(query))
                .collect(),
            None => patients,
        })
    }

    pub fn get(&self, id: &PatientId) -> Result<Patient, PatientServiceError> {
        let patient = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(patient)
    }

    fn next_patient_id(&self) -> Result<PatientId, RepositoryError> {
        loop {
            let candidate = PatientId(format!(
                "P{:03}",
                self.sequence.fetch_add(1, Ordering::Relaxed)
            ));
            if self.repository.fetch(&candidate)?.is_none() {
                return Ok(candidate);
            }
        }
    }
}

/// `MRN-` followed by the last nine digits of the millisecond clock.
pub fn generate_mrn(now: DateTime<Local>) -> String {
    let millis = now.timestamp_millis().rem_euclid(1_000_000_000);
    format!("MRN-{millis:09}")
}

#[derive(Debug, thiserror::Error)]
pub enum PatientServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
