//! Patient registry owned by the dashboard: records, intake validation and
//! list/detail projections. The risk engine only reads from it.

pub mod domain;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ClinicalNotes, ContactDetails, Gender, IntakeError, Patient, PatientId, PatientIntake,
    ValidatedIntake,
};
pub use repository::{PatientDetailView, PatientRepository, PatientSummaryView, RepositoryError};
pub use router::patient_router;
pub use seed::mock_patients;
pub use service::{generate_mrn, PatientService, PatientServiceError, Registration};
