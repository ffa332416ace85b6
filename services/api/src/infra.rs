use metrics_exporter_prometheus::PrometheusHandle;
use pancscreen::config::PredictionConfig;
use pancscreen::patients::{mock_patients, Patient, PatientId, PatientRepository, RepositoryError};
use pancscreen::screening::{
    DisabledPredictionClient, HttpPredictionClient, PredictionClient, PredictionError,
    PredictionRequest, PredictionResponse,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Registry kept in process memory, newest registrations first.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPatientRepository {
    patients: Arc<Mutex<Vec<Patient>>>,
}

impl InMemoryPatientRepository {
    pub(crate) fn seeded() -> Self {
        Self {
            patients: Arc::new(Mutex::new(mock_patients())),
        }
    }
}

impl PatientRepository for InMemoryPatientRepository {
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
        let guard = self.patients.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
    }
}

/// Prediction client chosen from configuration at startup.
pub(crate) enum ConfiguredPredictionClient {
    Remote(HttpPredictionClient),
    Disabled(DisabledPredictionClient),
}

impl ConfiguredPredictionClient {
    pub(crate) fn from_config(config: &PredictionConfig) -> Result<Self, PredictionError> {
        match &config.base_url {
            Some(base_url) => Ok(Self::Remote(HttpPredictionClient::new(
                base_url.as_str(),
                config.timeout,
            )?)),
            None => Ok(Self::Disabled(DisabledPredictionClient)),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Remote(client) => client.endpoint(),
            Self::Disabled(_) => "disabled".to_string(),
        }
    }
}

impl PredictionClient for ConfiguredPredictionClient {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        match self {
            Self::Remote(client) => client.predict(request).await,
            Self::Disabled(client) => client.predict(request).await,
        }
    }
}
