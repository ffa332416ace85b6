use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::biomarkers::{BiomarkerKind, BiomarkerPanel, Measurement};
use super::prediction::{
    synthesize_fallback_prediction, PredictionClient, PredictionRequest, PredictionResponse, Sex,
};
use super::scoring::{compute_fallback_risk_score, AssessmentSource, RiskAssessment, RiskScore};

/// Assessment plus the prediction shown alongside it.
///
/// `prediction` is absent when the panel was incomplete and no model request
/// could be built; the fallback score is still reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentOutcome {
    pub assessment: RiskAssessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Asks the prediction service first and falls back to the local heuristic on any failure.
pub struct RiskAssessor<P> {
    client: Arc<P>,
}

impl<P> Clone for RiskAssessor<P> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<P> RiskAssessor<P>
where
    P: PredictionClient + 'static,
{
    pub fn new(client: Arc<P>) -> Self {
        Self { client }
    }

    pub async fn assess(
        &self,
        age: Measurement,
        sex: Option<Sex>,
        panel: &BiomarkerPanel,
    ) -> AssessmentOutcome {
        let request = match PredictionRequest::from_panel(age, sex, panel) {
            Ok(request) => request,
            Err(missing) => {
                info!(%missing, "skipping prediction service");
                let score = fallback_score(age, panel);
                return AssessmentOutcome {
                    assessment: RiskAssessment::new(score, AssessmentSource::LocalFallback),
                    prediction: None,
                    notice: Some(format!("{missing}; using local fallback score")),
                };
            }
        };

        match self.client.predict(&request).await {
            Ok(prediction) => {
                let assessment =
                    RiskAssessment::new(prediction.risk_score, AssessmentSource::ExternalModel);
                info!(
                    label = %prediction.prediction_label,
                    score = %assessment.risk_score,
                    "prediction service assessment complete"
                );
                AssessmentOutcome {
                    assessment,
                    prediction: Some(prediction),
                    notice: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "prediction service unavailable, using local fallback");
                let score = fallback_score(age, panel);
                AssessmentOutcome {
                    assessment: RiskAssessment::new(score, AssessmentSource::LocalFallback),
                    prediction: Some(synthesize_fallback_prediction(score)),
                    notice: Some(
                        "prediction service unavailable; using local fallback score".to_string(),
                    ),
                }
            }
        }
    }
}

fn fallback_score(age: Measurement, panel: &BiomarkerPanel) -> RiskScore {
    compute_fallback_risk_score(
        panel.get(BiomarkerKind::Ca199),
        panel.get(BiomarkerKind::Creatinine),
        age,
    )
}
