use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::biomarkers::{BiomarkerKind, Measurement};

/// Integer risk estimate, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct RiskScore(u8);

impl RiskScore {
    pub const MIN: RiskScore = RiskScore(0);
    pub const MAX: RiskScore = RiskScore(100);

    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// Rounds and clamps a floating score; non-finite input maps to zero.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Self(value.round().clamp(0.0, 100.0) as u8)
        } else {
            Self::MIN
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn level(self) -> RiskLevel {
        RiskLevel::from_score(self)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for RiskScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Ok(RiskScore::from_f64(raw))
    }
}

const MODERATE_CUT: u8 = 40;
const HIGH_CUT: u8 = 70;

/// Coarse bucket shown on badges, meters and list rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// The only place the cut points live.
    pub fn from_score(score: RiskScore) -> Self {
        if score.value() < MODERATE_CUT {
            RiskLevel::Low
        } else if score.value() < HIGH_CUT {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RiskLevel::Low => "Patient shows minimal risk factors. Continue routine monitoring.",
            RiskLevel::Moderate => {
                "Patient shows moderate risk factors. Enhanced monitoring recommended."
            }
            RiskLevel::High => {
                "Patient shows significant risk factors. Immediate consultation recommended."
            }
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn bucket_risk_level(score: RiskScore) -> RiskLevel {
    RiskLevel::from_score(score)
}

/// Which computation path produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentSource {
    ExternalModel,
    LocalFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub risk_score: RiskScore,
    pub risk_level: RiskLevel,
    pub source: AssessmentSource,
}

impl RiskAssessment {
    pub fn new(risk_score: RiskScore, source: AssessmentSource) -> Self {
        Self {
            risk_score,
            risk_level: risk_score.level(),
            source,
        }
    }
}

impl<'de> Deserialize<'de> for RiskAssessment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Stored {
            risk_score: RiskScore,
            source: AssessmentSource,
        }

        let stored = Stored::deserialize(deserializer)?;
        Ok(RiskAssessment::new(stored.risk_score, stored.source))
    }
}

/// Additive heuristic used when no model prediction is available.
///
/// Unavailable inputs contribute nothing.
pub fn compute_fallback_risk_score(
    ca199: impl Into<Measurement>,
    creatinine: impl Into<Measurement>,
    age: impl Into<Measurement>,
) -> RiskScore {
    let mut score: i64 = 0;

    if let Some(ca199) = ca199.into().value() {
        let cuts = BiomarkerKind::Ca199.thresholds();
        if ca199 > cuts.high {
            score += 30;
        } else if ca199 > cuts.moderate {
            score += 15;
        }
    }

    if let Some(creatinine) = creatinine.into().value() {
        let cuts = BiomarkerKind::Creatinine.thresholds();
        if creatinine > cuts.high {
            score += 15;
        } else if cuts.low.is_some_and(|low| creatinine < low) {
            score += 10;
        }
    }

    if let Some(age) = age.into().value() {
        if age > 60.0 {
            score += 15;
        } else if age > 50.0 {
            score += 8;
        }
    }

    RiskScore::new(score)
}

/// Overall score shown on the fusion meter.
///
/// No weighting between the biomarker and imaging models is defined, so the
/// biomarker score passes through and the imaging score is only displayed.
pub fn fuse_scores(biomarker_score: RiskScore, _imaging_score: Option<RiskScore>) -> RiskScore {
    biomarker_score
}

/// Mock CT model output recorded for newly registered patients.
pub fn placeholder_imaging_score(risk_score: RiskScore) -> RiskScore {
    RiskScore::new(i64::from(risk_score.value()) + 15)
}
