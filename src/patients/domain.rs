use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::screening::{
    BiomarkerPanel, Measurement, PredictionResponse, RiskAssessment, RiskScore, Sex,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub String);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Sex code for the prediction model; `Other` has none, so the model is skipped.
    pub fn prediction_sex(self) -> Option<Sex> {
        match self {
            Gender::Male => Some(Sex::Male),
            Gender::Female => Some(Sex::Female),
            Gender::Other => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub emergency_contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalNotes {
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub current_medications: String,
}

/// Registry record for a screened patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub mrn: String,
    pub condition: String,
    pub last_visit: NaiveDate,
    pub next_appointment: Option<NaiveDate>,
    pub risk: RiskAssessment,
    pub biomarker_score: RiskScore,
    pub ct_image_score: RiskScore,
    pub contact: ContactDetails,
    pub notes: ClinicalNotes,
    pub biomarkers: BiomarkerPanel,
    pub prediction: Option<PredictionResponse>,
}

impl Patient {
    /// Case-insensitive substring match on name, MRN, or condition.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.name, &self.mrn, &self.condition]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Add-patient form exactly as captured, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientIntake {
    pub name: String,
    #[serde(deserialize_with = "number_or_text")]
    pub age: String,
    pub gender: String,
    pub mrn: String,
    pub condition: String,
    pub biomarkers: BiomarkerPanel,
    pub contact: ContactDetails,
    pub notes: ClinicalNotes,
}

/// Keeps the form's text semantics while accepting JSON numbers; anything
/// else is carried as text and left for `validate` to reject.
fn number_or_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    })
}

/// Intake after required fields and formats are checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIntake {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub mrn: Option<String>,
    pub condition: Option<String>,
    pub biomarkers: BiomarkerPanel,
    pub contact: ContactDetails,
    pub notes: ClinicalNotes,
}

impl ValidatedIntake {
    pub fn age_measurement(&self) -> Measurement {
        Measurement::Value(f64::from(self.age))
    }
}

const MAX_AGE: u8 = 130;

impl PatientIntake {
    pub fn validate(self) -> Result<ValidatedIntake, IntakeError> {
        let name = self.name.trim().to_string();
        let age = self.age.trim();
        let gender = self.gender.trim();

        let missing: Vec<&'static str> = [
            ("name", name.is_empty()),
            ("age", age.is_empty()),
            ("gender", gender.is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, blank)| blank.then_some(field))
        .collect();
        if !missing.is_empty() {
            return Err(IntakeError::MissingFields(missing));
        }

        let age = age
            .parse::<u8>()
            .ok()
            .filter(|age| *age <= MAX_AGE)
            .ok_or_else(|| IntakeError::InvalidAge(age.to_string()))?;
        let gender =
            Gender::parse(gender).ok_or_else(|| IntakeError::InvalidGender(gender.to_string()))?;

        let non_blank = |value: String| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        Ok(ValidatedIntake {
            name,
            age,
            gender,
            mrn: non_blank(self.mrn),
            condition: non_blank(self.condition),
            biomarkers: self.biomarkers,
            contact: self.contact,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("age must be a whole number between 0 and 130 (got '{0}')")]
    InvalidAge(String),
    #[error("gender must be Male, Female, or Other (got '{0}')")]
    InvalidGender(String),
}
