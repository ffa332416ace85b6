use chrono::NaiveDate;

use super::domain::{ClinicalNotes, ContactDetails, Gender, Patient, PatientId};
use crate::screening::{AssessmentSource, BiomarkerPanel, Measurement, RiskAssessment, RiskScore};

struct SeedRow {
    id: &'static str,
    name: &'static str,
    age: u8,
    gender: Gender,
    mrn: &'static str,
    last_visit: (i32, u32, u32),
    risk_score: i64,
    biomarker_score: i64,
    ct_image_score: i64,
    condition: &'static str,
    next_appointment: Option<(i32, u32, u32)>,
    biomarkers: BiomarkerPanel,
}

const NO_PANEL: BiomarkerPanel = BiomarkerPanel {
    ca199: Measurement::NotAvailable,
    creatinine: Measurement::NotAvailable,
    lyve1: Measurement::NotAvailable,
    reg1a: Measurement::NotAvailable,
    reg1b: Measurement::NotAvailable,
    tff1: Measurement::NotAvailable,
};

const SEED_ROWS: [SeedRow; 5] = [
    SeedRow {
        id: "P001",
        name: "Sarah Johnson",
        age: 58,
        gender: Gender::Female,
        mrn: "MRN-789456123",
        last_visit: (2024, 1, 15),
        risk_score: 75,
        biomarker_score: 65,
        ct_image_score: 78,
        condition: "Pancreatic Mass",
        next_appointment: Some((2024, 2, 2)),
        biomarkers: BiomarkerPanel {
            ca199: Measurement::Value(125.0),
            ..NO_PANEL
        },
    },
    SeedRow {
        id: "P002",
        name: "Michael Chen",
        age: 62,
        gender: Gender::Male,
        mrn: "MRN-456789012",
        last_visit: (2024, 1, 12),
        risk_score: 55,
        biomarker_score: 50,
        ct_image_score: 60,
        condition: "Chronic Pancreatitis",
        next_appointment: Some((2024, 1, 28)),
        biomarkers: NO_PANEL,
    },
    SeedRow {
        id: "P003",
        name: "Emily Rodriguez",
        age: 45,
        gender: Gender::Female,
        mrn: "MRN-123456789",
        last_visit: (2024, 1, 10),
        risk_score: 25,
        biomarker_score: 20,
        ct_image_score: 30,
        condition: "Routine Screening",
        next_appointment: Some((2024, 3, 10)),
        biomarkers: NO_PANEL,
    },
    SeedRow {
        id: "P004",
        name: "David Thompson",
        age: 71,
        gender: Gender::Male,
        mrn: "MRN-987654321",
        last_visit: (2024, 1, 8),
        risk_score: 85,
        biomarker_score: 80,
        ct_image_score: 90,
        condition: "Pancreatic Adenocarcinoma",
        next_appointment: Some((2024, 1, 22)),
        biomarkers: NO_PANEL,
    },
    SeedRow {
        id: "P005",
        name: "Lisa Wang",
        age: 39,
        gender: Gender::Female,
        mrn: "MRN-555666777",
        last_visit: (2024, 1, 5),
        risk_score: 45,
        biomarker_score: 40,
        ct_image_score: 50,
        condition: "Family History Screening",
        next_appointment: None,
        biomarkers: NO_PANEL,
    },
];

fn date((year, month, day): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Demo roster loaded at startup, in display order.
pub fn mock_patients() -> Vec<Patient> {
    SEED_ROWS
        .iter()
        .filter_map(|row| {
            Some(Patient {
                id: PatientId(row.id.to_string()),
                name: row.name.to_string(),
                age: row.age,
                gender: row.gender,
                mrn: row.mrn.to_string(),
                condition: row.condition.to_string(),
                last_visit: date(row.last_visit)?,
                next_appointment: row.next_appointment.and_then(date),
                risk: RiskAssessment::new(
                    RiskScore::new(row.risk_score),
                    AssessmentSource::ExternalModel,
                ),
                biomarker_score: RiskScore::new(row.biomarker_score),
                ct_image_score: RiskScore::new(row.ct_image_score),
                contact: ContactDetails::default(),
                notes: ClinicalNotes::default(),
                biomarkers: row.biomarkers,
                prediction: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_seed_row_becomes_a_patient() {
        let patients = mock_patients();

        assert_eq!(patients.len(), SEED_ROWS.len());
        for (patient, row) in patients.iter().zip(SEED_ROWS.iter()) {
            assert_eq!(patient.id.0, row.id);
            assert_eq!(
                patient.next_appointment.is_some(),
                row.next_appointment.is_some()
            );
        }
    }

    #[test]
    fn only_first_patient_carries_a_panel() {
        let measured: Vec<_> = mock_patients()
            .into_iter()
            .filter(|patient| patient.biomarkers != BiomarkerPanel::default())
            .map(|patient| patient.id.0)
            .collect();

        assert_eq!(measured, vec!["P001".to_string()]);
    }
}
