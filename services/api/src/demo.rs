use crate::infra::{ConfiguredPredictionClient, InMemoryPatientRepository};
use clap::Args;
use pancscreen::config::AppConfig;
use pancscreen::error::AppError;
use pancscreen::patients::{Patient, PatientService};
use pancscreen::screening::{
    compute_fallback_risk_score, read_panels_from_path, AssessmentSource, BiomarkerKind,
    BiomarkerPanel, BiomarkerReading, BiomarkerStatus, ClassifiedBiomarker,
    DisabledPredictionClient, Measurement, PanelRecord, PredictionClient, RiskAssessment,
    RiskAssessor,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Biomarker name, e.g. "CA 19-9", creatinine, LYVE1
    #[arg(long)]
    pub(crate) biomarker: String,
    /// Measured value; leave blank or use "N/A" when not measured
    #[arg(long, default_value = "")]
    pub(crate) value: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// CA 19-9 in U/mL
    #[arg(long)]
    pub(crate) ca199: Option<String>,
    /// Creatinine in mg/dL
    #[arg(long)]
    pub(crate) creatinine: Option<String>,
    /// Patient age in years
    #[arg(long)]
    pub(crate) age: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct PatientsArgs {
    /// Filter by name, MRN or condition
    #[arg(long)]
    pub(crate) query: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export using the prediction service column names
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let kind: BiomarkerKind = args.biomarker.parse()?;
    let classified = BiomarkerReading::new(kind, args.value.as_str()).classify();
    render_biomarker(&classified);
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let measure = |raw: &Option<String>| Measurement::from(raw.as_deref());
    let score = compute_fallback_risk_score(
        measure(&args.ca199),
        measure(&args.creatinine),
        measure(&args.age),
    );
    let assessment = RiskAssessment::new(score, AssessmentSource::LocalFallback);

    println!("Fallback risk score: {}/100", assessment.risk_score);
    println!(
        "Risk level: {} ({})",
        assessment.risk_level.label(),
        assessment.risk_level.description()
    );
    Ok(())
}

pub(crate) fn run_patients(args: PatientsArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryPatientRepository::seeded());
    let service = PatientService::new(
        repository,
        RiskAssessor::new(Arc::new(DisabledPredictionClient)),
    );

    let patients = service.list(args.query.as_deref())?;
    if patients.is_empty() {
        println!("No patients match");
        return Ok(());
    }

    println!("Patients ({})", patients.len());
    for patient in &patients {
        render_patient_row(patient);
    }
    Ok(())
}

pub(crate) async fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let client = ConfiguredPredictionClient::from_config(&config.prediction)?;
    println!("Prediction service: {}", client.describe());

    let records = read_panels_from_path(&args.csv)?;
    let assessor = RiskAssessor::new(Arc::new(client));
    render_batch(&assessor, &records).await;
    Ok(())
}

async fn render_batch<P>(assessor: &RiskAssessor<P>, records: &[PanelRecord])
where
    P: PredictionClient + 'static,
{
    println!("Assessed {} sample(s)", records.len());
    for record in records {
        let outcome = assessor.assess(record.age, record.sex, &record.panel).await;
        let summary = record.panel.classify().summary;
        println!(
            "- {}: {} {} via {:?} | {} elevated, {} low, {} normal, {} n/a",
            record.sample_id,
            outcome.assessment.risk_score,
            outcome.assessment.risk_level.label(),
            outcome.assessment.source,
            summary.elevated,
            summary.low,
            summary.normal,
            summary.not_available,
        );
        render_elevated(&record.panel);
    }
}

fn render_elevated(panel: &BiomarkerPanel) {
    for marker in panel.classify().markers {
        if marker.classification.measured && marker.classification.status != BiomarkerStatus::Normal {
            print!("    ");
            render_biomarker(&marker);
        }
    }
}

fn render_biomarker(marker: &ClassifiedBiomarker) {
    let value = marker
        .value
        .map(|value| format!("{value} {}", marker.unit))
        .unwrap_or_else(|| "N/A".to_string());
    println!(
        "{}: {} | {} ({:?}) | reference {} {}",
        marker.name,
        value,
        marker.classification.status.label(),
        marker.classification.severity,
        marker.reference_range,
        marker.unit,
    );
}

fn render_patient_row(patient: &Patient) {
    let next = patient
        .next_appointment
        .map(|date| date.to_string())
        .unwrap_or_else(|| "not scheduled".to_string());
    println!(
        "  {} {:<18} {:>3} {:<6} {} | {:<26} | risk {:>3} {:<13} | last visit {} | next {}",
        patient.id,
        patient.name,
        patient.age,
        patient.gender.label(),
        patient.mrn,
        patient.condition,
        patient.risk.risk_score,
        patient.risk.risk_level.label(),
        patient.last_visit,
        next,
    );
}
