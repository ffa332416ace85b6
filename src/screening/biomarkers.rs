use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lab markers tracked on the screening panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BiomarkerKind {
    #[serde(rename = "CA 19-9", alias = "CA19-9", alias = "ca199", alias = "plasma_CA19_9")]
    Ca199,
    #[serde(rename = "Creatinine", alias = "creatinine")]
    Creatinine,
    #[serde(rename = "LYVE1", alias = "lyve1")]
    Lyve1,
    #[serde(rename = "REG1A", alias = "reg1a")]
    Reg1a,
    #[serde(rename = "REG1B", alias = "reg1b")]
    Reg1b,
    #[serde(rename = "TFF1", alias = "tff1")]
    Tff1,
}

impl BiomarkerKind {
    pub const ALL: [BiomarkerKind; 6] = [
        BiomarkerKind::Ca199,
        BiomarkerKind::Creatinine,
        BiomarkerKind::Lyve1,
        BiomarkerKind::Reg1a,
        BiomarkerKind::Reg1b,
        BiomarkerKind::Tff1,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BiomarkerKind::Ca199 => "CA 19-9",
            BiomarkerKind::Creatinine => "Creatinine",
            BiomarkerKind::Lyve1 => "LYVE1",
            BiomarkerKind::Reg1a => "REG1A",
            BiomarkerKind::Reg1b => "REG1B",
            BiomarkerKind::Tff1 => "TFF1",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            BiomarkerKind::Ca199 => "U/mL",
            BiomarkerKind::Creatinine => "mg/dL",
            BiomarkerKind::Lyve1
            | BiomarkerKind::Reg1a
            | BiomarkerKind::Reg1b
            | BiomarkerKind::Tff1 => "ng/mL",
        }
    }

    /// Field name used by the prediction service payload.
    pub fn field_name(self) -> &'static str {
        match self {
            BiomarkerKind::Ca199 => "plasma_CA19_9",
            BiomarkerKind::Creatinine => "creatinine",
            BiomarkerKind::Lyve1 => "LYVE1",
            BiomarkerKind::Reg1a => "REG1A",
            BiomarkerKind::Reg1b => "REG1B",
            BiomarkerKind::Tff1 => "TFF1",
        }
    }

    pub fn reference_range(self) -> ReferenceRange {
        let (lower, upper) = match self {
            BiomarkerKind::Ca199 => (0.0, 37.0),
            BiomarkerKind::Creatinine => (0.7, 1.3),
            BiomarkerKind::Lyve1 => (3.0, 12.0),
            BiomarkerKind::Reg1a => (120.0, 580.0),
            BiomarkerKind::Reg1b => (85.0, 420.0),
            BiomarkerKind::Tff1 => (45.0, 220.0),
        };
        ReferenceRange { lower, upper }
    }

    pub fn thresholds(self) -> Thresholds {
        match self {
            BiomarkerKind::Ca199 => Thresholds::upper(100.0, 37.0),
            BiomarkerKind::Creatinine => Thresholds {
                high: 1.5,
                moderate: 1.3,
                low: Some(0.6),
            },
            BiomarkerKind::Lyve1 => Thresholds::upper(15.0, 10.0),
            BiomarkerKind::Reg1a => Thresholds::upper(800.0, 500.0),
            BiomarkerKind::Reg1b => Thresholds::upper(600.0, 400.0),
            BiomarkerKind::Tff1 => Thresholds::upper(300.0, 200.0),
        }
    }
}

impl fmt::Display for BiomarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown biomarker '{0}'")]
pub struct UnknownBiomarker(pub String);

impl FromStr for BiomarkerKind {
    type Err = UnknownBiomarker;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let compact: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "ca199" | "plasmaca199" => Ok(BiomarkerKind::Ca199),
            "creatinine" => Ok(BiomarkerKind::Creatinine),
            "lyve1" => Ok(BiomarkerKind::Lyve1),
            "reg1a" => Ok(BiomarkerKind::Reg1a),
            "reg1b" => Ok(BiomarkerKind::Reg1b),
            "tff1" => Ok(BiomarkerKind::Tff1),
            _ => Err(UnknownBiomarker(raw.to_string())),
        }
    }
}

/// Published reference interval shown next to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceRange {
    pub lower: f64,
    pub upper: f64,
}

impl fmt::Display for ReferenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lower, self.upper)
    }
}

/// Cut points for one marker. High and moderate fire on strictly greater values,
/// low on strictly smaller ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub high: f64,
    pub moderate: f64,
    pub low: Option<f64>,
}

impl Thresholds {
    const fn upper(high: f64, moderate: f64) -> Self {
        Self {
            high,
            moderate,
            low: None,
        }
    }
}

/// A lab value after normalization. Anything that is not a finite number is
/// `NotAvailable`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Measurement {
    Value(f64),
    #[default]
    NotAvailable,
}

impl Measurement {
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<f64>()
            .map(Measurement::from)
            .unwrap_or(Measurement::NotAvailable)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Measurement::Value(value) => Some(value),
            Measurement::NotAvailable => None,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Measurement::Value(_))
    }
}

impl From<f64> for Measurement {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Measurement::Value(value)
        } else {
            Measurement::NotAvailable
        }
    }
}

impl From<Option<f64>> for Measurement {
    fn from(value: Option<f64>) -> Self {
        value.map(Measurement::from).unwrap_or_default()
    }
}

impl From<&str> for Measurement {
    fn from(raw: &str) -> Self {
        Measurement::parse(raw)
    }
}

impl From<&String> for Measurement {
    fn from(raw: &String) -> Self {
        Measurement::parse(raw)
    }
}

impl From<Option<&str>> for Measurement {
    fn from(raw: Option<&str>) -> Self {
        raw.map(Measurement::parse).unwrap_or_default()
    }
}

impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Measurement::Value(value) => serializer.serialize_f64(*value),
            Measurement::NotAvailable => serializer.serialize_none(),
        }
    }
}

/// Accepts numbers, numeric strings, blanks and nulls; never rejects the payload.
///
/// Numbers go through `serde_json::Number` so out-of-range literals such as
/// `1e400` become `NotAvailable` instead of a parse error.
impl<'de> Deserialize<'de> for Measurement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(number) => Measurement::from(number.as_f64()),
            serde_json::Value::String(text) => Measurement::parse(&text),
            _ => Measurement::NotAvailable,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomarkerStatus {
    Elevated,
    Normal,
    Low,
}

impl BiomarkerStatus {
    pub fn label(self) -> &'static str {
        match self {
            BiomarkerStatus::Elevated => "Elevated",
            BiomarkerStatus::Normal => "Normal",
            BiomarkerStatus::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Moderate,
    High,
    Low,
}

/// Result of checking one value against its marker's cut points.
///
/// `measured` is false for the neutral default given to missing or unparseable
/// input; such a result is not a clinical "normal" finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiomarkerClassification {
    pub status: BiomarkerStatus,
    pub severity: Severity,
    pub measured: bool,
}

impl BiomarkerClassification {
    const fn measured(status: BiomarkerStatus, severity: Severity) -> Self {
        Self {
            status,
            severity,
            measured: true,
        }
    }

    pub const NOT_AVAILABLE: Self = Self {
        status: BiomarkerStatus::Normal,
        severity: Severity::Normal,
        measured: false,
    };
}

pub fn classify_biomarker(
    kind: BiomarkerKind,
    raw: impl Into<Measurement>,
) -> BiomarkerClassification {
    let value = match raw.into() {
        Measurement::Value(value) => value,
        Measurement::NotAvailable => return BiomarkerClassification::NOT_AVAILABLE,
    };

    let thresholds = kind.thresholds();
    if value > thresholds.high {
        return BiomarkerClassification::measured(BiomarkerStatus::Elevated, Severity::High);
    }
    if value > thresholds.moderate {
        return BiomarkerClassification::measured(BiomarkerStatus::Elevated, Severity::Moderate);
    }
    if thresholds.low.is_some_and(|low| value < low) {
        return BiomarkerClassification::measured(BiomarkerStatus::Low, Severity::Low);
    }
    BiomarkerClassification::measured(BiomarkerStatus::Normal, Severity::Normal)
}

/// One lab measurement as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerReading {
    pub kind: BiomarkerKind,
    pub measurement: Measurement,
}

impl BiomarkerReading {
    pub fn new(kind: BiomarkerKind, measurement: impl Into<Measurement>) -> Self {
        Self {
            kind,
            measurement: measurement.into(),
        }
    }

    pub fn classify(&self) -> ClassifiedBiomarker {
        ClassifiedBiomarker {
            kind: self.kind,
            name: self.kind.label(),
            value: self.measurement.value(),
            unit: self.kind.unit(),
            reference_range: self.kind.reference_range().to_string(),
            classification: classify_biomarker(self.kind, self.measurement),
        }
    }
}

/// Display descriptor derived from a reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedBiomarker {
    pub kind: BiomarkerKind,
    pub name: &'static str,
    pub value: Option<f64>,
    pub unit: &'static str,
    pub reference_range: String,
    #[serde(flatten)]
    pub classification: BiomarkerClassification,
}

/// The biomarker bag attached to a patient; every marker is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BiomarkerPanel {
    #[serde(default, alias = "plasma_CA19_9")]
    pub ca199: Measurement,
    #[serde(default)]
    pub creatinine: Measurement,
    #[serde(default, alias = "LYVE1")]
    pub lyve1: Measurement,
    #[serde(default, alias = "REG1A")]
    pub reg1a: Measurement,
    #[serde(default, alias = "REG1B")]
    pub reg1b: Measurement,
    #[serde(default, alias = "TFF1")]
    pub tff1: Measurement,
}

impl BiomarkerPanel {
    pub fn get(&self, kind: BiomarkerKind) -> Measurement {
        match kind {
            BiomarkerKind::Ca199 => self.ca199,
            BiomarkerKind::Creatinine => self.creatinine,
            BiomarkerKind::Lyve1 => self.lyve1,
            BiomarkerKind::Reg1a => self.reg1a,
            BiomarkerKind::Reg1b => self.reg1b,
            BiomarkerKind::Tff1 => self.tff1,
        }
    }

    pub fn with(mut self, kind: BiomarkerKind, measurement: impl Into<Measurement>) -> Self {
        let measurement = measurement.into();
        match kind {
            BiomarkerKind::Ca199 => self.ca199 = measurement,
            BiomarkerKind::Creatinine => self.creatinine = measurement,
            BiomarkerKind::Lyve1 => self.lyve1 = measurement,
            BiomarkerKind::Reg1a => self.reg1a = measurement,
            BiomarkerKind::Reg1b => self.reg1b = measurement,
            BiomarkerKind::Tff1 => self.tff1 = measurement,
        }
        self
    }

    pub fn readings(&self) -> impl Iterator<Item = BiomarkerReading> + '_ {
        BiomarkerKind::ALL
            .into_iter()
            .map(|kind| BiomarkerReading::new(kind, self.get(kind)))
    }

    pub fn missing(&self) -> Vec<BiomarkerKind> {
        BiomarkerKind::ALL
            .into_iter()
            .filter(|kind| !self.get(*kind).is_available())
            .collect()
    }

    pub fn classify(&self) -> PanelClassification {
        let markers: Vec<ClassifiedBiomarker> =
            self.readings().map(|reading| reading.classify()).collect();
        let summary = PanelSummary::tally(&markers);
        PanelClassification { markers, summary }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelClassification {
    pub markers: Vec<ClassifiedBiomarker>,
    pub summary: PanelSummary,
}

/// Counts used by the panel footer. Unmeasured markers are counted apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PanelSummary {
    pub normal: usize,
    pub low: usize,
    pub elevated: usize,
    pub not_available: usize,
}

impl PanelSummary {
    fn tally(markers: &[ClassifiedBiomarker]) -> Self {
        markers
            .iter()
            .fold(PanelSummary::default(), |mut summary, marker| {
                let classification = marker.classification;
                if !classification.measured {
                    summary.not_available += 1;
                    return summary;
                }
                match classification.status {
                    BiomarkerStatus::Normal => summary.normal += 1,
                    BiomarkerStatus::Low => summary.low += 1,
                    BiomarkerStatus::Elevated => summary.elevated += 1,
                }
                summary
            })
    }
}
