use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::biomarkers::{BiomarkerPanel, Measurement};
use super::prediction::Sex;

/// Raw CSV row using the prediction-service column names.
#[derive(Debug, Deserialize)]
struct PanelRow {
    #[serde(default)]
    sample_id: Option<String>,
    #[serde(default)]
    age: Option<String>,
    #[serde(default)]
    sex: Option<String>,
    #[serde(rename = "plasma_CA19_9", default)]
    ca199: Option<String>,
    #[serde(default)]
    creatinine: Option<String>,
    #[serde(rename = "LYVE1", default)]
    lyve1: Option<String>,
    #[serde(rename = "REG1A", default)]
    reg1a: Option<String>,
    #[serde(rename = "REG1B", default)]
    reg1b: Option<String>,
    #[serde(rename = "TFF1", default)]
    tff1: Option<String>,
}

/// One imported sample ready for classification.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRecord {
    pub sample_id: String,
    pub age: Measurement,
    pub sex: Option<Sex>,
    pub panel: BiomarkerPanel,
}

impl PanelRow {
    fn into_record(self, line: usize) -> PanelRecord {
        let measure = |cell: Option<String>| Measurement::from(cell.as_deref());
        PanelRecord {
            sample_id: self
                .sample_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("row-{line}")),
            age: measure(self.age),
            sex: self.sex.as_deref().and_then(Sex::parse),
            panel: BiomarkerPanel {
                ca199: measure(self.ca199),
                creatinine: measure(self.creatinine),
                lyve1: measure(self.lyve1),
                reg1a: measure(self.reg1a),
                reg1b: measure(self.reg1b),
                tff1: measure(self.tff1),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PanelImportError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid panel CSV at record {record}: {source}")]
    Csv {
        record: usize,
        #[source]
        source: csv::Error,
    },
}

pub fn read_panels<R: Read>(reader: R) -> Result<Vec<PanelRecord>, PanelImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    csv_reader
        .deserialize::<PanelRow>()
        .enumerate()
        .map(|(index, row)| {
            let record = index + 1;
            row.map(|row| row.into_record(record))
                .map_err(|source| PanelImportError::Csv { record, source })
        })
        .collect()
}

pub fn read_panels_from_path(path: impl AsRef<Path>) -> Result<Vec<PanelRecord>, PanelImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PanelImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_panels(file)
}
