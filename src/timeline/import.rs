use super::domain::{RawContractRecord, RawValue};
use super::sanitize::{sanitize_records, SanitizeOutcome};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug)]
pub enum TimelineImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for TimelineImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimelineImportError::Io(err) => write!(f, "failed to read contract export: {}", err),
            TimelineImportError::Csv(err) => write!(f, "invalid contract CSV data: {}", err),
        }
    }
}

impl std::error::Error for TimelineImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimelineImportError::Io(err) => Some(err),
            TimelineImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for TimelineImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TimelineImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads a contract export with `DNI`, `CATEGORIA`, `Falta`, `Fbaja` columns
/// and hands the rows to the sanitizer. This is the only place that touches
/// the export's column names; everything downstream works on sanitized
/// intervals.
pub struct ContractCsvImporter;

impl ContractCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SanitizeOutcome, TimelineImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<SanitizeOutcome, TimelineImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records: Vec<RawContractRecord> = Vec::new();
        for row in csv_reader.deserialize::<ContractRow>() {
            records.push(row?.into_raw());
        }

        let outcome = sanitize_records(records);
        if outcome.rejected_count() > 0 {
            warn!(
                rejected = outcome.rejected_count(),
                "dropped malformed contract rows"
            );
        }
        info!(contracts = outcome.intervals.len(), "imported contract records");

        Ok(outcome)
    }
}

#[derive(Debug, Deserialize)]
struct ContractRow {
    #[serde(rename = "DNI", default, deserialize_with = "empty_string_as_none")]
    dni: Option<String>,
    #[serde(rename = "CATEGORIA", default, deserialize_with = "empty_string_as_none")]
    categoria: Option<String>,
    #[serde(rename = "Falta", default, deserialize_with = "empty_string_as_none")]
    falta: Option<String>,
    #[serde(rename = "Fbaja", default, deserialize_with = "empty_string_as_none")]
    fbaja: Option<String>,
}

impl ContractRow {
    fn into_raw(self) -> RawContractRecord {
        RawContractRecord {
            person_id: raw_value(self.dni),
            category: raw_value(self.categoria),
            start: raw_value(self.falta),
            end: raw_value(self.fbaja),
        }
    }
}

/// Cells that look like bare numbers are kept numeric so spreadsheet serial
/// dates survive the CSV round trip; everything else stays text.
fn raw_value(field: Option<String>) -> RawValue {
    match field {
        None => RawValue::Missing,
        Some(text) => match text.trim().parse::<f64>() {
            Ok(number) => RawValue::Number(number),
            Err(_) => RawValue::Text(text),
        },
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
