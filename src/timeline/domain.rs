use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Canonical width of a normalized person identifier.
pub const PERSON_ID_WIDTH: usize = 9;

/// Longest plausible contract, in days. Anything above this is treated as a
/// data-entry error and rejected.
pub const MAX_DURATION_DAYS: i64 = 10_000;

/// One validated employment contract record. Built once by the sanitizer and
/// never mutated afterwards; filtering produces new subsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub person_id: String,
    pub category: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration_days: i64,
}

/// A single field of a raw record before validation. Source exports carry no
/// reliable types: dates arrive as text, spreadsheet serial numbers, or real
/// date values depending on the tool that produced the file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Missing,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

/// An unvalidated contract row as handed over by an ingestion edge.
#[derive(Debug, Clone)]
pub struct RawContractRecord {
    pub person_id: RawValue,
    pub category: RawValue,
    pub start: RawValue,
    pub end: RawValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RawField {
    PersonId,
    Category,
    Start,
    End,
}

impl RawField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonId => "person id",
            Self::Category => "category",
            Self::Start => "start date",
            Self::End => "end date",
        }
    }
}

/// Why a raw record was dropped. Rejection is always whole-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RejectReason {
    Missing { field: RawField },
    Unparseable { field: RawField },
    NegativeDuration { days: i64 },
    ExcessiveDuration { days: i64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Missing { field } => write!(f, "missing {}", field.label()),
            RejectReason::Unparseable { field } => write!(f, "unparseable {}", field.label()),
            RejectReason::NegativeDuration { days } => {
                write!(f, "end date precedes start date ({} days)", days)
            }
            RejectReason::ExcessiveDuration { days } => {
                write!(
                    f,
                    "duration of {} days exceeds the {} day cap",
                    days, MAX_DURATION_DAYS
                )
            }
        }
    }
}

/// Diagnostic for one dropped input row. `row` is 1-based and refers to the
/// record's position in the ingested batch.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRecord {
    pub row: usize,
    pub reason: RejectReason,
}

impl fmt::Display for RejectedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}
