use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tabled::Tabled;

/// One data row keyed by the column names exactly as they appear in the file.
/// `None` marks a column the row was too short to fill.
pub type RawRow = HashMap<String, Option<String>>;

/// Canonical field names used for header matching and error reporting.
pub const FIELD_DATE: &str = "date";
pub const FIELD_PERSON: &str = "person";
pub const FIELD_MILES_RUN: &str = "miles run";

/// Column names of the source file that supply the three canonical fields.
///
/// Only constructible through header normalization, so holding one means every
/// required column was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    pub date: String,
    pub person: String,
    pub miles_run: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDateTime,
    pub person: String,
    pub distance: f64,
    pub source_row_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Missing,
    Invalid,
    TypeError,
}

/// A field-level problem. Row 0 is reserved for file and header failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub row: usize,
    pub field: String,
    pub value: String,
    pub message: String,
    pub kind: ErrorKind,
}

impl ValidationError {
    pub fn new(
        row: usize,
        field: &str,
        value: impl Into<String>,
        message: impl Into<String>,
        kind: ErrorKind,
    ) -> Self {
        Self {
            row,
            field: field.to_string(),
            value: value.into(),
            message: message.into(),
            kind,
        }
    }
}

/// Advisory data-quality notes. They never affect `ParseResult::success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataWarning {
    NoValidRecords,
    Duplicates(usize),
    FutureDates(usize),
    StaleRecords(usize),
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::NoValidRecords => write!(f, "No valid records found in CSV"),
            DataWarning::Duplicates(n) => write!(
                f,
                "Found {} duplicate entries (same person and date). All records will be included in calculations.",
                n
            ),
            DataWarning::FutureDates(n) => write!(f, "{} records have future dates", n),
            DataWarning::StaleRecords(n) => write!(f, "{} records are older than 1 year", n),
        }
    }
}

impl Serialize for DataWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub success: bool,
    pub data: Vec<Record>,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<DataWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub total_distance: f64,
    pub average_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub run_count: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonStats {
    pub person: String,
    pub metrics: Metrics,
    pub records: Vec<Record>,
    pub percentage_of_total: f64,
}

/// One calendar date of the time pivot. A person is absent from `distances`
/// when they have no record on that date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub iso_date: String,
    pub display_date: String,
    pub distances: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub overall_metrics: Metrics,
    pub person_stats: Vec<PersonStats>,
    pub chart_data: Vec<ChartPoint>,
    pub unique_people: Vec<String>,
    pub total_records: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PersonSummaryRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Person")]
    #[tabled(rename = "Person")]
    pub person: String,
    #[serde(rename = "TotalMiles")]
    #[tabled(rename = "TotalMiles")]
    pub total_miles: String,
    #[serde(rename = "AvgMiles")]
    #[tabled(rename = "AvgMiles")]
    pub avg_miles: String,
    #[serde(rename = "MinMiles")]
    #[tabled(rename = "MinMiles")]
    pub min_miles: String,
    #[serde(rename = "MaxMiles")]
    #[tabled(rename = "MaxMiles")]
    pub max_miles: String,
    #[serde(rename = "Runs")]
    #[tabled(rename = "Runs")]
    pub runs: usize,
    #[serde(rename = "ShareOfTotal")]
    #[tabled(rename = "ShareOfTotal")]
    pub share_of_total: String,
    #[serde(rename = "FirstRun")]
    #[tabled(rename = "FirstRun")]
    pub first_run: String,
    #[serde(rename = "LastRun")]
    #[tabled(rename = "LastRun")]
    pub last_run: String,
}

/// Flattened chart point: one cell per person in first-seen order, blank when
/// that person did not run on the date.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub date: String,
    pub display_date: String,
    pub cells: Vec<Option<f64>>,
}
