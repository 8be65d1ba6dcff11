// Header matching, per-row validation and the post-parse data-quality pass.
use crate::types::{
    DataWarning, ErrorKind, HeaderMap, RawRow, Record, ValidationError, FIELD_DATE,
    FIELD_MILES_RUN, FIELD_PERSON,
};
use crate::util::{parse_date_flexible, parse_distance};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;

/// Largest distance (miles) accepted for a single run.
pub const MAX_DISTANCE: f64 = 200.0;

const REQUIRED_FIELDS: [&str; 3] = [FIELD_DATE, FIELD_PERSON, FIELD_MILES_RUN];

/// Number of stale records tolerated before a warning is raised.
const STALE_WARNING_THRESHOLD: usize = 10;

fn header_matches(raw: &str, field: &str) -> bool {
    let h = raw.trim().to_lowercase();
    h == field || h == field.replace(' ', "_")
}

/// Resolve the canonical columns from the header line.
///
/// Matching ignores case and surrounding whitespace and treats `_` and a
/// space as the same separator. The first matching header wins, and the map
/// keeps the header exactly as written. On failure, returns one message per
/// missing field in `date`, `person`, `miles run` order.
pub fn normalize_headers(headers: &[String]) -> Result<HeaderMap, Vec<String>> {
    let mut found: [Option<&String>; 3] = [None; 3];
    for (slot, field) in found.iter_mut().zip(REQUIRED_FIELDS) {
        *slot = headers.iter().find(|h| header_matches(h, field));
    }

    match found {
        [Some(date), Some(person), Some(miles_run)] => Ok(HeaderMap {
            date: date.clone(),
            person: person.clone(),
            miles_run: miles_run.clone(),
        }),
        _ => Err(found
            .iter()
            .zip(REQUIRED_FIELDS)
            .filter(|(slot, _)| slot.is_none())
            .map(|(_, field)| format!("Missing required header: \"{}\"", field))
            .collect()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub record: Option<Record>,
    pub errors: Vec<ValidationError>,
}

fn cell<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    row.get(column)
        .and_then(|v| v.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Validate a single data row (1-based, header excluded).
///
/// Every field is checked and every problem reported; a `Record` comes back
/// only when the row is clean.
pub fn validate_row(row: &RawRow, row_index: usize, headers: &HeaderMap) -> RowOutcome {
    let mut errors = Vec::new();

    let date_str = cell(row, &headers.date);
    let person = cell(row, &headers.person);
    let miles_str = cell(row, &headers.miles_run);

    let date = match date_str {
        None => {
            errors.push(ValidationError::new(
                row_index,
                FIELD_DATE,
                "",
                "Date is required",
                ErrorKind::Missing,
            ));
            None
        }
        Some(s) => {
            let parsed = parse_date_flexible(s);
            if parsed.is_none() {
                errors.push(ValidationError::new(
                    row_index,
                    FIELD_DATE,
                    s,
                    "Invalid date format. Expected: YYYY-MM-DD or MM/DD/YYYY",
                    ErrorKind::Invalid,
                ));
            }
            parsed
        }
    };

    if person.is_none() {
        errors.push(ValidationError::new(
            row_index,
            FIELD_PERSON,
            "",
            "Person name is required",
            ErrorKind::Missing,
        ));
    }

    let distance = match miles_str {
        None => {
            errors.push(ValidationError::new(
                row_index,
                FIELD_MILES_RUN,
                "",
                "Miles run is required",
                ErrorKind::Missing,
            ));
            None
        }
        Some(s) => match parse_distance(s) {
            None => {
                errors.push(ValidationError::new(
                    row_index,
                    FIELD_MILES_RUN,
                    s,
                    "Miles must be a valid number",
                    ErrorKind::TypeError,
                ));
                None
            }
            Some(v) if v < 0.0 => {
                errors.push(ValidationError::new(
                    row_index,
                    FIELD_MILES_RUN,
                    s,
                    "Miles cannot be negative",
                    ErrorKind::Invalid,
                ));
                None
            }
            Some(v) if v > MAX_DISTANCE => {
                // Blocks the record even though the wording reads as advisory.
                errors.push(ValidationError::new(
                    row_index,
                    FIELD_MILES_RUN,
                    s,
                    "Miles seems unusually high (>200). Please verify.",
                    ErrorKind::Invalid,
                ));
                None
            }
            Some(v) => Some(v),
        },
    };

    let record = match (date, person, distance) {
        (Some(date), Some(person), Some(distance)) if errors.is_empty() => Some(Record {
            date,
            person: person.to_string(),
            distance,
            source_row_index: row_index,
        }),
        _ => None,
    };

    RowOutcome { record, errors }
}

/// Data-quality pass over the accepted records, using the local clock.
pub fn generate_warnings(records: &[Record]) -> Vec<DataWarning> {
    generate_warnings_at(records, Local::now().naive_local())
}

/// Same as [`generate_warnings`] with an explicit "now".
pub fn generate_warnings_at(records: &[Record], now: NaiveDateTime) -> Vec<DataWarning> {
    if records.is_empty() {
        return vec![DataWarning::NoValidRecords];
    }

    let mut warnings = Vec::new();

    let mut groups: HashMap<(&str, NaiveDate), usize> = HashMap::new();
    for r in records {
        *groups.entry((r.person.as_str(), r.date.date())).or_insert(0) += 1;
    }
    let duplicate_groups = groups.values().filter(|n| **n > 1).count();
    if duplicate_groups > 0 {
        warnings.push(DataWarning::Duplicates(duplicate_groups));
    }

    let future = records.iter().filter(|r| r.date > now).count();
    if future > 0 {
        warnings.push(DataWarning::FutureDates(future));
    }

    // Same month/day one year back; Feb 29 rolls forward to Mar 1.
    let today = now.date();
    let cutoff = today
        .with_year(today.year() - 1)
        .or_else(|| NaiveDate::from_ymd_opt(today.year() - 1, 3, 1))
        .map(|d| d.and_time(NaiveTime::MIN));
    if let Some(cutoff) = cutoff {
        let stale = records.iter().filter(|r| r.date < cutoff).count();
        if stale > STALE_WARNING_THRESHOLD {
            warnings.push(DataWarning::StaleRecords(stale));
        }
    }

    warnings
}
