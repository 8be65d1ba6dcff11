use crate::error::LoadError;
use crate::types::{ErrorKind, ParseResult, RawRow, ValidationError};
use crate::validator::{generate_warnings, normalize_headers, validate_row};
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const ACCEPTED_EXTENSIONS: [&str; 2] = ["csv", "txt"];

/// Gate applied before a file is handed to the parser: accepted extension,
/// non-empty, under the size ceiling. Returns the file size.
pub fn check_file(path: &Path) -> Result<u64, LoadError> {
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ACCEPTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !ext_ok {
        return Err(LoadError::UnsupportedExtension {
            path: path.to_path_buf(),
        });
    }
    let size = std::fs::metadata(path)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > MAX_FILE_SIZE {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size,
        });
    }
    if size == 0 {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(size)
}

fn file_failure(source_name: &str, cause: impl Display) -> ParseResult {
    warn!(source = source_name, "CSV could not be read: {}", cause);
    ParseResult {
        success: false,
        data: Vec::new(),
        errors: vec![ValidationError::new(
            0,
            "file",
            source_name,
            format!("Failed to parse CSV: {}", cause),
            ErrorKind::Invalid,
        )],
        warnings: Vec::new(),
    }
}

fn decode_cell(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Run the whole validation pipeline over a delimited text stream.
///
/// Header problems stop the run before any row is looked at. Row problems
/// are collected and never stop later rows. Cells that are not valid UTF-8
/// are decoded with replacement characters and validated like any other.
/// Only reader failures (I/O, malformed CSV) discard everything and report a
/// single file-level error.
pub fn parse_csv_reader<R: Read>(reader: R, source_name: &str) -> ParseResult {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = match rdr.byte_headers() {
        Ok(h) if !h.is_empty() => h.iter().map(decode_cell).collect(),
        Ok(_) => return file_failure(source_name, "no header row found"),
        Err(e) => return file_failure(source_name, e),
    };

    let header_map = match normalize_headers(&headers) {
        Ok(map) => map,
        Err(messages) => {
            warn!(source = source_name, missing = messages.len(), "required headers missing");
            let value = headers.join(", ");
            let errors = messages
                .into_iter()
                .map(|m| ValidationError::new(0, "headers", value.clone(), m, ErrorKind::Invalid))
                .collect();
            return ParseResult {
                success: false,
                data: Vec::new(),
                errors,
                warnings: Vec::new(),
            };
        }
    };

    let mut data = Vec::new();
    let mut errors = Vec::new();

    for (i, result) in rdr.byte_records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => return file_failure(source_name, e),
        };
        let row_index = i + 1;

        let mut raw = RawRow::with_capacity(headers.len());
        for (col, name) in headers.iter().enumerate() {
            raw.entry(name.clone())
                .or_insert_with(|| record.get(col).map(decode_cell));
        }

        let outcome = validate_row(&raw, row_index, &header_map);
        if !outcome.errors.is_empty() {
            debug!(row = row_index, errors = outcome.errors.len(), "row rejected");
        }
        if let Some(rec) = outcome.record {
            data.push(rec);
        }
        errors.extend(outcome.errors);
    }

    let warnings = generate_warnings(&data);
    info!(
        source = source_name,
        records = data.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "CSV parsed"
    );

    ParseResult {
        success: errors.is_empty(),
        data,
        errors,
        warnings,
    }
}

pub fn parse_csv_str(text: &str) -> ParseResult {
    parse_csv_reader(text.as_bytes(), "input")
}

pub fn parse_csv_file(path: &Path) -> ParseResult {
    let name = path.display().to_string();
    match File::open(path) {
        Ok(f) => parse_csv_reader(f, &name),
        Err(e) => file_failure(&name, e),
    }
}

/// Render errors one line per row, rows ascending. File and header problems
/// (row 0) become a single `;`-joined line.
pub fn format_errors(errors: &[ValidationError]) -> Vec<String> {
    let mut by_row: BTreeMap<usize, Vec<&ValidationError>> = BTreeMap::new();
    for e in errors {
        by_row.entry(e.row).or_default().push(e);
    }
    by_row
        .into_iter()
        .map(|(row, errs)| {
            if row == 0 {
                errs.iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            } else {
                let parts = errs
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Row {}: {}", row, parts)
            }
        })
        .collect()
}
