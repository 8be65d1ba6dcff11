use std::path::PathBuf;

use thiserror::Error;

/// Reasons a file is turned away before the pipeline reads it.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Please upload a CSV file (.csv extension): {path}")]
    UnsupportedExtension { path: PathBuf },

    #[error("File size must be less than 10MB ({size} bytes): {path}")]
    TooLarge { path: PathBuf, size: u64 },

    #[error("File is empty: {path}")]
    Empty { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV write error for {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON encode error for {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
