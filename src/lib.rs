//! Validation and aggregation pipeline for `(date, person, miles run)` CSV files.
//!
//! [`loader`] turns raw text into a [`types::ParseResult`]; [`reports`] turns
//! the accepted records into a [`types::DashboardSummary`].
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
pub mod validator;

pub use error::{LoadError, OutputError};
pub use loader::{check_file, format_errors, parse_csv_file, parse_csv_reader, parse_csv_str};
pub use reports::{
    calculate_metrics, calculate_person_stats, generate_dashboard_summary, prepare_chart_data,
};
pub use types::{
    ChartPoint, DashboardSummary, DataWarning, ErrorKind, HeaderMap, Metrics, ParseResult,
    PersonStats, Record, ValidationError,
};
