//! # p6gantt-ingest
//!
//! Turns spreadsheet rows from scheduling exports into a [`TaskTree`].
//!
//! This crate provides:
//! - Fuzzy column detection (`columns`)
//! - Row classification into headers, activities and milestones (`classify`)
//! - Tree reconstruction with derived group ranges (`tree`)
//! - CSV, TSV and JSON row sources (`source`)
//!
//! ## Example
//!
//! ```rust
//! use p6gantt_core::{Row, TaskKind};
//! use p6gantt_ingest::build_tree;
//!
//! let rows = vec![
//!     Row::new()
//!         .with("Activity ID", "Piling")
//!         .with("Activity Name", "")
//!         .with("Start", "")
//!         .with("Finish", ""),
//!     Row::new()
//!         .with("Activity ID", "  P1_PL_10")
//!         .with("Activity Name", "Bored piles")
//!         .with("Start", "01-Jan-24")
//!         .with("Finish", "01-Feb-24"),
//! ];
//!
//! let tree = build_tree(&rows).unwrap();
//! assert_eq!(tree.tasks[0].kind, TaskKind::Header);
//! assert_eq!(tree.tasks[1].kind, TaskKind::Activity);
//! ```

pub mod classify;
pub mod columns;
pub mod source;
pub mod tree;

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use p6gantt_core::{Row, TaskTree};

pub use classify::{parse_duration, ActivityIdPattern, RowClassifier, DEFAULT_ACTIVITY_ID_PATTERN};
pub use columns::{detect_columns, ColumnCandidates, ColumnDetector, ColumnField, ColumnMap};
pub use source::{rows_from_csv, rows_from_json};
pub use tree::{build_tree, TreeBuilder};

/// Ingest error
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No rows to ingest")]
    NoRows,

    #[error("Could not detect a name or date column among: {columns}")]
    ColumnsUndetected { columns: String },

    #[error("Invalid activity id pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Options
// ============================================================================

fn default_pad_months() -> u32 {
    1
}

fn default_max_horizon() -> NaiveDate {
    NaiveDate::from_ymd_opt(2100, 1, 1).unwrap_or(NaiveDate::MAX)
}

fn default_activity_id_pattern() -> String {
    DEFAULT_ACTIVITY_ID_PATTERN.to_string()
}

/// Tree building options, loadable from the `[ingest]` table of a config file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestOptions {
    /// Regular expression an activity id must match
    pub activity_id_pattern: String,
    /// Months of padding on each side of the chart
    pub pad_months: u32,
    /// Latest date the chart axis may reach
    pub max_horizon: NaiveDate,
    /// Fixed project month 1; derived from the earliest activity when unset
    pub project_month_one: Option<NaiveDate>,
    /// Extra candidate headers per field
    pub columns: ColumnCandidates,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            activity_id_pattern: default_activity_id_pattern(),
            pad_months: default_pad_months(),
            max_horizon: default_max_horizon(),
            project_month_one: None,
            columns: ColumnCandidates::default(),
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values (.csv)
    Csv,
    /// Tab-separated values (.tsv, .tab, .txt)
    Tsv,
    /// JSON array of row objects (.json)
    Json,
    /// Native workbook (.xlsx, .xls); not readable, export to CSV first
    Workbook,
}

/// Detect the input format from the file extension
///
/// Unknown extensions are read as CSV.
pub fn detect_format(path: &Path) -> FileFormat {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("tsv" | "tab" | "txt") => FileFormat::Tsv,
        Some("json") => FileFormat::Json,
        Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => FileFormat::Workbook,
        _ => FileFormat::Csv,
    }
}

/// Read the rows of a file (auto-detects format)
pub fn read_rows(path: &Path) -> Result<Vec<Row>, IngestError> {
    let rows = match detect_format(path) {
        FileFormat::Csv => rows_from_csv(std::fs::File::open(path)?, b',')?,
        FileFormat::Tsv => rows_from_csv(std::fs::File::open(path)?, b'\t')?,
        FileFormat::Json => rows_from_json(&std::fs::read_to_string(path)?)?,
        FileFormat::Workbook => {
            return Err(IngestError::UnsupportedFormat(format!(
                "{}: save the sheet as CSV",
                path.display()
            )))
        }
    };
    tracing::debug!(path = %path.display(), rows = rows.len(), "read rows");
    Ok(rows)
}

/// Read a file and build its task tree
pub fn load_file(path: &Path, builder: &TreeBuilder) -> Result<TaskTree, IngestError> {
    builder.build(&read_rows(path)?)
}
