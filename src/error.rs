// 🚨 Error kinds
// File-level failures are surfaced as typed errors, row-level noise is not.

use std::path::PathBuf;
use thiserror::Error;

/// Parse-level failures for a single table artifact.
#[derive(Debug, Error)]
pub enum TableError {
    /// The table cannot be classified into a known export variant.
    #[error("unsupported table shape ({rows} rows x {columns} columns): {reason}")]
    UnsupportedTableShape {
        rows: usize,
        columns: usize,
        reason: String,
    },

    /// A required column is absent from the header row.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// An encoded blob was present but yielded zero valid rows.
    #[error("encoded blob contained no parsable rows")]
    EmptyParseResult,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Engine-level failures, each naming the group or artifact involved.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The prediction artifact for a group does not exist.
    #[error("prediction file for group {group} not available: {}", path.display())]
    FileNotAvailable { group: String, path: PathBuf },

    /// A group identifier has no entry in the registry.
    #[error("unknown group identifier: {0}")]
    UnknownGroup(String),

    /// The prediction artifact exists but could not be parsed.
    #[error("prediction file for group {group} ({}) could not be parsed: {source}", path.display())]
    Prediction {
        group: String,
        path: PathBuf,
        #[source]
        source: TableError,
    },

    /// The ground-truth artifact exists but could not be parsed.
    #[error("ground truth file {} could not be loaded: {source}", path.display())]
    GroundTruth {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ReconcileError {
    /// Group the error is about, when it concerns a single group.
    pub fn group(&self) -> Option<&str> {
        match self {
            ReconcileError::FileNotAvailable { group, .. }
            | ReconcileError::Prediction { group, .. } => Some(group),
            ReconcileError::UnknownGroup(code) => Some(code),
            ReconcileError::GroundTruth { .. } | ReconcileError::Config(_) => None,
        }
    }

    /// True when the artifact was present but no rows could be read from it.
    pub fn is_empty_parse(&self) -> bool {
        matches!(
            self,
            ReconcileError::Prediction {
                source: TableError::EmptyParseResult,
                ..
            }
        )
    }
}
