//! Error handling for the offering generator
//!
//! This module provides:
//! - The `GeneratorError` type returned at the library boundary
//! - A coarse `ErrorKind` for callers deciding how to report a failure
//! - Operator-facing suggestions for recoverable conditions

use std::path::PathBuf;
use thiserror::Error;

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

pub const NO_MATCH_MESSAGE: &str = "No rows matched your criteria. Please check your Keywords, \
CORP filter, and that your template contains those entries.";

/// Coarse classification of generator failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No source table produced an accepted row; fixed by adjusting operator input
    NoMatch,
    /// Any other read, transform or write failure
    Unexpected,
}

impl ErrorKind {
    /// Process exit code used by the binary
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::NoMatch => 2,
            ErrorKind::Unexpected => 1,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            ErrorKind::NoMatch => "operator_input",
            ErrorKind::Unexpected => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Nothing across all source tables passed the row filter
    #[error("{}", NO_MATCH_MESSAGE)]
    NoMatch {
        tables_scanned: usize,
        tables_skipped: usize,
    },

    /// A source workbook lacks the template sheet
    #[error("workbook {path:?} has no sheet named '{sheet}'")]
    MissingSheet { path: PathBuf, sheet: String },

    /// Operator configuration rejected before any file was touched
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl GeneratorError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        GeneratorError::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GeneratorError::NoMatch { .. } => ErrorKind::NoMatch,
            GeneratorError::MissingSheet { .. }
            | GeneratorError::InvalidConfig { .. }
            | GeneratorError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Hints for the operator; empty for internal failures
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            GeneratorError::NoMatch {
                tables_scanned,
                tables_skipped,
            } => {
                let mut hints = vec![
                    "check that every keyword appears as a whole word in the parent offering or name"
                        .to_string(),
                    "check the SR/IM selection against the '[SR ' / '[IM ' name prefix".to_string(),
                    "check the CORP checkbox: CORP rows are only used when CORP is required"
                        .to_string(),
                ];
                if *tables_scanned == 0 {
                    hints.push("no source workbooks were found in the input directory".to_string());
                } else if tables_skipped == tables_scanned {
                    hints.push(format!(
                        "all {tables_scanned} source workbook(s) were skipped for missing columns"
                    ));
                }
                hints
            }
            GeneratorError::MissingSheet { sheet, .. } => {
                vec![format!("export the template with a sheet named '{sheet}'")]
            }
            GeneratorError::InvalidConfig { .. } | GeneratorError::Unexpected(_) => Vec::new(),
        }
    }
}
