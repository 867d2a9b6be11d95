//! Structured error types for the table engine.
//!
//! Configuration mistakes are caught before anything is drawn. Failures
//! coming out of the drawing surface are passed through untouched.

use thiserror::Error;

/// The unified error type returned by all public pagetable API functions.
#[derive(Debug, Error)]
pub enum TableError {
    /// The table is set up in a way that can't be laid out.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The drawing surface failed to measure or draw.
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// JSON input failed to parse as a valid table document.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl TableError {
    /// True when the error came from text measurement on the surface.
    pub fn is_measurement(&self) -> bool {
        matches!(self, TableError::Surface(SurfaceError::Measurement { .. }))
    }
}

/// Fatal setup errors. Rows and columns are 1-indexed; the heading is row 1.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(
        "row {row}, column {column}: cell spans {span} column(s) but column widths only cover {available}"
    )]
    ColumnOutOfRange {
        row: usize,
        column: usize,
        span: usize,
        available: usize,
    },

    #[error("row {row}, column {column}: colspan must be at least 1")]
    ZeroColspan { row: usize, column: usize },

    #[error("row {row}, column {column}: colspans add up to more columns than can be counted")]
    ColspanOverflow { row: usize, column: usize },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("column weights must be non-negative and sum to more than zero")]
    InvalidWeights,

    #[error("row {row}, column {column}: alignment list only covers {available} column(s)")]
    AlignmentOutOfRange {
        row: usize,
        column: usize,
        available: usize,
    },

    #[error("row {row}: group column {column} does not exist")]
    GroupColumnOutOfRange { row: usize, column: usize },

    #[error("{rows} data row(s) but {groups} group key(s)")]
    MissingGroups { rows: usize, groups: usize },
}

/// Errors raised by a [`crate::surface::DrawingSurface`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("Measurement error: cannot wrap text at width {width}: {reason}")]
    Measurement { width: f64, reason: String },

    #[error("Drawing error: {0}")]
    Drawing(String),
}

impl From<serde_json::Error> for TableError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the table document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        TableError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_error_names_row_and_column() {
        let err = TableError::from(ConfigError::ColumnOutOfRange {
            row: 3,
            column: 4,
            span: 2,
            available: 4,
        });
        let msg = err.to_string();
        assert!(msg.contains("row 3"), "{}", msg);
        assert!(msg.contains("column 4"), "{}", msg);
    }

    #[test]
    fn parse_error_carries_hint() {
        let err: TableError = serde_json::from_str::<serde_json::Value>("{ \"a\": 1, }")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("Hint"));
    }

    #[test]
    fn measurement_is_classified() {
        let err = TableError::from(SurfaceError::Measurement {
            width: 0.0,
            reason: "no room".into(),
        });
        assert!(err.is_measurement());
        let err = TableError::from(SurfaceError::Drawing("boom".into()));
        assert!(!err.is_measurement());
    }
}
