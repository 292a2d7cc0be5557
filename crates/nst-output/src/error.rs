//! Error types for snapshot output.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to create, open or list a snapshot path.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parquet encoding or decoding failed.
    #[error("parquet error on {path}: {message}")]
    Parquet { path: PathBuf, message: String },

    /// A snapshot lacks a required column.
    #[error("column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// A required cell is null or has the wrong type.
    #[error("invalid value in column '{column}' row {row} of {path}")]
    InvalidValue {
        column: String,
        row: usize,
        path: PathBuf,
    },
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OutputError::MissingColumn {
            column: "felt".to_string(),
            path: PathBuf::from("/out/naering.parquet"),
        };
        assert_eq!(
            err.to_string(),
            "column 'felt' not found in /out/naering.parquet"
        );
    }
}
