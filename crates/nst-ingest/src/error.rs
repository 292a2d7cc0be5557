//! Error types for batch ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding a batch.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Failed to open or read the batch file.
    #[error("failed to read batch {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Avro Errors ===
    /// The container could not be opened or a record could not be read.
    #[error("avro decoding failed: {0}")]
    Avro(#[from] apache_avro::Error),

    /// A record does not have the expected `data` envelope.
    #[error("record {position}: malformed envelope: {message}")]
    Envelope { position: usize, message: String },

    // === Payload Errors ===
    /// An embedded JSON payload could not be decoded.
    #[error("record {position}: invalid {field} payload: {source}")]
    Payload {
        position: usize,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A registration timestamp could not be parsed after normalization.
    #[error("invalid registration timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
