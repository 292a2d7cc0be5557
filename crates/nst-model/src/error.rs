use thiserror::Error;

#[derive(Debug, Error)]
pub enum NstError {
    #[error("invalid specification document: {0}")]
    Specification(#[from] serde_json::Error),
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
}

pub type Result<T> = std::result::Result<T, NstError>;
