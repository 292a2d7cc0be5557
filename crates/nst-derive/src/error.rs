use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeriveError {
    /// A running sum left the representable decimal range.
    #[error("{table}.{variable}: amount overflow")]
    Overflow {
        table: &'static str,
        variable: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, DeriveError>;
