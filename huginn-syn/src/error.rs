use thiserror::Error;

/// Errors raised around the capture engine (never on the per-frame path)
#[derive(Error, Debug)]
pub enum SynError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid frame on line {line}: {reason}")]
    InvalidFrame { line: usize, reason: String },

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SynError>;
