use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Failures on the CLI path only. Reconciliation itself is infallible:
/// malformed records degrade (an unparseable timestamp just opts a message
/// out of time-based comparison) rather than error out.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid message batch: {0}")]
    Decode(#[from] serde_json::Error),
}
