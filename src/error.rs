use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Transport-level failure: the request itself never completed.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Application-level failure: the gateway answered with an error detail.
    /// Displayed verbatim.
    #[error("{0}")]
    Gateway(String),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;
