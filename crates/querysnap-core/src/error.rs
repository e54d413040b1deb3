use thiserror::Error;

/// Core error type shared across Querysnap crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Query execution failed in the engine collaborator.
    #[error("execution error: {0}")]
    Execution(String),
    /// Explain request failed in the engine collaborator.
    #[error("explain error: {0}")]
    Explain(String),
    /// A capture artifact is missing data the caller asked for.
    #[error("invalid capture: {0}")]
    InvalidCapture(String),
    /// The markdown sink rejected a write.
    #[error("sink error: {0}")]
    Sink(#[from] std::io::Error),
    /// Serialization of an artifact failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by Querysnap crates.
pub type Result<T> = std::result::Result<T, Error>;
