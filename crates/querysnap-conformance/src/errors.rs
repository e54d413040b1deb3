use thiserror::Error;

/// Errors emitted by the conformance runner.
#[derive(Debug, Error)]
pub enum ConformanceError {
    /// A setup, command, or teardown call failed in the deployment.
    #[error("deployment error: {0}")]
    Deployment(String),
    /// Enabling or disabling a failpoint failed.
    #[error("failpoint error: {0}")]
    Failpoint(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for conformance operations.
pub type Result<T> = std::result::Result<T, ConformanceError>;
