//! Error types for the dispatch driver

use thiserror::Error;

/// Driver configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An interval was configured as zero
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },

    /// An environment variable could not be parsed
    #[error("invalid value {value:?} for {var}: expected milliseconds")]
    InvalidEnvValue { var: &'static str, value: String },
}

/// Errors starting the dispatch driver
#[derive(Debug, Error)]
pub enum DriverError {
    /// Configuration rejected
    #[error("invalid driver configuration: {0}")]
    Config(#[from] ConfigError),

    /// The trigger task needs a tokio runtime
    #[error("no tokio runtime available for the dispatch trigger")]
    NoRuntime,

    /// The worker thread could not be started
    #[error("failed to start dispatch worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;
