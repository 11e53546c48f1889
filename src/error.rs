use thiserror::Error;

/// Everything that can stop a generation run. Sampling itself never fails;
/// these all come from configuration or from the output sink.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl GeneratorError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        GeneratorError::InvalidConfig(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        GeneratorError::InvalidArgument(message.into())
    }
}
