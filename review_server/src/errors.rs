use review_engine::ReviewGatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error. {0}")]
    ConfigurationError(String),
    #[error("Could not initialize {0}. {1}")]
    InitializeError(String, String),
    #[error("Invalid date range. {0}")]
    InvalidDateRange(String),
    #[error("Backend error: {0}")]
    BackendError(#[from] ReviewGatewayError),
}
