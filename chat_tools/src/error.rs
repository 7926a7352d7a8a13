use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid response from gateway: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Send failed. Error {status}. {message}")]
    SendError { status: u16, message: String },
}
