use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("Invalid URL: {0}")]
    Validation(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Download failed: {0}")]
    Stream(String),

    #[error("A download is already in progress. Please wait.")]
    Concurrency,
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        AppError::Request(e.to_string())
    }
}
