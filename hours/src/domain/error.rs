use redmine::{ConfigError, CryptoError, StatusResponse};
use thiserror::Error;
use uuid::Uuid;

use crate::repositories::RepositoryError;

/// Errors surfaced by the application services.
#[derive(Debug, Error)]
pub enum HoursError {
    #[error("connection not found: {0}")]
    ConnectionNotFound(Uuid),
    #[error("Redmine request failed: {} {} {}", .0.status_code, .0.status_text, .0.error_text)]
    Redmine(StatusResponse),
    #[error("invalid connection options: {0}")]
    Config(#[from] ConfigError),
    #[error("api key encryption failed: {0}")]
    Crypto(#[from] CryptoError),
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("an issue, sub-project or project id is required")]
    MissingBookingTarget,
    #[error("Redmine did not return an api key for {0}")]
    MissingApiKey(String),
    #[error("invalid date range")]
    InvalidDateRange,
}

impl From<StatusResponse> for HoursError {
    fn from(status: StatusResponse) -> Self {
        Self::Redmine(status)
    }
}
