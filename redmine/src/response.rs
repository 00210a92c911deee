use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::RedmineFetchError;

/// Outcome of a single Redmine call. `has_error == false` is the only success signal;
/// `data` may be empty on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status_code: u16,
    pub status_text: String,
    pub error_text: String,
    pub has_error: bool,
}

impl StatusResponse {
    pub fn success(status: StatusCode) -> Self {
        Self {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            error_text: String::new(),
            has_error: false,
        }
    }

    pub fn internal_error(error_text: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            status_text: "Internal Server Error".to_string(),
            error_text: error_text.into(),
            has_error: true,
        }
    }
}

impl From<&RedmineFetchError> for StatusResponse {
    fn from(err: &RedmineFetchError) -> Self {
        match err {
            RedmineFetchError::Upstream {
                status,
                status_text,
                body,
            } => Self {
                status_code: *status,
                status_text: status_text.clone(),
                error_text: body.clone(),
                has_error: true,
            },
            other => Self::internal_error(other.to_string()),
        }
    }
}

/// The `{data, status}` envelope returned by every [`crate::RedmineClient`] operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedmineResponse<T> {
    pub data: T,
    pub status: StatusResponse,
}

impl<T> RedmineResponse<T> {
    pub fn new(data: T, status: StatusResponse) -> Self {
        Self { data, status }
    }

    pub fn has_error(&self) -> bool {
        self.status.has_error
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RedmineResponse<U> {
        RedmineResponse {
            data: f(self.data),
            status: self.status,
        }
    }

    /// Drops the status, keeping the data only when the call succeeded.
    pub fn into_result(self) -> Result<T, StatusResponse> {
        if self.status.has_error {
            Err(self.status)
        } else {
            Ok(self.data)
        }
    }
}

impl<T: Default> RedmineResponse<T> {
    pub fn failure(status: StatusResponse) -> Self {
        Self {
            data: T::default(),
            status,
        }
    }
}

impl<T: Default> From<Result<(T, StatusCode), RedmineFetchError>> for RedmineResponse<T> {
    fn from(result: Result<(T, StatusCode), RedmineFetchError>) -> Self {
        match result {
            Ok((data, status)) => Self::new(data, StatusResponse::success(status)),
            Err(err) => Self::failure(StatusResponse::from(&err)),
        }
    }
}
