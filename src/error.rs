use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to decode {resource}: {message}")]
    Decode { resource: String, message: String },
    #[error("resource not found: {resource}")]
    NotFound { resource: String },
    #[error("date {0} is not listed in the index")]
    UnknownDate(String),
    #[error("market {0} is not present in the loaded day")]
    UnknownMarket(String),
    #[error("year {0} has no snapshot dates")]
    UnknownYear(String),
    #[error("month {0} has no snapshot dates in the selected year")]
    UnknownMonth(String),
    #[error("dashboard is not ready: {0}")]
    NotReady(&'static str),
}

impl DashboardError {
    pub fn decode(resource: impl Into<String>, err: serde_json::Error) -> Self {
        Self::Decode {
            resource: resource.into(),
            message: err.to_string(),
        }
    }

    /// Rejected user input, as opposed to a failed load.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownDate(_)
                | Self::UnknownMarket(_)
                | Self::UnknownYear(_)
                | Self::UnknownMonth(_)
                | Self::NotReady(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
