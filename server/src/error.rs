use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config;

/// Relay failure taxonomy. Every variant resolves to a JSON body with a
/// user-facing `error` message; internal detail rides along only in
/// development.
#[derive(Error, Debug)]
pub enum AppError {
    /// The inbound multipart body could not be parsed.
    #[error("Error parsing form data")]
    MalformedUpload(String),

    /// A required file field was absent.
    #[error("{0}")]
    MissingFile(&'static str),

    /// The model backend was reachable but answered with an error status.
    #[error("Backend responded with error")]
    BackendStatus { status: u16, body: String },

    /// The model backend could not be reached in time.
    #[error("No response from backend server")]
    BackendUnreachable(String),

    /// Anything else that broke while building or relaying the request.
    #[error("{message}")]
    Processing { message: &'static str, detail: String },
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            Self::MalformedUpload(detail)
            | Self::BackendUnreachable(detail)
            | Self::Processing { detail, .. } => Some(detail.clone()),
            Self::BackendStatus { status, body } => Some(format!("Status: {status}, Data: {body}")),
            Self::MissingFile(_) => None,
        }
    }

    pub fn body(&self, verbose: bool) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            details: if verbose { self.detail() } else { None },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body(config::verbose_errors()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_status_formats_detail() {
        let error = AppError::BackendStatus {
            status: 503,
            body: "overloaded".to_string(),
        };

        let body = error.body(true);
        assert_eq!(body.error, "Backend responded with error");
        assert_eq!(body.details.as_deref(), Some("Status: 503, Data: overloaded"));
    }

    #[test]
    fn production_bodies_omit_detail() {
        let error = AppError::BackendUnreachable("Connection failed or timed out".to_string());

        let body = error.body(false);
        assert_eq!(body.error, "No response from backend server");
        assert!(body.details.is_none());
    }

    #[test]
    fn missing_file_is_a_client_error() {
        let error = AppError::MissingFile("No image file uploaded");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert!(error.body(true).details.is_none());
    }

    #[test]
    fn everything_else_is_a_server_error() {
        let errors = [
            AppError::MalformedUpload("boom".to_string()),
            AppError::BackendStatus { status: 500, body: String::new() },
            AppError::BackendUnreachable(String::new()),
            AppError::Processing { message: "Failed to process image", detail: String::new() },
        ];
        for error in errors {
            assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
