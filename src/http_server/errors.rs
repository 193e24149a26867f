//! HTTP error responses
//!
//! Every failure leaves a handler as a status code and a plain-text body.
//! Server errors carry a fixed per-route message; the cause goes to the
//! log only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::AuthError;
use crate::observability::{log_event, Event};
use crate::participants::LifecycleError;

/// Body of every authentication failure that is not a missing cookie
pub const AUTHENTICATION_ERROR: &str = "Authentication error";

/// A status and plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Map a lifecycle failure; `context` is the body used for 5xx
    pub fn from_lifecycle(err: LifecycleError, context: &str) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            log_event(
                Event::RequestFailed,
                &[("context", context), ("error", err.to_string().as_str())],
            );
            Self::new(status, context)
        } else {
            Self::new(status, err.to_string())
        }
    }

    /// Map a gate failure
    pub fn from_auth(err: AuthError) -> Self {
        if err.is_verification_failure() {
            log_event(
                Event::AuthenticationFailed,
                &[("cause", err.to_string().as_str())],
            );
            return Self::new(StatusCode::INTERNAL_SERVER_ERROR, AUTHENTICATION_ERROR);
        }

        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            log_event(
                Event::RequestFailed,
                &[("error", err.to_string().as_str())],
            );
            return Self::new(status, AUTHENTICATION_ERROR);
        }
        if err == AuthError::Forbidden {
            log_event(Event::AccessDenied, &[]);
        }

        Self::new(status, err.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
