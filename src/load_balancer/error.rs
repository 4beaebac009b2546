//! Per-request dispatch errors.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while selecting a backend or forwarding to it.
///
/// None of these are fatal; each one becomes the response for a single request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Every backend reported not alive during one full selection pass.
    #[error("No backend available after checking {checked} backends")]
    NoBackendAvailable { checked: usize },

    /// The upstream could not be reached or returned a malformed response.
    #[error("Upstream {backend} request failed: {source}")]
    Upstream {
        backend: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The upstream did not produce response headers in time.
    #[error("Upstream {backend} did not respond within {timeout:?}")]
    Timeout { backend: String, timeout: Duration },

    /// The inbound request could not be mapped onto the upstream.
    #[error("Cannot build upstream request for {backend}: {reason}")]
    InvalidRequest { backend: String, reason: String },
}

impl DispatchError {
    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NoBackendAvailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Upstream { .. } | DispatchError::InvalidRequest { .. } => {
                StatusCode::BAD_GATEWAY
            }
            DispatchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let message = match self {
            DispatchError::NoBackendAvailable { .. } => "No backend available",
            DispatchError::Upstream { .. } | DispatchError::InvalidRequest { .. } => {
                "Upstream request failed"
            }
            DispatchError::Timeout { .. } => "Upstream request timed out",
        };
        (self.status(), message).into_response()
    }
}
