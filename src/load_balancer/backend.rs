//! Backend abstraction.
//!
//! # Responsibilities
//! - Name a single upstream (identity)
//! - Report whether it can take traffic right now (liveness)
//! - Forward one request and produce the response for the client
//!
//! Implementations: [`ProxyBackend`](super::ProxyBackend) forwards over HTTP(S),
//! [`HealthCheckedBackend`](super::HealthCheckedBackend) adds passive health.
//! Unit tests use `StaticBackend`, which answers with a canned response.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};

/// One upstream origin the dispatcher can select.
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    /// Stable name of the upstream (usually its base URL).
    fn identity(&self) -> &str;

    /// Whether the backend can accept traffic right now.
    ///
    /// Called before every selection, so it must be cheap and must not block.
    fn is_alive(&self) -> bool;

    /// Forward `request` to the upstream and return its response.
    ///
    /// Transport failures are turned into gateway error responses here;
    /// they never escape as errors.
    async fn forward(&self, request: Request<Body>) -> Response<Body>;
}

/// A backend handle shared between the dispatcher and in-flight requests.
pub type SharedBackend = Arc<dyn Backend>;
