//! Request dispatcher.
//!
//! # Responsibilities
//! - Own the fixed, ordered backend list and the round-robin cursor
//! - Select the next live backend for each request
//! - Hand the request to that backend and return its response
//!
//! # Design Decisions
//! - Selection errors are detected before any I/O and answered with 503
//! - Forwarding errors are the backend's to translate; no failover

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;

use crate::config::{ConfigError, ProxyConfig};
use crate::http::request::request_id;
use crate::load_balancer::{
    backend::SharedBackend, error::DispatchError, pool::build_backends, round_robin::RoundRobin,
};
use crate::observability::metrics;

/// Round-robin dispatcher over a fixed set of backends.
#[derive(Debug)]
pub struct Dispatcher {
    backends: Vec<SharedBackend>,
    cursor: RoundRobin,
}

impl Dispatcher {
    /// Create a dispatcher. The backend list must not be empty.
    pub fn new(backends: Vec<SharedBackend>) -> Result<Self, ConfigError> {
        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        Ok(Self {
            backends,
            cursor: RoundRobin::new(),
        })
    }

    /// Create a dispatcher for the backends listed in `config`.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ConfigError> {
        Self::new(build_backends(config)?)
    }

    pub fn backends(&self) -> &[SharedBackend] {
        &self.backends
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Raw cursor value; the next selection starts at `cursor % backend_count`.
    pub fn cursor(&self) -> u64 {
        self.cursor.position()
    }

    /// Select the next live backend in configured order.
    ///
    /// Each backend's liveness is evaluated right before it can be chosen.
    /// At most one full pass is made; if nothing is alive the result is
    /// [`DispatchError::NoBackendAvailable`].
    pub fn select_next(&self) -> Result<SharedBackend, DispatchError> {
        let index = self
            .cursor
            .next_index(self.backends.len(), |i| self.backends[i].is_alive())
            .ok_or(DispatchError::NoBackendAvailable {
                checked: self.backends.len(),
            })?;
        Ok(self.backends[index].clone())
    }

    /// Select a backend and forward the request to it.
    pub async fn dispatch(&self, request: Request<Body>) -> Response<Body> {
        let start_time = Instant::now();
        let request_id = request_id(request.headers()).to_string();

        let backend = match self.select_next() {
            Ok(backend) => backend,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    method = %request.method(),
                    path = %request.uri().path(),
                    error = %e,
                    "No backend available"
                );
                metrics::record_no_backend();
                return e.into_response();
            }
        };

        tracing::debug!(
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path(),
            backend = backend.identity(),
            "Forwarding request"
        );

        let response = backend.forward(request).await;

        metrics::record_request(backend.identity(), response.status().as_u16(), start_time);
        response
    }
}
