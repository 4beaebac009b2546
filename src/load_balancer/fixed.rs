//! Backend that answers every request with a canned response.
//!
//! Stand-in upstream for unit tests; compiled only under `cfg(test)`.
//! Liveness can be flipped at runtime and every call is counted.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, Response, StatusCode};

use crate::load_balancer::backend::Backend;

#[derive(Debug)]
pub struct StaticBackend {
    identity: String,
    status: StatusCode,
    body: Bytes,
    alive: AtomicBool,
    liveness_checks: AtomicUsize,
    forwarded: AtomicUsize,
}

impl StaticBackend {
    /// A live backend answering `200` with its identity as the body.
    pub fn new(identity: impl Into<String>) -> Self {
        let identity = identity.into();
        Self {
            body: Bytes::from(identity.clone()),
            identity,
            status: StatusCode::OK,
            alive: AtomicBool::new(true),
            liveness_checks: AtomicUsize::new(0),
            forwarded: AtomicUsize::new(0),
        }
    }

    pub fn with_response(mut self, status: StatusCode, body: impl Into<Bytes>) -> Self {
        self.status = status;
        self.body = body.into();
        self
    }

    pub fn dead(self) -> Self {
        self.set_alive(false);
        self
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    /// Number of times `is_alive` has been called.
    pub fn liveness_checks(&self) -> usize {
        self.liveness_checks.load(Ordering::SeqCst)
    }

    /// Number of requests forwarded to this backend.
    pub fn forwarded(&self) -> usize {
        self.forwarded.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for StaticBackend {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn is_alive(&self) -> bool {
        self.liveness_checks.fetch_add(1, Ordering::SeqCst);
        self.alive.load(Ordering::SeqCst)
    }

    async fn forward(&self, _request: Request<Body>) -> Response<Body> {
        self.forwarded.fetch_add(1, Ordering::SeqCst);
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        response
    }
}
