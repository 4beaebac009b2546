//! Backend wrapper with passive health tracking.
//!
//! Gateway-style responses (502, 503, 504) count as failures; anything else,
//! including 4xx and other 5xx, counts as success. Transport errors already
//! surface from [`ProxyBackend`](super::ProxyBackend) as 502 or 504, so they
//! are counted too.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};

use crate::health::{BackendHealth, HealthPolicy, HealthState};
use crate::load_balancer::backend::Backend;
use crate::observability::metrics;

#[derive(Debug)]
pub struct HealthCheckedBackend<B> {
    inner: B,
    health: BackendHealth,
}

impl<B: Backend> HealthCheckedBackend<B> {
    pub fn new(inner: B, policy: HealthPolicy) -> Self {
        Self {
            inner,
            health: BackendHealth::new(policy),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn health(&self) -> &BackendHealth {
        &self.health
    }

    fn observe(&self, status: StatusCode) {
        let transition = match status {
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => self.health.record_failure(),
            _ => self.health.record_success(),
        };

        match transition {
            Some(HealthState::Unhealthy) => {
                tracing::warn!(
                    backend = self.inner.identity(),
                    status = %status,
                    cooldown = ?self.health.policy().cooldown,
                    "Backend marked unhealthy"
                );
                metrics::record_backend_alive(self.inner.identity(), false);
            }
            Some(HealthState::Healthy) => {
                tracing::info!(backend = self.inner.identity(), "Backend marked healthy");
                metrics::record_backend_alive(self.inner.identity(), true);
            }
            _ => {}
        }
    }
}

#[async_trait]
impl<B: Backend> Backend for HealthCheckedBackend<B> {
    fn identity(&self) -> &str {
        self.inner.identity()
    }

    /// Past the cooldown a tripped backend is offered to every selection
    /// until a forwarded response is observed; see
    /// [`BackendHealth::is_available`].
    fn is_alive(&self) -> bool {
        self.health.is_available() && self.inner.is_alive()
    }

    async fn forward(&self, request: Request<Body>) -> Response<Body> {
        let response = self.inner.forward(request).await;
        self.observe(response.status());
        response
    }
}
