//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Upstreams used when neither a config file nor `--backend` flags name any.
pub const DEFAULT_BACKENDS: [&str; 3] = [
    "https://www.google.com",
    "https://www.bing.com",
    "https://www.duckduckgo.com",
];

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream backends, in round-robin order.
    pub backends: Vec<BackendConfig>,

    /// Header rewriting policy applied when forwarding.
    pub forwarding: ForwardingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Passive health tracking of backends.
    pub passive_health: PassiveHealthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Default configuration with the built-in backend list.
    pub fn with_default_backends() -> Self {
        Self {
            backends: DEFAULT_BACKENDS.iter().map(|a| BackendConfig::new(*a)).collect(),
            ..Self::default()
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// A single upstream backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Upstream base URL (e.g., "http://127.0.0.1:3000" or "https://example.com/api").
    pub address: String,
}

impl BackendConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Header rewriting policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Forward the inbound `Host` header instead of the upstream's authority.
    pub preserve_host: bool,

    /// Append to an inbound `X-Forwarded-For` chain instead of replacing it.
    /// Only enable behind a trusted proxy; otherwise clients can spoof addresses.
    pub trust_forwarded_for: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for an upstream to produce response headers, in seconds.
    pub upstream_secs: u64,

    /// Total time for an inbound request, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 15,
            request_secs: 30,
        }
    }
}

/// Passive health tracking configuration.
///
/// When enabled every backend is wrapped so that gateway-style failures
/// (502/503/504, including transport errors) take it out of rotation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PassiveHealthConfig {
    /// Enable passive health tracking.
    pub enabled: bool,

    /// Number of consecutive failures before marking unhealthy.
    pub unhealthy_threshold: u32,

    /// Number of consecutive successes before marking healthy again.
    pub healthy_threshold: u32,

    /// Seconds an unhealthy backend stays out of rotation before it is offered traffic again.
    pub cooldown_secs: u64,
}

impl Default for PassiveHealthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            unhealthy_threshold: 3,
            healthy_threshold: 1,
            cooldown_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
