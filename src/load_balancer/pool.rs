//! Backend pool construction.
//!
//! # Responsibilities
//! - Turn the static backend list from configuration into backends
//! - Share one upstream client across all of them
//! - Wrap each in passive health tracking when enabled

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, ProxyConfig};
use crate::health::HealthPolicy;
use crate::load_balancer::{
    backend::SharedBackend,
    checked::HealthCheckedBackend,
    proxy::{build_client, ProxyBackend},
};

/// Build the ordered backend list described by `config`.
pub fn build_backends(config: &ProxyConfig) -> Result<Vec<SharedBackend>, ConfigError> {
    if config.backends.is_empty() {
        return Err(ConfigError::NoBackends);
    }

    let client = build_client(&config.timeouts);
    let upstream_timeout = Duration::from_secs(config.timeouts.upstream_secs);
    let policy = HealthPolicy::from(&config.passive_health);

    config
        .backends
        .iter()
        .map(|backend_config| -> Result<SharedBackend, ConfigError> {
            let proxy = ProxyBackend::new(
                &backend_config.address,
                client.clone(),
                config.forwarding.clone(),
                upstream_timeout,
            )?;

            let backend: SharedBackend = if config.passive_health.enabled {
                Arc::new(HealthCheckedBackend::new(proxy, policy))
            } else {
                Arc::new(proxy)
            };

            tracing::debug!(
                backend = backend.identity(),
                passive_health = config.passive_health.enabled,
                "Backend configured"
            );
            Ok(backend)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    #[test]
    fn test_build_in_configured_order() {
        let backends = build_backends(&ProxyConfig::with_default_backends()).unwrap();
        let identities: Vec<_> = backends.iter().map(|b| b.identity()).collect();
        assert_eq!(
            identities,
            vec![
                "https://www.google.com",
                "https://www.bing.com",
                "https://www.duckduckgo.com"
            ]
        );
        assert!(backends.iter().all(|b| b.is_alive()));
    }

    #[test]
    fn test_empty_list_rejected() {
        let err = build_backends(&ProxyConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoBackends));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let mut config = ProxyConfig::default();
        config.backends.push(BackendConfig::new("http://127.0.0.1:3000"));
        config.backends.push(BackendConfig::new("gopher://old.example"));

        let err = build_backends(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidBackend { ref address, .. } if address == "gopher://old.example"
        ));
    }

    #[test]
    fn test_passive_health_wraps_backends() {
        let mut config = ProxyConfig::default();
        config.backends.push(BackendConfig::new("http://127.0.0.1:3000"));
        config.passive_health.enabled = true;

        let backends = build_backends(&config).unwrap();
        assert!(format!("{:?}", backends[0]).starts_with("HealthCheckedBackend"));
    }
}
