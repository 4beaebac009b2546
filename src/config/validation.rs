//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Backend addresses must be absolute http(s) URLs with a host
//! - Validate value ranges (timeouts and thresholds > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no backends configured")]
    NoBackends,

    #[error("backend #{index} address {address:?} is invalid: {reason}")]
    InvalidBackendAddress {
        index: usize,
        address: String,
        reason: String,
    },

    #[error("listener bind address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("metrics address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error(
        "timeouts.upstream_secs ({upstream_secs}) must be lower than timeouts.request_secs ({request_secs})"
    )]
    UpstreamTimeoutNotBelowRequest { upstream_secs: u64, request_secs: u64 },
}

/// Parse an upstream base URL, accepting only absolute http(s) URLs with a host.
pub fn parse_backend_url(address: &str) -> Result<Url, String> {
    let url = Url::parse(address).map_err(|e| e.to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme {other:?}")),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    if url.fragment().is_some() {
        return Err("fragments are not allowed".to_string());
    }

    Ok(url)
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    for (index, backend) in config.backends.iter().enumerate() {
        if let Err(reason) = parse_backend_url(&backend.address) {
            errors.push(ValidationError::InvalidBackendAddress {
                index,
                address: backend.address.clone(),
                reason,
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.connect_secs", timeouts.connect_secs),
        ("timeouts.upstream_secs", timeouts.upstream_secs),
        ("timeouts.request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroValue(field));
        }
    }

    // The request deadline must leave room for the upstream one to fire first.
    if timeouts.upstream_secs > 0
        && timeouts.request_secs > 0
        && timeouts.upstream_secs >= timeouts.request_secs
    {
        errors.push(ValidationError::UpstreamTimeoutNotBelowRequest {
            upstream_secs: timeouts.upstream_secs,
            request_secs: timeouts.request_secs,
        });
    }

    let health = &config.passive_health;
    if health.enabled {
        if health.unhealthy_threshold == 0 {
            errors.push(ValidationError::ZeroValue("passive_health.unhealthy_threshold"));
        }
        if health.healthy_threshold == 0 {
            errors.push(ValidationError::ZeroValue("passive_health.healthy_threshold"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackendConfig;

    #[test]
    fn test_default_backends_are_valid() {
        assert!(validate_config(&ProxyConfig::with_default_backends()).is_ok());
    }

    #[test]
    fn test_empty_backends_rejected() {
        let errors = validate_config(&ProxyConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoBackends]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.backends = vec![
            BackendConfig::new("http://127.0.0.1:3000"),
            BackendConfig::new("ftp://files.example.com"),
            BackendConfig::new("not a url"),
        ];
        config.listener.bind_address = "localhost".into();
        config.timeouts.upstream_secs = 0;
        config.passive_health.enabled = true;
        config.passive_health.unhealthy_threshold = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(matches!(
            errors[0],
            ValidationError::InvalidBackendAddress { index: 1, .. }
        ));
        assert!(matches!(
            errors[1],
            ValidationError::InvalidBackendAddress { index: 2, .. }
        ));
        assert_eq!(
            errors[2],
            ValidationError::InvalidBindAddress("localhost".into())
        );
        assert_eq!(errors[3], ValidationError::ZeroValue("timeouts.upstream_secs"));
        assert_eq!(
            errors[4],
            ValidationError::ZeroValue("passive_health.unhealthy_threshold")
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ProxyConfig::with_default_backends();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidMetricsAddress("nowhere".into())]
        );
    }

    #[test]
    fn test_upstream_timeout_must_be_below_request_timeout() {
        let mut config = ProxyConfig::with_default_backends();
        config.timeouts.request_secs = 1;
        config.timeouts.upstream_secs = 5;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::UpstreamTimeoutNotBelowRequest {
                upstream_secs: 5,
                request_secs: 1,
            }]
        );

        config.timeouts.upstream_secs = 1;
        assert_eq!(validate_config(&config).unwrap_err().len(), 1);

        config.timeouts.request_secs = 2;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_backend_url() {
        let url = parse_backend_url("https://example.com:8443/api?key=1").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.port(), Some(8443));

        assert!(parse_backend_url("http://127.0.0.1:3000").is_ok());
        assert!(parse_backend_url("127.0.0.1:3000").is_err());
        assert!(parse_backend_url("file:///etc/passwd").is_err());
        assert!(parse_backend_url("http://example.com/#frag").is_err());
    }
}
