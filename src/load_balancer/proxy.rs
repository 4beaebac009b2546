//! Single-host reverse proxy backend.
//!
//! # Responsibilities
//! - Map the inbound request onto the upstream base URL
//! - Apply the header policy (hop-by-hop, X-Forwarded-*, Host)
//! - Send through the shared pooled client and stream the response back
//! - Translate transport failures into 502/504 responses
//!
//! # Design Decisions
//! - One hyper-util client (HTTP + HTTPS via rustls) shared by every backend
//! - Bodies are streamed in both directions, never buffered
//! - The upstream timeout covers the wait for response headers only

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::HOST;
use axum::http::uri::InvalidUri;
use axum::http::{HeaderValue, Request, Response, Uri, Version};
use axum::response::IntoResponse;
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::{parse_backend_url, ConfigError, ForwardingConfig, TimeoutConfig};
use crate::load_balancer::backend::Backend;
use crate::load_balancer::error::DispatchError;
use crate::security::headers::{apply_forwarded_headers, strip_hop_by_hop, ForwardedContext};

/// Pooled client used for every upstream request.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the shared upstream client.
///
/// Trusts the platform's native root certificates for HTTPS upstreams.
pub fn build_client(timeouts: &TimeoutConfig) -> UpstreamClient {
    // Another component may already have installed a provider.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let mut http_connector = HttpConnector::new();
    http_connector.enforce_http(false);
    http_connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

    let mut roots = rustls::RootCertStore::empty();
    let native_certs = rustls_native_certs::load_native_certs();
    for cert in native_certs.certs {
        if roots.add(cert).is_err() {
            tracing::warn!("Failed to add native certificate to root store");
        }
    }
    if !native_certs.errors.is_empty() {
        tracing::warn!(errors = ?native_certs.errors, "Some native certificates failed to load");
    }
    tracing::debug!(roots = roots.len(), "Loaded native root certificates");

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let connector = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .wrap_connector(http_connector);

    Client::builder(TokioExecutor::new()).build(connector)
}

/// A backend that reverse-proxies to one upstream origin.
///
/// Liveness is always true; wrap it in a
/// [`HealthCheckedBackend`](super::HealthCheckedBackend) to take failing
/// upstreams out of rotation.
#[derive(Clone)]
pub struct ProxyBackend {
    address: String,
    target: Url,
    client: UpstreamClient,
    forwarding: ForwardingConfig,
    upstream_timeout: Duration,
}

impl fmt::Debug for ProxyBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyBackend")
            .field("address", &self.address)
            .field("forwarding", &self.forwarding)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl ProxyBackend {
    /// Create a backend for the upstream base URL `address`.
    pub fn new(
        address: &str,
        client: UpstreamClient,
        forwarding: ForwardingConfig,
        upstream_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let target = parse_backend_url(address).map_err(|reason| ConfigError::InvalidBackend {
            address: address.to_string(),
            reason,
        })?;

        Ok(Self {
            address: address.to_string(),
            target,
            client,
            forwarding,
            upstream_timeout,
        })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Forward a request, surfacing failures as errors.
    pub async fn try_forward(&self, request: Request<Body>) -> Result<Response<Body>, DispatchError> {
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let (mut parts, body) = request.into_parts();

        let uri = upstream_uri(&self.target, &parts.uri).map_err(|e| {
            DispatchError::InvalidRequest {
                backend: self.address.clone(),
                reason: e.to_string(),
            }
        })?;

        let inbound_host = parts.headers.get(HOST).cloned().or_else(|| {
            parts
                .uri
                .authority()
                .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
        });

        strip_hop_by_hop(&mut parts.headers);
        apply_forwarded_headers(
            &mut parts.headers,
            &ForwardedContext {
                client_ip,
                host: inbound_host,
                proto: "http",
                trusted: self.forwarding.trust_forwarded_for,
            },
        );
        if !self.forwarding.preserve_host {
            // The client derives Host from the URI when the header is absent.
            parts.headers.remove(HOST);
        }

        parts.uri = uri;
        // The pool speaks HTTP/1.1 to upstreams whatever the client used.
        parts.version = Version::HTTP_11;
        let upstream_request = Request::from_parts(parts, body);

        let response: Response<Incoming> = match tokio::time::timeout(
            self.upstream_timeout,
            self.client.request(upstream_request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(source)) => {
                return Err(DispatchError::Upstream {
                    backend: self.address.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(DispatchError::Timeout {
                    backend: self.address.clone(),
                    timeout: self.upstream_timeout,
                })
            }
        };

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

#[async_trait]
impl Backend for ProxyBackend {
    fn identity(&self) -> &str {
        &self.address
    }

    fn is_alive(&self) -> bool {
        true
    }

    async fn forward(&self, request: Request<Body>) -> Response<Body> {
        match self.try_forward(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(backend = %self.address, error = %e, "Upstream error");
                e.into_response()
            }
        }
    }
}

/// Build the upstream URI: base path joined with the inbound path,
/// base query followed by the inbound query.
pub fn upstream_uri(target: &Url, inbound: &Uri) -> Result<Uri, InvalidUri> {
    let path = join_paths(target.path(), inbound.path());

    let base_query = target.query().filter(|q| !q.is_empty());
    let inbound_query = inbound.query().filter(|q| !q.is_empty());
    let query = match (base_query, inbound_query) {
        (Some(base), Some(extra)) => Some(format!("{base}&{extra}")),
        (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
        (None, None) => None,
    };

    let mut uri = format!("{}://{}", target.scheme(), authority(target));
    uri.push_str(&path);
    if let Some(query) = query {
        uri.push('?');
        uri.push_str(&query);
    }
    uri.parse()
}

fn authority(target: &Url) -> String {
    let host = target.host_str().unwrap_or_default();
    match target.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// Join two paths with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}
