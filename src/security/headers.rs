//! Header manipulation for forwarded traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Set X-Forwarded-For, X-Forwarded-Host, X-Forwarded-Proto
//!
//! # Design Decisions
//! - Preserve original client IP in X-Forwarded-For
//! - Inbound X-Forwarded-* are discarded unless the proxy is told to trust them

use std::net::IpAddr;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Headers that apply to a single transport hop and must not be forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// What the proxy knows about the inbound hop.
#[derive(Debug, Clone)]
pub struct ForwardedContext {
    /// Address of the immediate client, if the listener recorded it.
    pub client_ip: Option<IpAddr>,
    /// Host the client asked for.
    pub host: Option<HeaderValue>,
    /// Scheme the client used to reach the proxy.
    pub proto: &'static str,
    /// Keep inbound X-Forwarded-* values and extend them.
    pub trusted: bool,
}

/// Rewrite X-Forwarded-* headers for the upstream request.
pub fn apply_forwarded_headers(headers: &mut HeaderMap, ctx: &ForwardedContext) {
    let prior: Vec<String> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    headers.remove(&X_FORWARDED_FOR);

    let mut chain = if ctx.trusted { prior } else { Vec::new() };
    if let Some(ip) = ctx.client_ip {
        chain.push(ip.to_string());
    }
    if !chain.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&chain.join(", ")) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    if !(ctx.trusted && headers.contains_key(&X_FORWARDED_HOST)) {
        match &ctx.host {
            Some(host) => {
                headers.insert(X_FORWARDED_HOST, host.clone());
            }
            None => {
                headers.remove(&X_FORWARDED_HOST);
            }
        }
    }

    if !(ctx.trusted && headers.contains_key(&X_FORWARDED_PROTO)) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static(ctx.proto));
    }
}
