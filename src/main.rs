//! Round-robin reverse proxy.
//!
//! ```text
//! client ──▶ axum server ──▶ Dispatcher::select_next() ──▶ Backend::forward() ──▶ upstream
//!                            (cursor % N, skip dead)
//! client ◀──────────────────── streamed response ◀──────────────────────────────── upstream
//! ```
//!
//! Backends come from a TOML config file (`--config`), from repeated
//! `--backend` flags, or default to three public search engines.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use roundrobin_proxy::config::{
    load_config, read_config, validate_config, BackendConfig, ConfigError, ProxyConfig,
};
use roundrobin_proxy::lifecycle::{signals, Shutdown};
use roundrobin_proxy::observability::{logging, metrics};
use roundrobin_proxy::{Dispatcher, HttpServer};

#[derive(Debug, Parser)]
#[command(name = "roundrobin-proxy")]
#[command(about = "Round-robin reverse proxy", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration (e.g. 0.0.0.0:8000).
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream base URL. Repeat to list several; replaces configured backends.
    #[arg(long = "backend", value_name = "URL")]
    backends: Vec<String>,

    /// Log level, overriding the configuration.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Resolve the effective configuration: file or defaults, then flags.
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        if let (Some(path), false) = (&self.config, self.has_overrides()) {
            return load_config(path);
        }

        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None if self.backends.is_empty() => ProxyConfig::with_default_backends(),
            None => ProxyConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if !self.backends.is_empty() {
            config.backends = self.backends.into_iter().map(BackendConfig::new).collect();
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn has_overrides(&self) -> bool {
        self.bind.is_some() || !self.backends.is_empty() || self.log_level.is_some()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability);
    tracing::info!("roundrobin-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let dispatcher = Arc::new(Dispatcher::from_config(&config)?);
    for (index, backend) in dispatcher.backends().iter().enumerate() {
        tracing::info!(index, backend = backend.identity(), "Backend registered");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        request_timeout_secs = config.timeouts.request_secs,
        "Serving requests"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(dispatcher, &config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
