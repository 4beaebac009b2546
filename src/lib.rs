//! Round-robin reverse proxy library.
//!
//! Every inbound request is handed to a [`Dispatcher`], which picks the next
//! live [`Backend`] in configured order and forwards the request to it.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod security;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Backend, DispatchError, Dispatcher};
