//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → dispatcher.rs (select_next)
//!         → round_robin.rs (claim cursor positions, skip dead backends)
//!         → backend.rs (is_alive, evaluated per selection)
//!     → backend.rs (forward)
//!         - proxy.rs (single-host reverse proxy)
//!         - checked.rs (proxy + passive health)
//!         - fixed.rs (canned response, test builds only)
//!     → Response returned to client
//! ```
//!
//! # Design Decisions
//! - Backend membership is fixed at startup; the cursor is the only mutable state
//! - Liveness is never cached by the dispatcher
//! - A selection scans at most one full pass, then fails with 503
//! - No retry on a different backend once forwarding has started

pub mod backend;
pub mod checked;
pub mod dispatcher;
pub mod error;
#[cfg(test)]
pub mod fixed;
pub mod pool;
pub mod proxy;
pub mod round_robin;

pub use backend::{Backend, SharedBackend};
pub use checked::HealthCheckedBackend;
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
#[cfg(test)]
pub use fixed::StaticBackend;
pub use proxy::ProxyBackend;
pub use round_robin::RoundRobin;
