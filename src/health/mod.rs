//! Passive health tracking.
//!
//! # Data Flow
//! ```text
//! Forwarded response observed (load_balancer::checked)
//!     → 502/503/504 or transport error counts as failure
//!     → state.rs updates counters and state
//!     → Dispatcher reads is_available() before every selection
//! ```
//!
//! # Design Decisions
//! - No active probing; liveness is derived from real traffic only
//! - State transitions require consecutive successes/failures
//! - An unhealthy backend is offered traffic again after a cooldown,
//!   so recovery does not depend on a prober
//! - Reads are atomic loads; checking liveness never blocks

pub mod state;

pub use state::{BackendHealth, HealthPolicy, HealthState};
