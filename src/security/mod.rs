//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Request selected for a backend:
//!     → headers.rs (strip hop-by-hop, rewrite X-Forwarded-*)
//!     → Forward to upstream
//! Upstream response:
//!     → headers.rs (strip hop-by-hop)
//!     → Return to client
//! ```
//!
//! # Design Decisions
//! - No trust in client-supplied forwarding headers unless configured

pub mod headers;
