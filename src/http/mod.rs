//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, HTTP/1.1 + HTTP/2)
//!     → request.rs (assign x-request-id)
//!     → [dispatcher picks a backend and forwards]
//!     → Send upstream response to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, RequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
