//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, timeout)
//!     → request.rs (add request ID)
//!     → middleware.rs (inspect; reject with 403/400 or pass on)
//!     → server.rs forward handler (send to upstream)
//!     → Send upstream response to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::{request_filter_middleware, with_request_filter, FilterState};
pub use request::{RequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
