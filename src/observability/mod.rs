//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Filter middleware and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (decision and reload counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, plain or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
