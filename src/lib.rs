//! Request filter: reject HTTP requests carrying forbidden header, query or
//! JSON body values, and forward everything else untouched.
//!
//! The [`filter`] module is the inspection engine and has no I/O of its own;
//! [`http`] mounts it as axum middleware in front of an upstream service.

pub mod config;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use filter::{Rejection, RequestFilter};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
