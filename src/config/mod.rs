//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → FilterConfig compiled into an Arc<RequestFilter>
//!
//! On file change (reload.enabled):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<RequestFilter>
//!     → in-flight requests keep the snapshot they started with
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Rule lists are arrays of tables so rule order is preserved
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BodyRulesConfig, FilterConfig, JsonRuleConfig, ListRuleConfig, ListenerConfig,
    ObservabilityConfig, ProxyConfig, ReloadConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::ValidationError;
