//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the filter.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root configuration for the filtering proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream service that receives allowed requests.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Config file hot reload.
    pub reload: ReloadConfig,

    /// Forbidden-value rules.
    pub filter: FilterConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Hot reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Watch the config file and swap in new filter rules on change.
    pub enabled: bool,

    /// Poll interval for file systems without native notifications.
    pub poll_interval_secs: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            poll_interval_secs: 2,
        }
    }
}

/// Forbidden-value rules, one ordered list per request category.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Largest body buffered for inspection; longer bodies are rejected.
    pub max_body_bytes: usize,

    /// Header rules. Keys are header names, values are `,`/`;` delimited lists.
    pub headers: Vec<ListRuleConfig>,

    /// Query parameter rules. Same value format as headers.
    pub query: Vec<ListRuleConfig>,

    /// JSON body rules.
    pub body: BodyRulesConfig,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            headers: Vec::new(),
            query: Vec::new(),
            body: BodyRulesConfig::default(),
        }
    }
}

/// A header or query rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ListRuleConfig {
    pub key: String,
    pub value: String,
}

/// Body rule configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BodyRulesConfig {
    /// Reserved. Accepted but not evaluated.
    pub regex: String,

    /// Rules matched against top-level fields of a JSON object body.
    pub json: Vec<JsonRuleConfig>,
}

/// A body rule. The value may be a string, bool, number or an array of those.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct JsonRuleConfig {
    pub key: String,
    pub value: Value,
}

impl ListRuleConfig {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl JsonRuleConfig {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl FilterConfig {
    /// True when any body rule, including the reserved regex, is configured.
    pub fn has_body_rules(&self) -> bool {
        !self.body.regex.is_empty() || !self.body.json.is_empty()
    }
}
