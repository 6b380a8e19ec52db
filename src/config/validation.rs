//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate rule keys, header names and body pattern types
//! - Validate value ranges (timeouts > 0, body limit > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderName;
use serde_json::Value;
use thiserror::Error;

use crate::config::schema::{FilterConfig, ListRuleConfig, ProxyConfig};
use crate::filter::compare::split_tokens;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{section} rule #{index} has an empty key")]
    EmptyKey { section: &'static str, index: usize },

    #[error("{section} rule `{key}` is listed more than once; only the first can ever apply")]
    DuplicateKey { section: &'static str, key: String },

    #[error("{section} rule `{key}` has no values to forbid")]
    EmptyPattern { section: &'static str, key: String },

    #[error("header rule `{key}` is not a valid header name")]
    InvalidHeaderName { key: String },

    #[error("body rule `{key}` has an unsupported {found} value; expected string, bool, number or array of those")]
    UnsupportedPattern { key: String, found: &'static str },

    #[error("filter.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("{field} `{value}` is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate the whole proxy configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "upstream.address", &config.upstream.address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if let Err(filter_errors) = validate_filter(&config.filter) {
        errors.extend(filter_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the filter rules alone.
pub fn validate_filter(filter: &FilterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if filter.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    check_list_rules(&mut errors, "header", &filter.headers);
    check_list_rules(&mut errors, "query", &filter.query);
    for rule in &filter.headers {
        if !rule.key.is_empty() && HeaderName::from_bytes(rule.key.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName {
                key: rule.key.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for (index, rule) in filter.body.json.iter().enumerate() {
        if rule.key.is_empty() {
            errors.push(ValidationError::EmptyKey {
                section: "body",
                index,
            });
            continue;
        }
        if !seen.insert(rule.key.as_str()) {
            errors.push(ValidationError::DuplicateKey {
                section: "body",
                key: rule.key.clone(),
            });
        }
        if let Some(found) = unsupported_pattern(&rule.value) {
            errors.push(ValidationError::UnsupportedPattern {
                key: rule.key.clone(),
                found,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_list_rules(errors: &mut Vec<ValidationError>, section: &'static str, rules: &[ListRuleConfig]) {
    let mut seen = HashSet::new();
    for (index, rule) in rules.iter().enumerate() {
        if rule.key.is_empty() {
            errors.push(ValidationError::EmptyKey { section, index });
            continue;
        }
        if !seen.insert(rule.key.as_str()) {
            errors.push(ValidationError::DuplicateKey {
                section,
                key: rule.key.clone(),
            });
        }
        if split_tokens(&rule.value).next().is_none() {
            errors.push(ValidationError::EmptyPattern {
                section,
                key: rule.key.clone(),
            });
        }
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn unsupported_pattern(value: &Value) -> Option<&'static str> {
    match value {
        Value::String(_) | Value::Bool(_) | Value::Number(_) => None,
        Value::Array(items) => items.iter().find_map(|item| match item {
            Value::String(_) | Value::Bool(_) | Value::Number(_) => None,
            Value::Array(_) => Some("nested array"),
            Value::Object(_) => Some("table"),
            Value::Null => Some("null"),
        }),
        Value::Object(_) => Some("table"),
        Value::Null => Some("null"),
    }
}
