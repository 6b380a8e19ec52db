//! Request inspection and verdict.
//!
//! # State Machine
//! ```text
//! Inspecting
//!     → body rules + TRACE        → Rejected(MethodForbidden)   403
//!     → header rule matched       → Rejected(ForbiddenContent)  403
//!     → query rule matched        → Rejected(ForbiddenContent)  403
//!     → body unreadable           → Rejected(BodyRead)          400
//!     → body not a JSON object    → Rejected(BodyDecode)        400
//!     → body rule matched         → Rejected(ForbiddenContent)  403
//!     → Allowed (original request, body bytes restored)
//! ```

use std::fmt;

use axum::{
    body::{Body, Bytes},
    http::{request::Parts, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::schema::FilterConfig;
use crate::config::validation::{validate_filter, ValidationError};
use crate::filter::compare::compile_pattern;
use crate::filter::container::MultiValueContainer;
use crate::filter::matcher::{
    BodyDocument, BodyMatcher, HeaderMatcher, Location, Match, Matcher, QueryMatcher,
};
use crate::filter::rules::Rule;

/// Why a request was not forwarded.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("({location} {key}: {value}) is forbidden")]
    ForbiddenContent {
        location: Location,
        key: String,
        value: String,
    },

    #[error("{method} request is forbidden while body rules are configured")]
    MethodForbidden { method: Method },

    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error("failed to decode request body: {0}")]
    BodyDecode(#[from] serde_json::Error),
}

impl Rejection {
    /// Status code written to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::ForbiddenContent { .. } | Rejection::MethodForbidden { .. } => {
                StatusCode::FORBIDDEN
            }
            Rejection::BodyRead(_) | Rejection::BodyDecode(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::ForbiddenContent { .. } => "forbidden_content",
            Rejection::MethodForbidden { .. } => "method_forbidden",
            Rejection::BodyRead(_) => "body_read_error",
            Rejection::BodyDecode(_) => "body_decode_error",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

/// The compiled, immutable inspection engine.
///
/// Built once from a [`FilterConfig`] and shared behind an `Arc` by every
/// request; nothing on the request path mutates it.
#[derive(Debug, Clone)]
pub struct RequestFilter {
    headers: HeaderMatcher,
    query: QueryMatcher,
    body: BodyMatcher,
    body_regex: String,
    max_body_bytes: usize,
}

impl Default for RequestFilter {
    /// A filter with no rules: every request is allowed.
    fn default() -> Self {
        Self {
            headers: HeaderMatcher::default(),
            query: QueryMatcher::default(),
            body: BodyMatcher::default(),
            body_regex: String::new(),
            max_body_bytes: FilterConfig::default().max_body_bytes,
        }
    }
}

impl RequestFilter {
    /// Validate and compile filter rules.
    pub fn from_config(config: &FilterConfig) -> Result<Self, Vec<ValidationError>> {
        validate_filter(config)?;

        // Keys are matched as written against canonical header names.
        let headers = config
            .headers
            .iter()
            .map(|rule| Rule::new(rule.key.clone(), rule.value.clone()))
            .collect();
        let query = config
            .query
            .iter()
            .map(|rule| Rule::new(rule.key.clone(), rule.value.clone()))
            .collect();
        let body = config
            .body
            .json
            .iter()
            .map(|rule| Rule::new(rule.key.clone(), compile_pattern(rule.value.clone())))
            .collect();

        Ok(Self {
            headers: HeaderMatcher::new(headers),
            query: QueryMatcher::new(query),
            body: BodyMatcher::new(body),
            body_regex: config.body.regex.clone(),
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// True when any body rule, including the reserved regex, is configured.
    pub fn has_body_rules(&self) -> bool {
        !self.body.is_empty() || !self.body_regex.is_empty()
    }

    /// True when no rule of any kind is configured.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.query.is_empty() && !self.has_body_rules()
    }

    /// Method pre-check, then header and query rules.
    pub fn inspect_parts(&self, parts: &Parts) -> Result<(), Rejection> {
        if self.has_body_rules() && parts.method == Method::TRACE {
            return Err(Rejection::MethodForbidden {
                method: parts.method.clone(),
            });
        }

        if !self.headers.is_empty() {
            let headers = MultiValueContainer::from_headers(&parts.headers);
            if let Some(m) = self.headers.find_match(&headers) {
                return Err(forbidden(m));
            }
        }

        if !self.query.is_empty() {
            let query = MultiValueContainer::from_query(parts.uri.query());
            if let Some(m) = self.query.find_match(&query) {
                return Err(forbidden(m));
            }
        }

        Ok(())
    }

    /// Decode a buffered, non-empty body and apply body rules.
    pub fn inspect_body(&self, bytes: &[u8]) -> Result<(), Rejection> {
        if self.body.is_empty() || bytes.is_empty() {
            return Ok(());
        }
        let document = BodyDocument::decode(bytes)?;
        match self.body.find_match(&document) {
            Some(m) => Err(forbidden(m)),
            None => Ok(()),
        }
    }

    /// Run the full inspection.
    ///
    /// On success the request is handed back with its body content intact:
    /// when the body had to be buffered it is rebuilt over the same bytes.
    pub async fn filter(&self, request: Request<Body>) -> Result<Request<Body>, Rejection> {
        let (parts, body) = request.into_parts();
        self.inspect_parts(&parts)?;

        if self.body.is_empty() {
            return Ok(Request::from_parts(parts, body));
        }

        let bytes: Bytes = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(Rejection::BodyRead)?;
        self.inspect_body(&bytes)?;

        Ok(Request::from_parts(parts, Body::from(bytes)))
    }
}

fn forbidden(m: Match) -> Rejection {
    Rejection::ForbiddenContent {
        location: m.location,
        key: m.key,
        value: m.value,
    }
}

impl fmt::Display for RequestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "headers ({} rules)", self.headers.rules().len())?;
        if !self.headers.is_empty() {
            writeln!(f, "{}", self.headers.rules())?;
        }
        writeln!(f, "query ({} rules)", self.query.rules().len())?;
        if !self.query.is_empty() {
            writeln!(f, "{}", self.query.rules())?;
        }
        writeln!(f, "body ({} rules)", self.body.rules().len())?;
        if !self.body.is_empty() {
            writeln!(f, "{}", self.body.rules())?;
        }
        if !self.body_regex.is_empty() {
            writeln!(f, "body regex (reserved, not evaluated): {}", self.body_regex)?;
        }
        write!(f, "max body bytes: {}", self.max_body_bytes)
    }
}
