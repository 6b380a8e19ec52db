//! Request inspection engine.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, headers, query, body)
//!     → decision.rs (TRACE pre-check when body rules exist)
//!     → container.rs (headers / query → MultiValueContainer)
//!     → matcher.rs (first present rule key, then compare.rs)
//!     → body buffered into Bytes, decoded to TaggedValues (value.rs)
//!     → Return: request with intact body, or Rejection
//!
//! Rule Compilation (at startup / reload):
//!     FilterConfig
//!     → validation
//!     → ordered RuleSets (rules.rs)
//!     → Freeze as immutable RequestFilter
//! ```
//!
//! # Design Decisions
//! - Rules compiled once, immutable at runtime
//! - Deterministic: rule order decides which key is evaluated
//! - No regex in the hot path
//! - Short-circuit on the first forbidden value

pub mod compare;
pub mod container;
pub mod decision;
pub mod matcher;
pub mod rules;
pub mod value;

pub use container::MultiValueContainer;
pub use decision::{Rejection, RequestFilter};
pub use matcher::{BodyDocument, BodyMatcher, HeaderMatcher, Location, Match, Matcher, QueryMatcher};
pub use rules::{Rule, RuleSet};
pub use value::TaggedValue;
