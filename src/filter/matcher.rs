//! Rule matchers for headers, query parameters and JSON bodies.
//!
//! # Design Decisions
//! - Only the first rule whose key is present is evaluated; its outcome is final
//! - Key comparison is exact and case-sensitive
//! - Matchers are pure: no logging, no response writing

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::filter::compare::{compare_delimited_list, compare_json_value};
use crate::filter::container::MultiValueContainer;
use crate::filter::rules::{JsonRuleSet, ListRuleSet};
use crate::filter::value::TaggedValue;

/// Where in the request a forbidden value was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Header,
    Query,
    Body,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Header => "header",
            Location::Query => "query",
            Location::Body => "body",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A forbidden (key, value) pair found in a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub location: Location,
    pub key: String,
    pub value: String,
}

/// Trait for finding forbidden values in one part of a request.
pub trait Matcher: Send + Sync + fmt::Debug {
    type Input: ?Sized;

    /// Returns the first forbidden value, if any.
    fn find_match(&self, input: &Self::Input) -> Option<Match>;

    /// True when no rules are configured.
    fn is_empty(&self) -> bool;
}

fn match_list(location: Location, rules: &ListRuleSet, input: &MultiValueContainer) -> Option<Match> {
    let (rule, values) = rules.first_present(|key| input.get(key))?;
    compare_delimited_list(&rule.pattern, values).map(|value| Match {
        location,
        key: rule.key.clone(),
        value: value.to_string(),
    })
}

/// Matches header rules against request headers.
#[derive(Debug, Clone, Default)]
pub struct HeaderMatcher {
    rules: ListRuleSet,
}

impl HeaderMatcher {
    pub fn new(rules: ListRuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ListRuleSet {
        &self.rules
    }
}

impl Matcher for HeaderMatcher {
    type Input = MultiValueContainer;

    fn find_match(&self, input: &MultiValueContainer) -> Option<Match> {
        match_list(Location::Header, &self.rules, input)
    }

    fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Matches query rules against decoded query parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryMatcher {
    rules: ListRuleSet,
}

impl QueryMatcher {
    pub fn new(rules: ListRuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ListRuleSet {
        &self.rules
    }
}

impl Matcher for QueryMatcher {
    type Input = MultiValueContainer;

    fn find_match(&self, input: &MultiValueContainer) -> Option<Match> {
        match_list(Location::Query, &self.rules, input)
    }

    fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A decoded JSON request body: top-level field → tagged value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyDocument {
    fields: HashMap<String, TaggedValue>,
}

impl BodyDocument {
    /// Decode a body that must hold exactly one JSON object.
    ///
    /// A bare `null` decodes to an empty document.
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let object: Option<Map<String, Value>> = serde_json::from_slice(bytes)?;
        Ok(object.map(Self::from).unwrap_or_default())
    }

    pub fn get(&self, key: &str) -> Option<&TaggedValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for BodyDocument {
    fn from(object: Map<String, Value>) -> Self {
        Self {
            fields: object
                .into_iter()
                .map(|(k, v)| (k, TaggedValue::from(v)))
                .collect(),
        }
    }
}

/// Matches body rules against a decoded JSON document.
#[derive(Debug, Clone, Default)]
pub struct BodyMatcher {
    rules: JsonRuleSet,
}

impl BodyMatcher {
    pub fn new(rules: JsonRuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &JsonRuleSet {
        &self.rules
    }
}

impl Matcher for BodyMatcher {
    type Input = BodyDocument;

    fn find_match(&self, input: &BodyDocument) -> Option<Match> {
        let (rule, actual) = self.rules.first_present(|key| input.get(key))?;
        compare_json_value(&rule.pattern, actual).map(|value| Match {
            location: Location::Body,
            key: rule.key.clone(),
            value: value.to_string(),
        })
    }

    fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
