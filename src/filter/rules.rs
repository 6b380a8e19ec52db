//! Compiled forbidden-value rules.
//!
//! # Design Decisions
//! - Rules are ordered sequences, never maps, so "first rule wins" is
//!   deterministic
//! - Compiled once from configuration, immutable afterwards
//! - Keys are stored exactly as configured

use std::fmt;

use crate::filter::value::TaggedValue;

/// A single forbidden-value rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<P> {
    pub key: String,
    pub pattern: P,
}

impl<P> Rule<P> {
    pub fn new(key: impl Into<String>, pattern: P) -> Self {
        Self {
            key: key.into(),
            pattern,
        }
    }
}

/// An ordered set of rules for one request category.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet<P> {
    rules: Vec<Rule<P>>,
}

impl<P> Default for RuleSet<P> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<P> RuleSet<P> {
    pub fn new(rules: Vec<Rule<P>>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule<P>> {
        self.rules.iter()
    }

    /// Find the first rule whose key `lookup` resolves, in rule order.
    ///
    /// Later rules are not consulted once a key is present, whatever the
    /// caller then decides about its values.
    pub fn first_present<'a, T, F>(&'a self, mut lookup: F) -> Option<(&'a Rule<P>, T)>
    where
        F: FnMut(&str) -> Option<T>,
    {
        self.rules
            .iter()
            .find_map(|rule| lookup(&rule.key).map(|found| (rule, found)))
    }
}

impl<P> FromIterator<Rule<P>> for RuleSet<P> {
    fn from_iter<I: IntoIterator<Item = Rule<P>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Header and query rules carry a delimited string pattern.
pub type ListRuleSet = RuleSet<String>;

/// Body rules carry a JSON-typed pattern.
pub type JsonRuleSet = RuleSet<TaggedValue>;

impl<P: fmt::Display> fmt::Display for RuleSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "  {} = {}", rule.key, rule.pattern)?;
        }
        Ok(())
    }
}
