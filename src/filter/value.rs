//! Runtime-tagged values used for type-aware comparison.
//!
//! Both sides of a body comparison end up here: configured patterns are
//! converted once when the rules are compiled, request documents once per
//! decoded body. Comparisons then dispatch on the tag pair instead of probing
//! types at match time.

use std::fmt;

use serde_json::{Map, Value};

/// A JSON-shaped value carrying an explicit type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    String(String),
    Bool(bool),
    Number(f64),
    Array(Vec<TaggedValue>),
    /// JSON `null`. Never matches a pattern.
    Null,
    /// Nested JSON object. Carried for logging only, never compared.
    Object(Map<String, Value>),
}

impl From<Value> for TaggedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => TaggedValue::String(s),
            Value::Bool(b) => TaggedValue::Bool(b),
            // as_f64 only fails with serde_json's `arbitrary_precision`
            Value::Number(n) => n.as_f64().map_or(TaggedValue::Null, TaggedValue::Number),
            Value::Array(items) => {
                TaggedValue::Array(items.into_iter().map(TaggedValue::from).collect())
            }
            Value::Null => TaggedValue::Null,
            Value::Object(map) => TaggedValue::Object(map),
        }
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaggedValue::String(s) => f.write_str(s),
            TaggedValue::Bool(b) => write!(f, "{}", b),
            TaggedValue::Number(n) => write!(f, "{}", n),
            TaggedValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            TaggedValue::Null => f.write_str("null"),
            TaggedValue::Object(map) => write!(f, "{}", Value::Object(map.clone())),
        }
    }
}

/// Parse a string the way Go's `strconv.ParseBool` does.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`, nothing else.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse a string as a 64-bit float.
///
/// Rust's float grammar also accepts `inf`, `infinity` and `nan` in any case.
pub fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_tags() {
        assert_eq!(TaggedValue::from(json!("a")), TaggedValue::String("a".into()));
        assert_eq!(TaggedValue::from(json!(true)), TaggedValue::Bool(true));
        assert_eq!(TaggedValue::from(json!(3)), TaggedValue::Number(3.0));
        assert_eq!(TaggedValue::from(json!(null)), TaggedValue::Null);
        assert_eq!(
            TaggedValue::from(json!(["x", 1, false])),
            TaggedValue::Array(vec![
                TaggedValue::String("x".into()),
                TaggedValue::Number(1.0),
                TaggedValue::Bool(false),
            ])
        );
        assert!(matches!(TaggedValue::from(json!({"a": 1})), TaggedValue::Object(_)));
    }

    #[test]
    fn test_parse_bool_vocabulary() {
        for s in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(s), Some(true), "{}", s);
        }
        for s in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(s), Some(false), "{}", s);
        }
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool("tRUE"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_display() {
        let v = TaggedValue::from(json!(["a", 2, true]));
        assert_eq!(v.to_string(), "[a,2,true]");
        assert_eq!(TaggedValue::Number(1.5).to_string(), "1.5");
    }
}
