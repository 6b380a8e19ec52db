//! Type-aware value comparison shared by all matchers.
//!
//! # Coercion table
//! | pattern | actual | rule                                   |
//! |---------|--------|----------------------------------------|
//! | string  | bool   | pattern parsed as bool, then equality  |
//! | string  | number | pattern parsed as f64, then equality   |
//! | string  | string | raw string equality                    |
//! | bool    | bool   | equality                               |
//! | number  | number | equality                               |
//! | array   | array  | any (pattern, actual) element pair     |
//! | array   | scalar | any pattern element equals the actual  |
//! | *       | *      | no match                               |
//!
//! Array pattern elements are converted once by [`compile_pattern`]: a string
//! element becomes a bool if it parses as one, else a number, else stays a
//! string. Elements are then compared by tag and value with no further
//! coercion.
//!
//! Type mismatches are not errors, they simply never match.

use serde_json::Value;

use crate::filter::value::{parse_bool, parse_number, TaggedValue};

/// Compare a configured string pattern against an observed string value.
///
/// The pattern is tried as a bool, then as a number; if `actual` parses the
/// same way to an equal value it matches. Otherwise the two strings must be
/// identical.
pub fn compare_scalar(pattern: &str, actual: &str) -> bool {
    if let Some(p) = parse_bool(pattern) {
        if parse_bool(actual) == Some(p) {
            return true;
        }
    }
    if let Some(p) = parse_number(pattern) {
        if parse_number(actual) == Some(p) {
            return true;
        }
    }
    pattern == actual
}

/// Split a delimited list on `,` and `;`, dropping empty tokens.
///
/// Tokens are not trimmed: `"a, b"` yields `"a"` and `" b"`.
pub fn split_tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split([',', ';']).filter(|token| !token.is_empty())
}

/// Match a delimited pattern list against the values observed for one key.
///
/// Iteration is token-major, then value-major; the first observed value equal
/// to a pattern token is returned. Observed values are compared whole, never
/// split.
pub fn compare_delimited_list<'a>(pattern: &str, actual_values: &'a [String]) -> Option<&'a str> {
    for token in split_tokens(pattern) {
        if let Some(value) = actual_values.iter().find(|value| *value == token) {
            return Some(value.as_str());
        }
    }
    None
}

/// Convert a configured body pattern into its compiled form.
///
/// Scalars keep their JSON tag and are coerced at match time. String elements
/// of an array pattern are typed here, bool before number.
pub fn compile_pattern(value: Value) -> TaggedValue {
    match TaggedValue::from(value) {
        TaggedValue::Array(items) => {
            TaggedValue::Array(items.into_iter().map(compile_element).collect())
        }
        other => other,
    }
}

fn compile_element(element: TaggedValue) -> TaggedValue {
    match element {
        TaggedValue::String(s) => match (parse_bool(&s), parse_number(&s)) {
            (Some(b), _) => TaggedValue::Bool(b),
            (None, Some(n)) => TaggedValue::Number(n),
            (None, None) => TaggedValue::String(s),
        },
        other => other,
    }
}

/// Match a configured JSON pattern against a decoded body value.
///
/// Returns the offending part of `actual`: the matching element when both
/// sides are arrays, `actual` itself otherwise.
pub fn compare_json_value<'a>(
    pattern: &TaggedValue,
    actual: &'a TaggedValue,
) -> Option<&'a TaggedValue> {
    match (pattern, actual) {
        (TaggedValue::Array(patterns), TaggedValue::Array(actuals)) => patterns
            .iter()
            .find_map(|p| actuals.iter().find(|a| element_eq(p, a))),
        (TaggedValue::Array(patterns), _) => patterns
            .iter()
            .any(|p| element_eq(p, actual))
            .then_some(actual),
        _ => scalar_eq(pattern, actual).then_some(actual),
    }
}

fn element_eq(pattern: &TaggedValue, actual: &TaggedValue) -> bool {
    match (pattern, actual) {
        (TaggedValue::String(p), TaggedValue::String(a)) => p == a,
        (TaggedValue::Bool(p), TaggedValue::Bool(a)) => p == a,
        (TaggedValue::Number(p), TaggedValue::Number(a)) => p == a,
        _ => false,
    }
}

fn scalar_eq(pattern: &TaggedValue, actual: &TaggedValue) -> bool {
    match (pattern, actual) {
        (TaggedValue::String(p), TaggedValue::Bool(a)) => parse_bool(p) == Some(*a),
        (TaggedValue::String(p), TaggedValue::Number(a)) => parse_number(p) == Some(*a),
        (TaggedValue::String(p), TaggedValue::String(a)) => p == a,
        (TaggedValue::Bool(p), TaggedValue::Bool(a)) => p == a,
        (TaggedValue::Number(p), TaggedValue::Number(a)) => p == a,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tv(v: serde_json::Value) -> TaggedValue {
        TaggedValue::from(v)
    }

    fn pattern(v: serde_json::Value) -> TaggedValue {
        compile_pattern(v)
    }

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compare_scalar() {
        assert!(compare_scalar("true", "True"));
        assert!(compare_scalar("1", "1.0"));
        assert!(compare_scalar("2.50", "2.5"));
        assert!(compare_scalar("abc", "abc"));
        assert!(!compare_scalar("abc", "abd"));
        assert!(!compare_scalar("true", "yes"));
        assert!(!compare_scalar("3", "three"));
        // NaN never equals itself numerically but the raw strings are equal
        assert!(compare_scalar("NaN", "NaN"));
    }

    #[test]
    fn test_split_tokens() {
        let tokens: Vec<&str> = split_tokens("a, b;;c;").collect();
        assert_eq!(tokens, vec!["a", " b", "c"]);
        assert_eq!(split_tokens(",;").count(), 0);
    }

    #[test]
    fn test_delimited_list_first_match() {
        let actual = values(&["x", "b", "a"]);
        // token-major: "a" is tried before "b"
        assert_eq!(compare_delimited_list("a,b", &actual), Some("a"));
        assert_eq!(compare_delimited_list("b;z", &actual), Some("b"));
        assert_eq!(compare_delimited_list("z", &actual), None);
    }

    #[test]
    fn test_delimited_list_is_raw_equality() {
        let actual = values(&["1.0"]);
        assert_eq!(compare_delimited_list("1", &actual), None);
        assert_eq!(compare_delimited_list("Debug", &values(&["debug"])), None);
    }

    #[test]
    fn test_delimited_list_compares_whole_values() {
        assert_eq!(compare_delimited_list("true", &values(&["a,true"])), None);
        assert_eq!(compare_delimited_list("br", &values(&["gzip, deflate;br"])), None);
        assert_eq!(compare_delimited_list("a,true", &values(&["a,true"])), None);
        // pattern tokens are not trimmed
        assert_eq!(compare_delimited_list("a, b", &values(&["b"])), None);
        assert_eq!(compare_delimited_list("a, b", &values(&[" b"])), Some(" b"));
    }

    #[test]
    fn test_json_scalar_coercion() {
        assert!(compare_json_value(&tv(json!("true")), &tv(json!(true))).is_some());
        assert!(compare_json_value(&tv(json!("false")), &tv(json!(true))).is_none());
        assert!(compare_json_value(&tv(json!("42")), &tv(json!(42))).is_some());
        assert!(compare_json_value(&tv(json!("4.2e1")), &tv(json!(42.0))).is_some());
        assert!(compare_json_value(&tv(json!("admin")), &tv(json!("admin"))).is_some());
        assert!(compare_json_value(&tv(json!(7)), &tv(json!(7))).is_some());
        assert!(compare_json_value(&tv(json!(false)), &tv(json!(false))).is_some());
    }

    #[test]
    fn test_json_string_pattern_equal_to_string_actual() {
        // parses as bool, but the raw strings are still equal
        assert!(compare_json_value(&tv(json!("true")), &tv(json!("true"))).is_some());
        // numeric coercion does not apply to string actuals
        assert!(compare_json_value(&tv(json!("5")), &tv(json!("5.0"))).is_none());
    }

    #[test]
    fn test_json_type_mismatch_never_matches() {
        assert!(compare_json_value(&tv(json!("abc")), &tv(json!(1))).is_none());
        assert!(compare_json_value(&tv(json!("abc")), &tv(json!(true))).is_none());
        assert!(compare_json_value(&tv(json!(true)), &tv(json!(1))).is_none());
        assert!(compare_json_value(&tv(json!(1)), &tv(json!("1"))).is_none());
        assert!(compare_json_value(&tv(json!("a")), &tv(json!(["a"]))).is_none());
        assert!(compare_json_value(&tv(json!("null")), &tv(json!(null))).is_none());
        assert!(compare_json_value(&tv(json!("x")), &tv(json!({"x": 1}))).is_none());
    }

    #[test]
    fn test_mixed_type_open_question() {
        // "1" coerces to the number 1 against a number
        assert!(compare_json_value(&tv(json!("1")), &tv(json!(1))).is_some());
        // and to the bool true against a bool
        assert!(compare_json_value(&tv(json!("1")), &tv(json!(true))).is_some());
        // "one" parses as neither, so a number actual can never match it
        assert!(compare_json_value(&tv(json!("one")), &tv(json!(1))).is_none());
    }

    #[test]
    fn test_json_array_intersection() {
        let pattern = pattern(json!(["a", "b"]));
        let actual = tv(json!(["b", "c"]));
        assert_eq!(
            compare_json_value(&pattern, &actual),
            Some(&TaggedValue::String("b".into()))
        );
        assert!(compare_json_value(&pattern, &tv(json!(["c", "d"]))).is_none());
        assert!(compare_json_value(&pattern, &tv(json!([]))).is_none());
    }

    #[test]
    fn test_json_array_pattern_scalar_actual() {
        let pattern = pattern(json!(["a", "b"]));
        let actual = tv(json!("a"));
        assert_eq!(compare_json_value(&pattern, &actual), Some(&actual));
        assert!(compare_json_value(&pattern, &tv(json!("c"))).is_none());
    }

    #[test]
    fn test_compile_pattern_types_array_elements() {
        assert_eq!(
            pattern(json!(["true", "1", "10", "x", 2, false])),
            TaggedValue::Array(vec![
                TaggedValue::Bool(true),
                TaggedValue::Bool(true),
                TaggedValue::Number(10.0),
                TaggedValue::String("x".into()),
                TaggedValue::Number(2.0),
                TaggedValue::Bool(false),
            ])
        );
        // scalar patterns keep their tag
        assert_eq!(pattern(json!("true")), TaggedValue::String("true".into()));
    }

    #[test]
    fn test_json_array_elements_strict_after_compile() {
        let flags = pattern(json!(["true", "10", "x"]));
        assert!(compare_json_value(&flags, &tv(json!(true))).is_some());
        assert!(compare_json_value(&flags, &tv(json!(10))).is_some());
        assert!(compare_json_value(&flags, &tv(json!([false, 10.0]))).is_some());
        assert!(compare_json_value(&flags, &tv(json!([false, 11]))).is_none());
        assert!(compare_json_value(&flags, &tv(json!("x"))).is_some());

        // typed elements never match their string spelling
        assert!(compare_json_value(&pattern(json!(["true"])), &tv(json!("true"))).is_none());
        assert!(compare_json_value(&pattern(json!(["10"])), &tv(json!("10"))).is_none());
        assert!(compare_json_value(&pattern(json!(["10"])), &tv(json!(["10"]))).is_none());
        // "1" is read as a bool first, so it never equals the number 1
        assert!(compare_json_value(&pattern(json!(["1"])), &tv(json!(1))).is_none());
        assert!(compare_json_value(&pattern(json!(["1"])), &tv(json!(true))).is_some());
    }
}
