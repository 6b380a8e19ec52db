//! Ordered multi-value containers for headers and query parameters.

use axum::http::HeaderMap;

/// An ordered key → values mapping where a key may repeat.
///
/// Keys keep the order in which they were first seen; values keep arrival
/// order under their key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiValueContainer {
    entries: Vec<(String, Vec<String>)>,
}

impl MultiValueContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((key, vec![value.into()])),
        }
    }

    /// Values for an exact, case-sensitive key.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from request headers.
    ///
    /// Header names are stored in canonical form (`X-Request-Id`), whatever
    /// case they arrived in. Values that are not valid UTF-8 are decoded
    /// lossily so that they can still be compared.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut container = Self::new();
        for (name, value) in headers {
            container.append(
                canonical_header_name(name.as_str()),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        container
    }

    /// Build from a raw query string (without the leading `?`).
    ///
    /// Pairs are percent-decoded and `+` is read as a space.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut container = Self::new();
        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                container.append(key, value);
            }
        }
        container
    }
}

/// Upper-case the first letter and every letter after a `-`, lower-case the rest.
fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

impl<K, V> FromIterator<(K, V)> for MultiValueContainer
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut container = Self::new();
        for (key, value) in iter {
            container.append(key, value);
        }
        container
    }
}
