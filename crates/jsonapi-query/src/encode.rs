//! Query pair collection and percent-encoding.
//!
//! [`QueryPairs`] gathers raw `(key, value)` pairs, orders them by key and
//! renders them as `key=value&...` with both sides percent-encoded the way
//! browsers' `encodeURIComponent` does.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Display;

/// Characters escaped in a URI component: everything except ASCII
/// alphanumerics and `-_.!~*'()`.
pub const URI_COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single key or value.
#[must_use]
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT_ENCODE_SET).to_string()
}

/// Builder for assembling raw query pairs.
#[derive(Debug, Default, Clone)]
pub struct QueryPairs {
    pairs: Vec<(String, String)>,
}

impl QueryPairs {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair.
    pub fn push<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Display,
    {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: impl Into<String>, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Append the items joined by `,` unless there are none.
    pub fn push_joined(&mut self, key: impl Into<String>, items: &[String]) {
        if !items.is_empty() {
            self.pairs.push((key.into(), items.join(",")));
        }
    }

    /// Stable-sort the pairs by raw key.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
        self
    }

    /// Render as `key=value` pairs joined by `&`, both sides percent-encoded.
    #[must_use]
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Number of pairs collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no pairs have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_opt_skips_none() {
        let mut pairs = QueryPairs::new();
        pairs.push_opt("page", Option::<u32>::None);
        assert!(pairs.is_empty());
    }

    #[test]
    fn push_joined_skips_empty() {
        let mut pairs = QueryPairs::new();
        pairs.push_joined("sort", &[]);
        pairs.push_joined("include", &["a".to_string(), "b".to_string()]);
        assert_eq!(
            pairs.into_pairs(),
            vec![("include".to_string(), "a,b".to_string())]
        );
    }

    #[test]
    fn sorted_is_stable_by_key() {
        let mut pairs = QueryPairs::new();
        pairs.push("z", "1");
        pairs.push("filter[a]", "first");
        pairs.push("a", "2");
        pairs.push("filter[a]", "second");
        let sorted = pairs.sorted().into_pairs();
        assert_eq!(
            sorted,
            vec![
                ("a".to_string(), "2".to_string()),
                ("filter[a]".to_string(), "first".to_string()),
                ("filter[a]".to_string(), "second".to_string()),
                ("z".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn encode_component_matches_uri_component_rules() {
        assert_eq!(encode_component("filter[a]"), "filter%5Ba%5D");
        assert_eq!(encode_component("y,s"), "y%2Cs");
        assert_eq!(encode_component("a b"), "a%20b");
        assert_eq!(encode_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_component("a&b=c/d?"), "a%26b%3Dc%2Fd%3F");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn encode_joins_pairs() {
        let mut pairs = QueryPairs::new();
        pairs.push("a", "b");
        pairs.push("page", 3);
        assert_eq!(pairs.encode(), "a=b&page=3");
        assert_eq!(QueryPairs::new().encode(), "");
    }
}
