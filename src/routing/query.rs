//! Query string decoding.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A decoded query parameter: one value, or every value of a repeated key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// First value, regardless of arity.
    pub fn first(&self) -> Option<&str> {
        match self {
            QueryValue::One(value) => Some(value),
            QueryValue::Many(values) => values.first().map(String::as_str),
        }
    }

    /// All values in order of appearance.
    pub fn values(&self) -> Vec<&str> {
        match self {
            QueryValue::One(value) => vec![value.as_str()],
            QueryValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::One(first) => {
                let first = std::mem::take(first);
                *self = QueryValue::Many(vec![first, value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }
}

/// Decoded query, keyed in order of first appearance.
pub type Query = IndexMap<String, QueryValue>;

/// Decode a raw query string (without the leading `?`).
///
/// A key seen once maps to [`QueryValue::One`]; the second occurrence turns
/// it into [`QueryValue::Many`] holding every value in order.
pub fn parse_query(raw: Option<&str>) -> Query {
    let mut query = Query::new();
    let Some(raw) = raw else {
        return query;
    };

    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        let value = value.into_owned();
        match query.get_mut(&*key) {
            Some(existing) => existing.push(value),
            None => {
                query.insert(key.into_owned(), QueryValue::One(value));
            }
        }
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_key_is_scalar() {
        let query = parse_query(Some("tag=a"));
        assert_eq!(query["tag"], QueryValue::One("a".into()));
    }

    #[test]
    fn test_repeated_key_is_sequence() {
        let query = parse_query(Some("tag=a&tag=b&other=1&tag=c"));
        assert_eq!(
            query["tag"],
            QueryValue::Many(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(query["other"], QueryValue::One("1".into()));
        let keys: Vec<_> = query.keys().collect();
        assert_eq!(keys, ["tag", "other"]);
    }

    #[test]
    fn test_decoding() {
        let query = parse_query(Some("q=hello+world&path=%2Fblog%2F1&empty="));
        assert_eq!(query["q"].first(), Some("hello world"));
        assert_eq!(query["path"].first(), Some("/blog/1"));
        assert_eq!(query["empty"].first(), Some(""));
    }

    #[test]
    fn test_missing_query() {
        assert!(parse_query(None).is_empty());
        assert!(parse_query(Some("")).is_empty());
    }

    #[test]
    fn test_json_shape() {
        let query = parse_query(Some("tag=a&tag=b&ref=home"));
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({"tag": ["a", "b"], "ref": "home"})
        );
    }
}
