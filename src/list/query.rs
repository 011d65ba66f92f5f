use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Filters applied to a workflow listing, keyed by filter name.
///
/// Keys iterate in sorted order so the serialized query string is stable
/// for a given set of filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListQuery(BTreeMap<String, String>);

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize as `key=value` pairs joined by `&`. Keys are sent as given,
    /// values are encoded like `encodeURIComponent`.
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}={}", encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Characters `encodeURIComponent` leaves alone on top of the unreserved set.
const COMPONENT_SAFE: &[char] = &['!', '\'', '(', ')', '*'];

/// Percent-encode a query value the way browsers' `encodeURIComponent` does.
pub fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if COMPONENT_SAFE.contains(&c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ListQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parse a `key=value` filter argument.
pub fn parse_filter(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AppError::InvalidState(format!("Filter must be key=value: {raw}")))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::InvalidState(format!("Filter key is empty: {raw}")));
    }

    Ok((key.to_string(), value.to_string()))
}
