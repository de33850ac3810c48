//! Message identity, headers, and the read-only message view.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::mime::MimePart;

/// Opaque message identifier assigned by the mail store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageUid(String);

impl MessageUid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageUid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageUid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for MessageUid {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Unfolded header fields in message order.
///
/// Lookups are case-insensitive; duplicate names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMap {
    fields: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. The name keeps its original spelling.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The raw `Content-Type` value, parameters included.
    pub fn content_type(&self) -> Option<&str> {
        self.get("content-type")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A stored message as seen by the verification pipeline.
///
/// Owned by the mail store; the pipeline only reads it.
#[derive(Debug, Clone)]
pub struct Message {
    /// Store-assigned identifier used to fetch the raw bytes again.
    pub uid: MessageUid,

    /// Top-level header fields.
    pub headers: HeaderMap,

    /// Parsed MIME tree. `None` when the body could not be parsed.
    pub structure: Option<MimePart>,
}

impl Message {
    pub fn new(uid: impl Into<MessageUid>, headers: HeaderMap, structure: Option<MimePart>) -> Self {
        Self {
            uid: uid.into(),
            headers,
            structure,
        }
    }

    /// Shorthand for the top-level `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.content_type()
    }
}
