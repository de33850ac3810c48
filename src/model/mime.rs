//! MIME part tree as produced by the structure parser.

use serde::{Deserialize, Serialize};

/// One node of a (possibly nested) MIME body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimePart {
    /// Lowercase `type/subtype`, without parameters.
    pub mimetype: String,

    /// Child parts in body order. Empty for leaf parts.
    pub parts: Vec<MimePart>,
}

impl MimePart {
    /// A leaf part of the given media type.
    pub fn leaf(mimetype: &str) -> Self {
        Self {
            mimetype: mimetype.trim().to_lowercase(),
            parts: Vec::new(),
        }
    }

    /// A container part with the given children.
    pub fn multipart(mimetype: &str, parts: Vec<MimePart>) -> Self {
        Self {
            mimetype: mimetype.trim().to_lowercase(),
            parts,
        }
    }

    /// Whether this part's media type equals `mimetype`, ignoring ASCII case.
    pub fn is(&self, mimetype: &str) -> bool {
        self.mimetype.eq_ignore_ascii_case(mimetype)
    }
}
