//! Header rows handed to the display layer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single displayable header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDisplay {
    /// Row label.
    pub title: String,

    /// Row content; interpreted as markup when `html` is set.
    pub value: String,

    /// Whether `value` is trusted HTML rather than plain text.
    pub html: bool,
}

impl HeaderDisplay {
    /// A plain-text row.
    pub fn text(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            html: false,
        }
    }
}

/// Header rows keyed by field id, in display order.
pub type HeaderOutput = IndexMap<String, HeaderDisplay>;
