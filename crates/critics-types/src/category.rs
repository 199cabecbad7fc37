//! Category types

use serde::{Deserialize, Serialize};

/// Category record stored at `categories/{id}`.
///
/// The owning board is not stored here; `Board::categories` is the record
/// of that link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub caption: String,
    /// May contain duplicates.
    #[serde(default)]
    pub restaurants: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            restaurants: Vec::new(),
        }
    }
}
