//! Extracted items - what a provider detected in one document

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One detection (entity mention, key phrase, category) in one document.
///
/// Produced by the provider normalizers; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    /// Surface text, phrase, or category path
    pub text: String,

    /// Provider type tag (entities carry one, phrases and categories do not)
    pub item_type: Option<String>,

    /// Confidence or salience reported for this detection
    pub score: f64,

    /// Stable provider metadata such as knowledge-base links. Per-mention
    /// values (offsets, scores) never go here.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ExtractedItem {
    /// Create a new item
    pub fn new(text: impl Into<String>, score: f64) -> Self {
        Self {
            text: text.into(),
            item_type: None,
            score,
            extra: BTreeMap::new(),
        }
    }

    /// Builder: set the provider type tag
    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    /// Builder: attach one metadata entry
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Value of an identity field on this item
    pub fn field_value(&self, field: &str) -> String {
        match field {
            "text" => self.text.clone(),
            other => self.extra.get(other).cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_builder() {
        let item = ExtractedItem::new("Paris", 0.92)
            .with_type("LOCATION")
            .with_extra("wikipedia_url", "https://en.wikipedia.org/wiki/Paris");

        assert_eq!(item.text, "Paris");
        assert_eq!(item.item_type.as_deref(), Some("LOCATION"));
        assert_eq!(item.score, 0.92);
        assert_eq!(item.field_value("text"), "Paris");
        assert_eq!(
            item.field_value("wikipedia_url"),
            "https://en.wikipedia.org/wiki/Paris"
        );
    }
}
