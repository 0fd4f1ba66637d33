//! Analysis kinds and their per-kind graph conventions

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The provider analyses the engine understands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    /// Named entity extraction
    Entities,
    /// Key phrase detection
    KeyPhrases,
    /// Document classification
    Categories,
    /// Document-level sentiment (stream call shape only)
    Sentiment,
}

impl AnalysisKind {
    /// Primary label of nodes derived from this analysis
    pub fn node_label(&self) -> Option<&'static str> {
        match self {
            AnalysisKind::Entities => Some("Entity"),
            AnalysisKind::KeyPhrases => Some("KeyPhrase"),
            AnalysisKind::Categories => Some("Category"),
            AnalysisKind::Sentiment => None,
        }
    }

    /// Default relationship type from source documents to derived nodes
    pub fn default_relationship_type(&self) -> Option<&'static str> {
        match self {
            AnalysisKind::Entities => Some("ENTITY"),
            AnalysisKind::KeyPhrases => Some("KEY_PHRASE"),
            AnalysisKind::Categories => Some("CATEGORY"),
            AnalysisKind::Sentiment => None,
        }
    }

    /// Fields that identify a derived node of this kind
    pub fn identity_fields(&self) -> &'static [&'static str] {
        match self {
            AnalysisKind::Sentiment => &[],
            _ => &["text"],
        }
    }

    /// Whether items of this kind carry a type tag that becomes a label
    pub fn typed_items(&self) -> bool {
        matches!(self, AnalysisKind::Entities)
    }

    /// Whether this analysis can be rendered as a graph
    pub fn supports_graph(&self) -> bool {
        !matches!(self, AnalysisKind::Sentiment)
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisKind::Entities => write!(f, "entities"),
            AnalysisKind::KeyPhrases => write!(f, "key-phrases"),
            AnalysisKind::Categories => write!(f, "categories"),
            AnalysisKind::Sentiment => write!(f, "sentiment"),
        }
    }
}

impl std::str::FromStr for AnalysisKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entities" => Ok(AnalysisKind::Entities),
            "key-phrases" => Ok(AnalysisKind::KeyPhrases),
            "categories" => Ok(AnalysisKind::Categories),
            "sentiment" => Ok(AnalysisKind::Sentiment),
            other => Err(CoreError::Validation(format!(
                "unknown analysis kind `{other}` (expected entities, key-phrases, categories or sentiment)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            AnalysisKind::Entities,
            AnalysisKind::KeyPhrases,
            AnalysisKind::Categories,
            AnalysisKind::Sentiment,
        ] {
            assert_eq!(kind.to_string().parse::<AnalysisKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_graph_kinds() {
        assert!(AnalysisKind::Entities.supports_graph());
        assert!(AnalysisKind::KeyPhrases.supports_graph());
        assert!(AnalysisKind::Categories.supports_graph());
        assert!(!AnalysisKind::Sentiment.supports_graph());
    }

    #[test]
    fn test_only_entities_are_typed() {
        assert!(AnalysisKind::Entities.typed_items());
        assert!(!AnalysisKind::KeyPhrases.typed_items());
        assert!(!AnalysisKind::Categories.typed_items());
    }
}
