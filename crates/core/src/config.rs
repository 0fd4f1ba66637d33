//! Annotation run configuration

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::kind::AnalysisKind;

/// Property set on derived relationships to hold the detection score
pub const WEIGHT_PROPERTY: &str = "score";

/// Documents per provider request unless overridden
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Configuration for one annotation invocation.
///
/// Deserializes from the user-facing JSON config with every field optional.
/// [`NlpConfig::validate`] is the single gate; nothing downstream probes
/// for presence again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NlpConfig {
    /// Provider API key
    pub key: Option<String>,

    /// Document property holding the text to analyze
    pub node_property: String,

    /// Persist derived nodes and relationships instead of building a
    /// virtual graph
    pub write: bool,

    /// Override for the per-kind relationship type
    pub relationship_type: Option<String>,

    /// Detections scoring strictly below this are dropped
    pub confidence_cutoff: f64,

    /// Documents per provider request
    pub batch_size: usize,

    /// Whether the label set participates in node identity
    pub match_labels: bool,

    /// Use the offline dummy client instead of a live provider
    #[serde(rename = "unsupportedDummyClient")]
    pub use_dummy_client: bool,
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            key: None,
            node_property: "text".to_string(),
            write: false,
            relationship_type: None,
            confidence_cutoff: 0.0,
            batch_size: DEFAULT_BATCH_SIZE,
            match_labels: true,
            use_dummy_client: false,
        }
    }
}

impl NlpConfig {
    /// Validate the whole configuration up front.
    ///
    /// Runs before any document is read or any request is sent, so a bad
    /// config can never leave a half-processed invocation behind.
    pub fn validate(&self) -> Result<()> {
        if self.key.is_none() && !self.use_dummy_client {
            return Err(CoreError::MissingConfig("key".to_string()));
        }
        if self.batch_size == 0 {
            return Err(CoreError::InvalidBatchSize(0));
        }
        if let Some(rel_type) = &self.relationship_type {
            validate_identifier(rel_type)?;
        }
        Ok(())
    }

    /// Relationship type effective for `kind`: the configured override, or
    /// the kind's default.
    pub fn resolved_relationship_type(&self, kind: AnalysisKind) -> Result<String> {
        if let Some(rel_type) = &self.relationship_type {
            return Ok(rel_type.clone());
        }
        kind.default_relationship_type()
            .map(str::to_string)
            .ok_or_else(|| CoreError::UnsupportedGraphKind(kind.to_string()))
    }
}

/// Reject anything that is not a bare identifier.
///
/// Relationship types and property names end up spliced into storage
/// statements, so they must never carry quoting or punctuation.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NlpConfig::default();

        assert_eq!(config.node_property, "text");
        assert!(!config.write);
        assert_eq!(config.confidence_cutoff, 0.0);
        assert_eq!(config.batch_size, 25);
        assert!(config.match_labels);
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = NlpConfig::default().validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "No value specified for the mandatory configuration parameter `key`"
        );
    }

    #[test]
    fn test_dummy_client_needs_no_key() {
        let config = NlpConfig {
            use_dummy_client: true,
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = NlpConfig {
            key: Some("k".into()),
            batch_size: 0,
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn test_relationship_type_must_be_bare() {
        let config = NlpConfig {
            key: Some("k".into()),
            relationship_type: Some("HAS ENTITY".into()),
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_resolved_relationship_type() {
        let config = NlpConfig::default();
        assert_eq!(
            config
                .resolved_relationship_type(AnalysisKind::Entities)
                .unwrap(),
            "ENTITY"
        );

        let custom = NlpConfig {
            relationship_type: Some("MENTIONS".into()),
            ..Default::default()
        };
        assert_eq!(
            custom
                .resolved_relationship_type(AnalysisKind::KeyPhrases)
                .unwrap(),
            "MENTIONS"
        );
    }

    #[test]
    fn test_wire_names() {
        let config: NlpConfig = serde_json::from_str(
            r#"{
                "key": "abc",
                "nodeProperty": "body",
                "confidenceCutoff": 0.6,
                "relationshipType": "ABOUT",
                "unsupportedDummyClient": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.key.as_deref(), Some("abc"));
        assert_eq!(config.node_property, "body");
        assert_eq!(config.confidence_cutoff, 0.6);
        assert_eq!(config.relationship_type.as_deref(), Some("ABOUT"));
        assert!(config.use_dummy_client);
    }

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("ENTITY").is_ok());
        assert!(validate_identifier("_score2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2fast").is_err());
        assert!(validate_identifier("drop table").is_err());
        assert!(validate_identifier("a;b").is_err());
    }
}
