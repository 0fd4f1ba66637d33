//! Provider client abstraction
//!
//! Every language service answers one batch of texts with one
//! [`ProviderBatch`]: a per-document list of outcomes in the same order as
//! the batch input. Index `i` of a batch's outcomes belongs to index `i`
//! of that batch's texts, never to a global document position.

use lexigraph_core::{AnalysisKind, ExtractedItem};

use crate::Result;

/// What the provider said about one document
#[derive(Debug, Clone, Default)]
pub struct DocumentOutcome {
    /// Raw provider payload, for stream-style callers
    pub value: Option<serde_json::Value>,
    /// Normalized detections, for graph assembly
    pub items: Vec<ExtractedItem>,
    /// Provider-reported failure for this document alone
    pub error: Option<String>,
}

impl DocumentOutcome {
    pub fn ok(value: serde_json::Value, items: Vec<ExtractedItem>) -> Self {
        Self {
            value: Some(value),
            items,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            value: None,
            items: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// One provider response covering one batch of documents
#[derive(Debug, Clone, Default)]
pub struct ProviderBatch {
    pub outcomes: Vec<DocumentOutcome>,
}

impl ProviderBatch {
    pub fn new(outcomes: Vec<DocumentOutcome>) -> Self {
        Self { outcomes }
    }

    /// Detections for the document at `doc_index` within this batch.
    /// A missing or failed outcome yields no detections.
    pub fn items(&self, doc_index: usize) -> &[ExtractedItem] {
        self.outcomes
            .get(doc_index)
            .map(|o| o.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn value(&self, doc_index: usize) -> Option<serde_json::Value> {
        self.outcomes.get(doc_index).and_then(|o| o.value.clone())
    }

    pub fn error(&self, doc_index: usize) -> Option<String> {
        self.outcomes.get(doc_index).and_then(|o| o.error.clone())
    }
}

/// A language service that can analyze a batch of texts
#[async_trait::async_trait]
pub trait NlpClient: Send + Sync {
    /// Analyze one batch. A returned error means the whole batch failed;
    /// per-document problems are reported inside the [`ProviderBatch`].
    async fn fetch(&self, texts: &[String], kind: AnalysisKind) -> Result<ProviderBatch>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_outcome_is_empty() {
        let batch = ProviderBatch::new(vec![DocumentOutcome::ok(
            serde_json::json!({}),
            vec![ExtractedItem::new("Paris", 0.9)],
        )]);

        assert_eq!(batch.items(0).len(), 1);
        assert!(batch.items(5).is_empty());
        assert!(batch.value(5).is_none());
    }

    #[test]
    fn test_failed_outcome_carries_error_only() {
        let outcome = DocumentOutcome::failed("throttled");
        assert!(outcome.value.is_none());
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.error.as_deref(), Some("throttled"));
    }
}
