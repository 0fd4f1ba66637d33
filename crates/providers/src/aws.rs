//! Amazon Comprehend batch response handling
//!
//! Comprehend answers a batch in one response: `ResultList` entries carry
//! the per-document detections and `ErrorList` entries the per-document
//! failures, both correlated back to the batch by their `Index` field. The
//! wire format is PascalCase; stream output re-serializes as camelCase.
//!
//! Only the response side lives here. The offline client in
//! [`crate::dummy`] produces these shapes; wiring up the live signed
//! transport is left out.

use lexigraph_core::ExtractedItem;
use serde::{Deserialize, Serialize};

use crate::client::{DocumentOutcome, ProviderBatch};
use crate::Result;

// ==========================================
// RESPONSE TYPES
// ==========================================

/// Envelope shared by the `BatchDetect*` responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub(crate) struct ComprehendResponse<T> {
    #[serde(default)]
    pub result_list: Vec<T>,
    #[serde(default)]
    pub error_list: Vec<BatchItemError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub(crate) struct BatchItemError {
    pub index: usize,
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub error_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub(crate) struct EntitiesResult {
    pub index: usize,
    #[serde(default)]
    pub entities: Vec<ComprehendEntity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub(crate) struct ComprehendEntity {
    pub text: String,
    #[serde(rename(serialize = "type", deserialize = "Type"))]
    pub entity_type: String,
    pub score: f64,
    #[serde(default)]
    pub begin_offset: Option<i64>,
    #[serde(default)]
    pub end_offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub(crate) struct KeyPhrasesResult {
    pub index: usize,
    #[serde(default)]
    pub key_phrases: Vec<ComprehendKeyPhrase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub(crate) struct ComprehendKeyPhrase {
    pub text: String,
    pub score: f64,
    #[serde(default)]
    pub begin_offset: Option<i64>,
    #[serde(default)]
    pub end_offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub(crate) struct SentimentResult {
    pub index: usize,
    pub sentiment: String,
    pub sentiment_score: SentimentScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub(crate) struct SentimentScore {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub negative: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub mixed: f64,
}

// ==========================================
// NORMALIZATION
// ==========================================

/// Fold a `BatchDetectEntities` response into per-document outcomes.
///
/// Offsets are per-mention values; they stay in the raw payload but never
/// become item metadata, so repeated mentions of one entity still resolve
/// to one node.
pub(crate) fn entities_batch(
    response: ComprehendResponse<EntitiesResult>,
    doc_count: usize,
) -> Result<ProviderBatch> {
    let mut outcomes = vec![DocumentOutcome::default(); doc_count];
    for result in &response.result_list {
        let items = result
            .entities
            .iter()
            .map(|e| ExtractedItem::new(&e.text, e.score).with_type(&e.entity_type))
            .collect();
        let value = serde_json::json!({ "entities": to_json(&result.entities)? });
        fill(&mut outcomes, result.index, DocumentOutcome::ok(value, items));
    }
    apply_errors(&mut outcomes, &response.error_list);
    Ok(ProviderBatch::new(outcomes))
}

/// Fold a `BatchDetectKeyPhrases` response into per-document outcomes.
pub(crate) fn key_phrases_batch(
    response: ComprehendResponse<KeyPhrasesResult>,
    doc_count: usize,
) -> Result<ProviderBatch> {
    let mut outcomes = vec![DocumentOutcome::default(); doc_count];
    for result in &response.result_list {
        let items = result
            .key_phrases
            .iter()
            .map(|p| ExtractedItem::new(&p.text, p.score))
            .collect();
        let value = serde_json::json!({ "keyPhrases": to_json(&result.key_phrases)? });
        fill(&mut outcomes, result.index, DocumentOutcome::ok(value, items));
    }
    apply_errors(&mut outcomes, &response.error_list);
    Ok(ProviderBatch::new(outcomes))
}

/// Fold a `BatchDetectSentiment` response into per-document outcomes.
/// Sentiment never yields items; it is a stream-only analysis.
pub(crate) fn sentiment_batch(
    response: ComprehendResponse<SentimentResult>,
    doc_count: usize,
) -> Result<ProviderBatch> {
    let mut outcomes = vec![DocumentOutcome::default(); doc_count];
    for result in &response.result_list {
        let value = serde_json::json!({
            "sentiment": result.sentiment,
            "sentimentScore": to_json(&result.sentiment_score)?,
        });
        fill(&mut outcomes, result.index, DocumentOutcome::ok(value, Vec::new()));
    }
    apply_errors(&mut outcomes, &response.error_list);
    Ok(ProviderBatch::new(outcomes))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| lexigraph_core::CoreError::from(e).into())
}

fn fill(outcomes: &mut [DocumentOutcome], index: usize, outcome: DocumentOutcome) {
    if let Some(slot) = outcomes.get_mut(index) {
        *slot = outcome;
    }
}

fn apply_errors(outcomes: &mut [DocumentOutcome], errors: &[BatchItemError]) {
    for error in errors {
        fill(
            outcomes,
            error.index,
            DocumentOutcome::failed(format!("{}: {}", error.error_code, error.error_message)),
        );
    }
}
