//! Offline stand-in client
//!
//! Produces deterministic pseudo-detections derived from the text alone,
//! so every analysis kind can be exercised end to end without credentials
//! or network access. Selected with the `unsupportedDummyClient` option.
//!
//! Entities, key phrases, and sentiment come back in Comprehend batch
//! shape, categories in the Google classify shape, so the same
//! normalization paths run as against the live services.

use lexigraph_core::AnalysisKind;

use crate::aws::{
    entities_batch, key_phrases_batch, sentiment_batch, ComprehendEntity, ComprehendKeyPhrase,
    ComprehendResponse, EntitiesResult, KeyPhrasesResult, SentimentResult, SentimentScore,
};
use crate::client::{DocumentOutcome, NlpClient, ProviderBatch};
use crate::gcp::{categories_to_items, GcpCategory};
use crate::Result;

const ENTITY_TYPES: [&str; 4] = ["PERSON", "LOCATION", "ORGANIZATION", "OTHER"];

/// Client that fabricates plausible detections instead of calling out
#[derive(Debug, Clone, Default)]
pub struct DummyClient;

impl DummyClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl NlpClient for DummyClient {
    async fn fetch(&self, texts: &[String], kind: AnalysisKind) -> Result<ProviderBatch> {
        match kind {
            AnalysisKind::Entities => {
                let response = ComprehendResponse {
                    result_list: texts
                        .iter()
                        .enumerate()
                        .map(|(index, text)| EntitiesResult {
                            index,
                            entities: dummy_entities(text),
                        })
                        .collect(),
                    error_list: Vec::new(),
                };
                entities_batch(response, texts.len())
            }
            AnalysisKind::KeyPhrases => {
                let response = ComprehendResponse {
                    result_list: texts
                        .iter()
                        .enumerate()
                        .map(|(index, text)| KeyPhrasesResult {
                            index,
                            key_phrases: dummy_phrases(text),
                        })
                        .collect(),
                    error_list: Vec::new(),
                };
                key_phrases_batch(response, texts.len())
            }
            AnalysisKind::Sentiment => {
                let response = ComprehendResponse {
                    result_list: texts
                        .iter()
                        .enumerate()
                        .map(|(index, text)| dummy_sentiment(text, index))
                        .collect(),
                    error_list: Vec::new(),
                };
                sentiment_batch(response, texts.len())
            }
            AnalysisKind::Categories => {
                let outcomes = texts
                    .iter()
                    .map(|text| {
                        let categories = dummy_categories(text);
                        let value = serde_json::json!({
                            "categories": serde_json::to_value(&categories)
                                .map_err(lexigraph_core::CoreError::from)?
                        });
                        let items = categories_to_items(&categories);
                        Ok(DocumentOutcome::ok(value, items))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ProviderBatch::new(outcomes))
            }
        }
    }
}

/// Up to four distinct tokens of at least three letters, in text order
fn tokens(text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        let token = word.trim_matches(|c: char| !c.is_alphanumeric());
        if token.chars().count() < 3 {
            continue;
        }
        if seen.iter().any(|t| t == token) {
            continue;
        }
        seen.push(token.to_string());
        if seen.len() == 4 {
            break;
        }
    }
    seen
}

fn dummy_entities(text: &str) -> Vec<ComprehendEntity> {
    tokens(text)
        .into_iter()
        .enumerate()
        .map(|(i, token)| ComprehendEntity {
            text: token,
            entity_type: ENTITY_TYPES[i % ENTITY_TYPES.len()].to_string(),
            score: 0.95 - 0.15 * i as f64,
            begin_offset: None,
            end_offset: None,
        })
        .collect()
}

fn dummy_phrases(text: &str) -> Vec<ComprehendKeyPhrase> {
    tokens(text)
        .windows(2)
        .take(3)
        .enumerate()
        .map(|(i, pair)| ComprehendKeyPhrase {
            text: format!("{} {}", pair[0], pair[1]),
            score: 0.9 - 0.1 * i as f64,
            begin_offset: None,
            end_offset: None,
        })
        .collect()
}

fn dummy_categories(text: &str) -> Vec<GcpCategory> {
    tokens(text)
        .first()
        .map(|token| {
            vec![GcpCategory {
                name: format!("/{token}"),
                confidence: 0.85,
            }]
        })
        .unwrap_or_default()
}

fn dummy_sentiment(text: &str, index: usize) -> SentimentResult {
    if tokens(text).len() % 2 == 0 {
        SentimentResult {
            index,
            sentiment: "POSITIVE".to_string(),
            sentiment_score: SentimentScore {
                positive: 0.8,
                negative: 0.03,
                neutral: 0.15,
                mixed: 0.02,
            },
        }
    } else {
        SentimentResult {
            index,
            sentiment: "NEUTRAL".to_string(),
            sentiment_score: SentimentScore {
                positive: 0.25,
                negative: 0.1,
                neutral: 0.6,
                mixed: 0.05,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_filter_and_dedup() {
        let tokens = tokens("The Eiffel Tower, the Eiffel Tower! Is in Paris, France.");
        assert_eq!(tokens, vec!["The", "Eiffel", "Tower", "the"]);
    }

    #[test]
    fn test_entities_cycle_types_deterministically() {
        let first = dummy_entities("Ada Lovelace wrote about the analytical engine");
        let second = dummy_entities("Ada Lovelace wrote about the analytical engine");
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].entity_type, "PERSON");
        assert_eq!(first[1].entity_type, "LOCATION");
        assert_eq!(first[0].score, 0.95);
        assert_eq!(first[3].score, 0.5);

        let pairs: Vec<_> = first.iter().map(|e| (&e.text, &e.entity_type)).collect();
        let again: Vec<_> = second.iter().map(|e| (&e.text, &e.entity_type)).collect();
        assert_eq!(pairs, again);
    }

    #[tokio::test]
    async fn test_fetch_correlates_outcomes_to_batch_order() {
        let client = DummyClient::new();
        let texts = vec![
            "Paris hosts the Louvre museum".to_string(),
            "Berlin has the Brandenburg Gate".to_string(),
        ];

        let batch = client.fetch(&texts, AnalysisKind::Entities).await.unwrap();
        assert_eq!(batch.outcomes.len(), 2);
        assert_eq!(batch.items(0)[0].text, "Paris");
        assert_eq!(batch.items(1)[0].text, "Berlin");
    }

    #[tokio::test]
    async fn test_categories_use_classify_shape() {
        let client = DummyClient::new();
        let texts = vec!["Travel guides for southern Spain".to_string()];

        let batch = client.fetch(&texts, AnalysisKind::Categories).await.unwrap();
        assert_eq!(batch.items(0)[0].text, "/Travel");
        assert!(batch.items(0)[0].item_type.is_none());
        assert_eq!(
            batch.value(0).unwrap()["categories"][0]["confidence"],
            serde_json::json!(0.85)
        );
    }

    #[tokio::test]
    async fn test_sentiment_has_value_but_no_items() {
        let client = DummyClient::new();
        let texts = vec!["Wonderful weather across the coast today".to_string()];

        let batch = client.fetch(&texts, AnalysisKind::Sentiment).await.unwrap();
        assert!(batch.items(0).is_empty());
        let value = batch.value(0).unwrap();
        assert!(value["sentiment"].is_string());
        assert!(value["sentimentScore"]["neutral"].is_number());
    }

    #[tokio::test]
    async fn test_key_phrases_are_bigrams() {
        let client = DummyClient::new();
        let texts = vec!["quantum computing research accelerates rapidly".to_string()];

        let batch = client.fetch(&texts, AnalysisKind::KeyPhrases).await.unwrap();
        let items = batch.items(0);
        assert_eq!(items[0].text, "quantum computing");
        assert_eq!(items[0].score, 0.9);
        assert_eq!(items[1].text, "computing research");
    }
}
