//! Google Cloud Natural Language client
//!
//! The service analyzes one document per request, so a batch of texts turns
//! into one POST per text against the selected `documents:*` method. Any
//! failed request fails the whole batch.

use std::collections::BTreeMap;

use lexigraph_core::{AnalysisKind, ExtractedItem};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::{DocumentOutcome, NlpClient, ProviderBatch};
use crate::{ProviderError, Result};

const BASE_URL: &str = "https://language.googleapis.com/v1";

/// Client for the Google Cloud Natural Language API
#[derive(Clone)]
pub struct GcpClient {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl GcpClient {
    /// Create a client authenticating with an API key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            key: key.into(),
        }
    }

    /// Point the client at a different endpoint, for tests
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[instrument(skip(self, text))]
    async fn analyze(&self, text: &str, method: &str) -> Result<serde_json::Value> {
        let url = format!("{}/documents:{}?key={}", self.base_url, method, self.key);
        let request = AnalyzeRequest {
            document: GcpDocument {
                doc_type: "PLAIN_TEXT",
                content: text,
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// The `documents:*` method implementing an analysis kind
fn endpoint(kind: AnalysisKind) -> Result<&'static str> {
    match kind {
        AnalysisKind::Entities => Ok("analyzeEntities"),
        AnalysisKind::Categories => Ok("classifyText"),
        AnalysisKind::Sentiment => Ok("analyzeSentiment"),
        AnalysisKind::KeyPhrases => Err(ProviderError::Unsupported(
            "Google Cloud Natural Language does not support key phrase extraction".into(),
        )),
    }
}

#[async_trait::async_trait]
impl NlpClient for GcpClient {
    async fn fetch(&self, texts: &[String], kind: AnalysisKind) -> Result<ProviderBatch> {
        let method = endpoint(kind)?;
        debug!("Analyzing {} texts via documents:{}", texts.len(), method);

        let mut outcomes = Vec::with_capacity(texts.len());
        for text in texts {
            let value = self.analyze(text, method).await?;
            let items = match kind {
                AnalysisKind::Entities => {
                    let parsed: EntitiesResponse = serde_json::from_value(value.clone())
                        .map_err(lexigraph_core::CoreError::from)?;
                    entities_to_items(&parsed.entities)
                }
                AnalysisKind::Categories => {
                    let parsed: ClassifyResponse = serde_json::from_value(value.clone())
                        .map_err(lexigraph_core::CoreError::from)?;
                    categories_to_items(&parsed.categories)
                }
                AnalysisKind::KeyPhrases | AnalysisKind::Sentiment => Vec::new(),
            };
            outcomes.push(DocumentOutcome::ok(value, items));
        }

        Ok(ProviderBatch::new(outcomes))
    }
}

// ==========================================
// RESPONSE TYPES
// ==========================================

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    document: GcpDocument<'a>,
}

#[derive(Debug, Serialize)]
struct GcpDocument<'a> {
    #[serde(rename = "type")]
    doc_type: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EntitiesResponse {
    #[serde(default)]
    pub entities: Vec<GcpEntity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GcpEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub salience: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClassifyResponse {
    #[serde(default)]
    pub categories: Vec<GcpCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GcpCategory {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Entity detections as assembler items: salience is the score, stable
/// metadata such as knowledge-base links rides along.
pub(crate) fn entities_to_items(entities: &[GcpEntity]) -> Vec<ExtractedItem> {
    entities
        .iter()
        .map(|e| {
            let mut item = ExtractedItem::new(&e.name, e.salience).with_type(&e.entity_type);
            for (key, value) in &e.metadata {
                item = item.with_extra(key, value);
            }
            item
        })
        .collect()
}

/// Category detections as assembler items: the category path is the text,
/// confidence is the score, no type tag.
pub(crate) fn categories_to_items(categories: &[GcpCategory]) -> Vec<ExtractedItem> {
    categories
        .iter()
        .map(|c| ExtractedItem::new(&c.name, c.confidence))
        .collect()
}
