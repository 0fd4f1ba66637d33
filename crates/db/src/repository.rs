//! Repository pattern for database operations

use crate::{DbConnection, Result, StoreError};
use lexigraph_core::config::validate_identifier;
use lexigraph_core::SourceDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surrealdb::RecordId;
use tracing::instrument;

/// Repository for all database operations
#[derive(Clone)]
pub struct Repository {
    db: DbConnection,
}

impl Repository {
    /// Create a new repository
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    // ==========================================
    // DOCUMENT OPERATIONS
    // ==========================================

    /// Ingest a document record
    #[instrument(skip(self, properties))]
    pub async fn create_document(&self, properties: serde_json::Value) -> Result<DocumentRow> {
        // Use SurrealDB's high-level create API so we get back the stored
        // record including its generated `id` and `ingested_at`.
        let created: Option<DocumentRow> = self.db.create("document").content(properties).await?;

        created.ok_or_else(|| StoreError::CreateFailed("document".into()))
    }

    /// Get a document by record key
    #[instrument(skip(self))]
    pub async fn get_document(&self, key: &str) -> Result<Option<DocumentRow>> {
        let doc: Option<DocumentRow> = self.db.select(("document", key)).await?;
        Ok(doc)
    }

    /// Fetch a set of documents by key, failing on the first missing one
    #[instrument(skip(self, keys))]
    pub async fn get_documents(&self, keys: &[String]) -> Result<Vec<DocumentRow>> {
        let mut docs = Vec::with_capacity(keys.len());
        for key in keys {
            let doc = self
                .get_document(key)
                .await?
                .ok_or_else(|| StoreError::NotFound("document".into(), key.clone()))?;
            docs.push(doc);
        }
        Ok(docs)
    }

    /// List recent documents
    #[instrument(skip(self))]
    pub async fn list_documents(&self, limit: usize) -> Result<Vec<DocumentRow>> {
        let mut docs: Vec<DocumentRow> = self.db.select("document").await?;

        // Sort by ingestion time descending and apply the limit in Rust to
        // avoid SurrealDB multi-result `take` issues.
        docs.sort_by(|a, b| b.ingested_at.cmp(&a.ingested_at));
        if docs.len() > limit {
            docs.truncate(limit);
        }

        Ok(docs)
    }

    // ==========================================
    // GRAPH OPERATIONS
    // ==========================================

    /// List the nodes of one node table
    #[instrument(skip(self))]
    pub async fn list_nodes(&self, table: &str) -> Result<Vec<NodeRow>> {
        validate_identifier(table).map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let mut nodes: Vec<NodeRow> = self
            .db
            .query(format!("SELECT * FROM {table}"))
            .await?
            .take(0)?;

        nodes.sort_by(|a, b| a.text.cmp(&b.text));
        Ok(nodes)
    }

    /// List the relationships of one relation table
    #[instrument(skip(self))]
    pub async fn list_relationships(&self, rel_type: &str) -> Result<Vec<EdgeRow>> {
        validate_identifier(rel_type).map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let edges: Vec<EdgeRow> = self
            .db
            .query(format!("SELECT * FROM {rel_type}"))
            .await?
            .take(0)?;

        Ok(edges)
    }

    // ==========================================
    // STATS
    // ==========================================

    /// Get database statistics
    #[instrument(skip(self))]
    pub async fn get_stats(&self) -> Result<GraphStats> {
        let stats: Vec<GraphStats> = self
            .db
            .query(
                r#"
                RETURN {
                    document_count: (SELECT count() FROM document GROUP ALL)[0].count ?? 0,
                    entity_count: (SELECT count() FROM entity GROUP ALL)[0].count ?? 0,
                    key_phrase_count: (SELECT count() FROM key_phrase GROUP ALL)[0].count ?? 0,
                    category_count: (SELECT count() FROM category GROUP ALL)[0].count ?? 0,
                    relationship_count: (
                        ((SELECT count() FROM ENTITY GROUP ALL)[0].count ?? 0) +
                        ((SELECT count() FROM KEY_PHRASE GROUP ALL)[0].count ?? 0) +
                        ((SELECT count() FROM CATEGORY GROUP ALL)[0].count ?? 0)
                    )
                }
            "#,
            )
            .await?
            .take(0)?;

        stats
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::QueryFailed("stats".into()))
    }
}

// ==========================================
// RESULT TYPES
// ==========================================

/// A stored document record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRow {
    pub id: RecordId,
    pub ingested_at: chrono::DateTime<chrono::Utc>,
    #[serde(flatten)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl DocumentRow {
    /// Convert into the engine's document form. `ingested_at` is store
    /// bookkeeping, not a document property, so it is not carried over.
    pub fn into_source(self) -> SourceDocument {
        SourceDocument::persisted(self.id, self.properties)
    }
}

/// A stored graph node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: RecordId,
    pub text: String,
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub identity_key: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// A stored relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRow {
    pub id: RecordId,
    #[serde(rename = "in")]
    pub source: RecordId,
    #[serde(rename = "out")]
    pub target: RecordId,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Node and relationship counts across the standard tables
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphStats {
    #[serde(default)]
    pub document_count: i64,
    #[serde(default)]
    pub entity_count: i64,
    #[serde(default)]
    pub key_phrase_count: i64,
    #[serde(default)]
    pub category_count: i64,
    #[serde(default)]
    pub relationship_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_memory;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_get_document() {
        let db = init_memory().await.unwrap();
        let repo = Repository::new(db);

        let created = repo
            .create_document(json!({"text": "Paris is in France", "title": "Geography"}))
            .await
            .unwrap();

        assert!(created.id.to_string().starts_with("document:"));
        assert_eq!(created.properties["text"], json!("Paris is in France"));

        let key = created.id.key().to_string();
        let fetched = repo.get_document(&key).await.unwrap().unwrap();
        assert_eq!(fetched.properties["title"], json!("Geography"));
    }

    #[tokio::test]
    async fn test_get_documents_fails_on_missing_key() {
        let db = init_memory().await.unwrap();
        let repo = Repository::new(db);

        let result = repo.get_documents(&["nope".to_string()]).await;
        assert!(matches!(result, Err(StoreError::NotFound(_, _))));
    }

    #[tokio::test]
    async fn test_list_documents_applies_limit() {
        let db = init_memory().await.unwrap();
        let repo = Repository::new(db);

        for i in 0..3 {
            repo.create_document(json!({"text": format!("Document {i}")}))
                .await
                .unwrap();
        }

        assert_eq!(repo.list_documents(10).await.unwrap().len(), 3);
        assert_eq!(repo.list_documents(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_into_source_drops_bookkeeping() {
        let db = init_memory().await.unwrap();
        let repo = Repository::new(db);

        let created = repo
            .create_document(json!({"text": "Berlin"}))
            .await
            .unwrap();

        let source = created.into_source();
        assert!(source.persisted);
        assert_eq!(source.get_property("text").unwrap(), "Berlin");
        assert!(!source.properties.contains_key("ingested_at"));
    }

    #[tokio::test]
    async fn test_stats_on_fresh_database() {
        let db = init_memory().await.unwrap();
        let repo = Repository::new(db);

        let stats = repo.get_stats().await.unwrap();
        assert_eq!(stats.document_count, 0);
        assert_eq!(stats.relationship_count, 0);
    }

    #[tokio::test]
    async fn test_stats_counts_documents() {
        let db = init_memory().await.unwrap();
        let repo = Repository::new(db);

        repo.create_document(json!({"text": "one"})).await.unwrap();
        repo.create_document(json!({"text": "two"})).await.unwrap();

        let stats = repo.get_stats().await.unwrap();
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.entity_count, 0);
    }
}
