//! SurrealDB schema definitions

use crate::{DbConnection, Result};
use tracing::info;

/// Initialize the database schema
pub async fn initialize_schema(db: &DbConnection) -> Result<()> {
    info!("Initializing database schema...");

    // Define tables, relation tables, and identity indexes
    db.query(SCHEMA_DEFINITION).await?;

    info!("Schema initialized successfully");
    Ok(())
}

const SCHEMA_DEFINITION: &str = r#"
-- ============================================
-- TABLES
-- ============================================

-- Documents carry whatever properties ingestion supplies
DEFINE TABLE IF NOT EXISTS document SCHEMALESS;
DEFINE FIELD IF NOT EXISTS ingested_at ON document TYPE datetime DEFAULT time::now();

-- Derived node tables, one per analysis kind
DEFINE TABLE IF NOT EXISTS entity SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS text ON entity TYPE string;
DEFINE FIELD IF NOT EXISTS `type` ON entity TYPE option<string>;
DEFINE FIELD IF NOT EXISTS labels ON entity TYPE array<string> DEFAULT [];
DEFINE FIELD IF NOT EXISTS metadata ON entity TYPE option<object>;
DEFINE FIELD IF NOT EXISTS identity_key ON entity TYPE string;

DEFINE TABLE IF NOT EXISTS key_phrase SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS text ON key_phrase TYPE string;
DEFINE FIELD IF NOT EXISTS labels ON key_phrase TYPE array<string> DEFAULT [];
DEFINE FIELD IF NOT EXISTS identity_key ON key_phrase TYPE string;

DEFINE TABLE IF NOT EXISTS category SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS text ON category TYPE string;
DEFINE FIELD IF NOT EXISTS labels ON category TYPE array<string> DEFAULT [];
DEFINE FIELD IF NOT EXISTS identity_key ON category TYPE string;

-- ============================================
-- GRAPH EDGE TABLES
-- ============================================

-- Default relationship types; custom ones are defined when a write
-- transaction opens
DEFINE TABLE IF NOT EXISTS ENTITY SCHEMALESS TYPE RELATION;
DEFINE TABLE IF NOT EXISTS KEY_PHRASE SCHEMALESS TYPE RELATION;
DEFINE TABLE IF NOT EXISTS CATEGORY SCHEMALESS TYPE RELATION;

-- ============================================
-- INDEXES
-- ============================================

-- One node per identity key
DEFINE INDEX IF NOT EXISTS idx_entity_identity ON entity FIELDS identity_key UNIQUE;
DEFINE INDEX IF NOT EXISTS idx_key_phrase_identity ON key_phrase FIELDS identity_key UNIQUE;
DEFINE INDEX IF NOT EXISTS idx_category_identity ON category FIELDS identity_key UNIQUE;

-- Text lookups
DEFINE INDEX IF NOT EXISTS idx_entity_text ON entity FIELDS text;
DEFINE INDEX IF NOT EXISTS idx_key_phrase_text ON key_phrase FIELDS text;
DEFINE INDEX IF NOT EXISTS idx_category_text ON category FIELDS text;
"#;

#[cfg(test)]
mod tests {
    use crate::init_memory;

    #[tokio::test]
    async fn test_schema_initialization() {
        let db = init_memory().await.expect("Failed to init db");

        // Verify tables exist by selecting from them
        let documents: Vec<serde_json::Value> = db.select("document").await.unwrap();
        assert!(documents.is_empty());

        let entities: Vec<serde_json::Value> = db.select("entity").await.unwrap();
        assert!(entities.is_empty());
    }

    #[tokio::test]
    async fn test_schema_is_rerunnable() {
        let db = init_memory().await.expect("Failed to init db");

        // A second pass must not fail, persistent databases re-run it on
        // every startup
        crate::schema::initialize_schema(&db).await.unwrap();
    }
}
