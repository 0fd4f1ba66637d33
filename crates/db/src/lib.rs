//! Storage layer for lexigraph
//!
//! SurrealDB integration: schema management, the document repository, and
//! the buffered write transaction that persists assembled graphs.

pub mod error;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use repository::Repository;
pub use store::{label_table, GraphTransaction};

use std::path::Path;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

/// Database connection type
pub type DbConnection = Surreal<Db>;

/// Initialize database with RocksDB (persistent)
pub async fn init_persistent(path: impl AsRef<Path>) -> Result<DbConnection> {
    let db = Surreal::new::<RocksDb>(path.as_ref()).await?;
    setup_database(&db).await?;
    Ok(db)
}

/// Initialize database in-memory (for testing)
pub async fn init_memory() -> Result<DbConnection> {
    let db = Surreal::new::<Mem>(()).await?;
    setup_database(&db).await?;
    Ok(db)
}

/// Setup database namespace, database, and schema
async fn setup_database(db: &DbConnection) -> Result<()> {
    db.use_ns("lexigraph").use_db("graph").await?;
    schema::initialize_schema(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_memory() {
        let db = init_memory().await.expect("Failed to init memory db");
        // Just verify it connects
        let _: Vec<serde_json::Value> = db.select("document").await.unwrap();
    }

    #[tokio::test]
    async fn test_init_persistent_creates_store() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = init_persistent(dir.path().join("graph.db"))
            .await
            .expect("Failed to init persistent db");
        let _: Vec<serde_json::Value> = db.select("document").await.unwrap();
    }
}
