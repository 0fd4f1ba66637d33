//! Buffered graph write transaction
//!
//! Write-mode assembly stages its effects here; nothing reaches the store
//! until [`GraphTransaction::commit`] sends everything in one
//! `BEGIN TRANSACTION .. COMMIT TRANSACTION` round-trip. Dropping the
//! transaction without committing discards the staged statements.

use std::collections::BTreeMap;

use lexigraph_core::config::validate_identifier;
use lexigraph_core::TransactionContext;
use surrealdb::RecordId;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{DbConnection, Result, StoreError};

/// Values bound into the staged statements.
///
/// Record ids must be bound as record ids, not as JSON, or SurrealDB would
/// store them as plain strings.
enum Bind {
    Record(RecordId),
    Json(serde_json::Value),
    Number(f64),
}

/// A write transaction covering one annotation invocation.
pub struct GraphTransaction {
    db: DbConnection,
    statements: Vec<String>,
    binds: Vec<(String, Bind)>,
    seq: usize,
}

impl GraphTransaction {
    /// Open a staging transaction for one invocation.
    ///
    /// Makes sure the relation table for `rel_type` exists; relation tables
    /// cannot be defined inside the buffered transaction itself.
    #[instrument(skip(db))]
    pub async fn begin(db: DbConnection, rel_type: &str) -> Result<Self> {
        validate_identifier(rel_type).map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        db.query(format!(
            "DEFINE TABLE IF NOT EXISTS {rel_type} SCHEMALESS TYPE RELATION;"
        ))
        .await?
        .check()?;

        Ok(Self {
            db,
            statements: Vec::new(),
            binds: Vec::new(),
            seq: 0,
        })
    }

    /// Number of statements staged so far
    pub fn staged(&self) -> usize {
        self.statements.len()
    }

    /// Send everything staged in a single transactional round-trip.
    #[instrument(skip(self))]
    pub async fn commit(mut self) -> Result<()> {
        if self.statements.is_empty() {
            return Ok(());
        }
        debug!(statements = self.statements.len(), "committing graph transaction");

        let sql = format!(
            "BEGIN TRANSACTION;\n{}\nCOMMIT TRANSACTION;",
            self.statements.join("\n")
        );
        let mut query = self.db.query(sql);
        for (name, bind) in self.binds.drain(..) {
            query = match bind {
                Bind::Record(id) => query.bind((name, id)),
                Bind::Json(value) => query.bind((name, value)),
                Bind::Number(n) => query.bind((name, n)),
            };
        }
        query.await?.check()?;
        Ok(())
    }

    fn next_param(&mut self) -> usize {
        let n = self.seq;
        self.seq += 1;
        n
    }
}

impl TransactionContext for GraphTransaction {
    /// Stage an idempotent node upsert.
    ///
    /// The record id is derived from the identity key, so the same identity
    /// maps to the same record in every invocation and `UPSERT .. MERGE`
    /// converges instead of duplicating.
    fn get_or_create_node(
        &mut self,
        primary_label: &str,
        labels: &[String],
        identity_key: &str,
        properties: &BTreeMap<String, serde_json::Value>,
    ) -> lexigraph_core::Result<RecordId> {
        let id = RecordId::new(label_table(primary_label), node_key(identity_key));

        let mut data = serde_json::Map::new();
        for (name, value) in properties {
            data.insert(name.clone(), value.clone());
        }
        data.insert(
            "labels".to_string(),
            serde_json::Value::from(labels.to_vec()),
        );
        data.insert(
            "identity_key".to_string(),
            serde_json::Value::String(identity_key.to_string()),
        );

        let n = self.next_param();
        self.statements
            .push(format!("UPSERT $p{n}_id MERGE $p{n}_data;"));
        self.binds
            .push((format!("p{n}_id"), Bind::Record(id.clone())));
        self.binds.push((
            format!("p{n}_data"),
            Bind::Json(serde_json::Value::Object(data)),
        ));
        Ok(id)
    }

    /// Stage a relationship merge.
    ///
    /// The edge id is derived from the endpoints, so a repeat detection in
    /// the same or a later invocation updates the weight in place and
    /// parallel edges cannot exist.
    fn merge_relationship(
        &mut self,
        from: &RecordId,
        to: &RecordId,
        rel_type: &str,
        weight_property: &str,
        weight: f64,
    ) -> lexigraph_core::Result<()> {
        validate_identifier(rel_type)?;
        validate_identifier(weight_property)?;

        let id = RecordId::new(rel_type, edge_key(from, to));

        let n = self.next_param();
        self.statements.push(format!(
            "INSERT RELATION INTO {rel_type} {{ id: $p{n}_id, in: $p{n}_in, out: $p{n}_out, {weight_property}: $p{n}_w }} \
             ON DUPLICATE KEY UPDATE {weight_property} = $p{n}_w;"
        ));
        self.binds.push((format!("p{n}_id"), Bind::Record(id)));
        self.binds
            .push((format!("p{n}_in"), Bind::Record(from.clone())));
        self.binds
            .push((format!("p{n}_out"), Bind::Record(to.clone())));
        self.binds.push((format!("p{n}_w"), Bind::Number(weight)));
        Ok(())
    }
}

/// Table name for a primary label: `KeyPhrase` becomes `key_phrase`
pub fn label_table(label: &str) -> String {
    let mut table = String::with_capacity(label.len() + 2);
    for (i, c) in label.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                table.push('_');
            }
            table.push(c.to_ascii_lowercase());
        } else {
            table.push(c);
        }
    }
    table
}

/// Deterministic record key for an identity key
fn node_key(identity_key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, identity_key.as_bytes())
        .simple()
        .to_string()
}

/// Deterministic record key for an edge between two records
fn edge_key(from: &RecordId, to: &RecordId) -> String {
    let joined = format!("{from}\u{1f}{to}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, joined.as_bytes())
        .simple()
        .to_string()
}
