//! Storage seam for write-mode assembly

use std::collections::BTreeMap;

use surrealdb::RecordId;

use crate::error::Result;

/// Staging surface the assembler writes through in write mode.
///
/// Implementations buffer idempotent statements; nothing becomes visible
/// in the store until the owner commits. Staging is synchronous so graph
/// assembly itself never suspends.
pub trait TransactionContext {
    /// Resolve or stage the node identified by `identity_key`, returning
    /// its record id.
    ///
    /// Repeated calls with the same key must return the same id, within an
    /// invocation and across invocations against the same store.
    fn get_or_create_node(
        &mut self,
        primary_label: &str,
        labels: &[String],
        identity_key: &str,
        properties: &BTreeMap<String, serde_json::Value>,
    ) -> Result<RecordId>;

    /// Stage a relationship merge from `from` to `to`.
    ///
    /// Creates the relationship when absent; when it already exists, only
    /// the weight property is replaced. Parallel edges must never result.
    fn merge_relationship(
        &mut self,
        from: &RecordId,
        to: &RecordId,
        rel_type: &str,
        weight_property: &str,
        weight: f64,
    ) -> Result<()>;
}
