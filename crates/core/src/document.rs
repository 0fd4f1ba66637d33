//! Source documents - the records an annotation run reads text from

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::error::{CoreError, Result};

/// A read-only handle on a document passed into an annotation run.
///
/// The engine never mutates a document; its properties are the state the
/// document had when the run started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Record id (synthetic for documents that were never stored)
    pub id: RecordId,

    /// Properties at the time of the call
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,

    /// Whether the record exists in the store
    pub persisted: bool,
}

impl SourceDocument {
    /// Label applied to source nodes in assembled graphs
    pub const LABEL: &'static str = "Document";

    /// A document that lives in the store
    pub fn persisted(id: RecordId, properties: BTreeMap<String, serde_json::Value>) -> Self {
        Self {
            id,
            properties,
            persisted: true,
        }
    }

    /// An in-memory document that was never stored
    pub fn ephemeral(
        key: impl Into<String>,
        properties: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: RecordId::new("document", key.into()),
            properties,
            persisted: false,
        }
    }

    /// Read a property as text.
    ///
    /// String values come back as-is; other values are rendered as JSON
    /// text. A missing property is an error because the run would have
    /// nothing to send to the provider.
    pub fn get_property(&self, name: &str) -> Result<String> {
        match self.properties.get(name) {
            Some(serde_json::Value::String(s)) => Ok(s.clone()),
            Some(value) => Ok(value.to_string()),
            None => Err(CoreError::MissingProperty {
                document: self.id.to_string(),
                property: name.to_string(),
            }),
        }
    }
}
