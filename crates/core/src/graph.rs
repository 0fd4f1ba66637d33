//! Assembled graph output types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Identifier of a node in an assembled graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeId {
    /// Backed by a stored record
    Persisted(RecordId),
    /// Ephemeral, scoped to one invocation
    Virtual(u64),
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeId::Persisted(id) => write!(f, "{id}"),
            NodeId::Virtual(n) => write!(f, "virtual:{n}"),
        }
    }
}

/// A node in an assembled graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,

    /// Labels in application order; the first one is the primary label
    pub labels: Vec<String>,

    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl GraphNode {
    /// Textual property access, `None` when unset or not a string
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|v| v.as_str())
    }
}

/// A relationship in an assembled graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,

    /// Relationship type, e.g. `ENTITY`
    pub rel_type: String,

    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl GraphEdge {
    /// The weight stored under `weight_property`, if numeric
    pub fn weight(&self, weight_property: &str) -> Option<f64> {
        self.properties.get(weight_property).and_then(|v| v.as_f64())
    }
}

/// The unified output of one annotation invocation.
///
/// Insertion-ordered; every edge endpoint is present in `nodes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphEdge>,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Look up a node by id
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Nodes carrying the given label
    pub fn nodes_with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a GraphNode> {
        self.nodes
            .iter()
            .filter(move |n| n.labels.iter().any(|l| l == label))
    }
}
