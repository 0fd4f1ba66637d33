//! Graph assembly - folding per-document detections into one graph

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::document::SourceDocument;
use crate::error::{CoreError, Result};
use crate::graph::{Graph, GraphEdge, GraphNode, NodeId};
use crate::identity::{type_label, NodeIdentity};
use crate::item::ExtractedItem;
use crate::kind::AnalysisKind;
use crate::store::TransactionContext;

/// Assembler settings fixed for one invocation
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub kind: AnalysisKind,
    /// Relationship type applied to every derived edge
    pub rel_type: String,
    /// Edge property that carries the detection score
    pub weight_property: String,
    /// Detections scoring strictly below this are dropped
    pub confidence_cutoff: f64,
    /// Whether the label set participates in node identity
    pub match_labels: bool,
}

/// Builds the unified graph for one invocation.
///
/// Owns the node and edge registries. Identity resolution and edge merging
/// are order-sensitive, so documents must be fed in invocation order; each
/// batch's results are reduced here one document at a time.
pub struct GraphAssembler<'a> {
    options: AssembleOptions,
    primary_label: String,
    tx: Option<&'a mut dyn TransactionContext>,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    /// canonical identity key -> index into `nodes`
    by_identity: HashMap<String, usize>,
    /// document record id -> index into `nodes`
    sources: HashMap<String, usize>,
    /// (from, to, rel_type) -> index into `edges`
    by_endpoints: HashMap<(NodeId, NodeId, String), usize>,
    next_virtual: u64,
}

impl<'a> GraphAssembler<'a> {
    /// Create an assembler; `tx` present means write mode.
    pub fn new(
        options: AssembleOptions,
        tx: Option<&'a mut dyn TransactionContext>,
    ) -> Result<Self> {
        let primary_label = options
            .kind
            .node_label()
            .ok_or_else(|| CoreError::UnsupportedGraphKind(options.kind.to_string()))?
            .to_string();
        Ok(Self {
            options,
            primary_label,
            tx,
            nodes: Vec::new(),
            edges: Vec::new(),
            by_identity: HashMap::new(),
            sources: HashMap::new(),
            by_endpoints: HashMap::new(),
            next_virtual: 0,
        })
    }

    /// Fold one document and its detections into the graph.
    ///
    /// The source node is added even when every detection falls below the
    /// cutoff, so callers can always see which documents were processed.
    pub fn process_document(
        &mut self,
        doc: &SourceDocument,
        items: &[ExtractedItem],
    ) -> Result<()> {
        let source = self.resolve_source(doc)?;
        for item in items {
            if item.score < self.options.confidence_cutoff {
                continue;
            }
            let derived = self.resolve_item(item)?;
            self.merge_edge(source.clone(), derived, item.score)?;
        }
        Ok(())
    }

    /// The unified graph for everything processed so far
    pub fn finish(self) -> Graph {
        Graph {
            nodes: self.nodes,
            relationships: self.edges,
        }
    }

    fn next_virtual_id(&mut self) -> NodeId {
        let id = NodeId::Virtual(self.next_virtual);
        self.next_virtual += 1;
        id
    }

    /// One source node per document id, no matter how often it appears
    fn resolve_source(&mut self, doc: &SourceDocument) -> Result<NodeId> {
        let doc_key = doc.id.to_string();
        if let Some(&index) = self.sources.get(&doc_key) {
            return Ok(self.nodes[index].id.clone());
        }

        if self.tx.is_some() && !doc.persisted {
            return Err(CoreError::EphemeralSourceInWriteMode(doc_key));
        }
        let id = if doc.persisted {
            NodeId::Persisted(doc.id.clone())
        } else {
            self.next_virtual_id()
        };

        // the graph carries a snapshot of the document's properties
        let node = GraphNode {
            id: id.clone(),
            labels: vec![SourceDocument::LABEL.to_string()],
            properties: doc.properties.clone(),
        };
        self.sources.insert(doc_key, self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    /// Resolve a detection to its node, creating it on first sight.
    ///
    /// Already-set properties are never overwritten by later detections of
    /// the same identity; missing ones are filled in.
    fn resolve_item(&mut self, item: &ExtractedItem) -> Result<NodeId> {
        let mut labels = vec![self.primary_label.clone()];
        if self.options.kind.typed_items() {
            if let Some(raw) = item.item_type.as_deref() {
                labels.push(type_label(raw));
            }
        }

        let fields: Vec<(String, String)> = self
            .options
            .kind
            .identity_fields()
            .iter()
            .map(|&field| (field.to_string(), item.field_value(field)))
            .collect();

        let mut properties: BTreeMap<String, Value> = BTreeMap::new();
        properties.insert("text".to_string(), Value::String(item.text.clone()));
        if self.options.kind.typed_items() {
            if let Some(item_type) = &item.item_type {
                properties.insert("type".to_string(), Value::String(item_type.clone()));
            }
        }
        if !item.extra.is_empty() {
            let metadata: serde_json::Map<String, Value> = item
                .extra
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            properties.insert("metadata".to_string(), Value::Object(metadata));
        }

        let identity = NodeIdentity::new(labels.clone(), fields);
        let key = identity.canonical_key(self.options.match_labels);

        if let Some(&index) = self.by_identity.get(&key) {
            let node = &mut self.nodes[index];
            for (name, value) in properties {
                node.properties.entry(name).or_insert(value);
            }
            return Ok(node.id.clone());
        }

        let id = match self.tx.as_mut() {
            Some(tx) => NodeId::Persisted(tx.get_or_create_node(
                &self.primary_label,
                &labels,
                &key,
                &properties,
            )?),
            None => self.next_virtual_id(),
        };

        let node = GraphNode {
            id: id.clone(),
            labels,
            properties,
        };
        self.by_identity.insert(key, self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    /// Merge one detection's edge; a repeat mention replaces the weight
    fn merge_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<()> {
        if let Some(tx) = self.tx.as_mut() {
            // write mode only ever sees persisted endpoints
            if let (NodeId::Persisted(from_id), NodeId::Persisted(to_id)) = (&from, &to) {
                tx.merge_relationship(
                    from_id,
                    to_id,
                    &self.options.rel_type,
                    &self.options.weight_property,
                    weight,
                )?;
            }
        }

        let key = (from.clone(), to.clone(), self.options.rel_type.clone());
        match self.by_endpoints.get(&key) {
            Some(&index) => {
                self.edges[index]
                    .properties
                    .insert(self.options.weight_property.clone(), Value::from(weight));
            }
            None => {
                let mut properties = BTreeMap::new();
                properties.insert(self.options.weight_property.clone(), Value::from(weight));
                self.by_endpoints.insert(key, self.edges.len());
                self.edges.push(GraphEdge {
                    from,
                    to,
                    rel_type: self.options.rel_type.clone(),
                    properties,
                });
            }
        }
        Ok(())
    }
}
