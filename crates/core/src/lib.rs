//! Core engine for turning language-analysis results into property graphs
//!
//! This crate defines the document and item model, the identity rules that
//! deduplicate detections across documents, and the assembler that folds
//! provider batches into a single graph per invocation. It is synchronous
//! and storage-agnostic: write mode goes through the [`TransactionContext`]
//! seam, implemented elsewhere.

pub mod assemble;
pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod identity;
pub mod item;
pub mod kind;
pub mod partition;
pub mod store;

pub use assemble::{AssembleOptions, GraphAssembler};
pub use config::{NlpConfig, DEFAULT_BATCH_SIZE, WEIGHT_PROPERTY};
pub use document::SourceDocument;
pub use error::{CoreError, Result};
pub use graph::{Graph, GraphEdge, GraphNode, NodeId};
pub use identity::NodeIdentity;
pub use item::ExtractedItem;
pub use kind::AnalysisKind;
pub use partition::partition;
pub use store::TransactionContext;
