//! Language service providers for lexigraph
//!
//! This crate connects the graph engine to the external analyzers:
//! - Gcp: Google Cloud Natural Language over HTTP
//! - Dummy: deterministic offline stand-in for every analysis kind
//! - Pipeline: the batch/fetch/assemble loop behind graph and stream calls

mod aws;
pub mod client;
pub mod dummy;
pub mod error;
pub mod gcp;
pub mod pipeline;

pub use client::{DocumentOutcome, NlpClient, ProviderBatch};
pub use dummy::DummyClient;
pub use error::{ProviderError, Result};
pub use gcp::GcpClient;
pub use pipeline::{annotate_graph, annotate_stream, DocumentRecord};
