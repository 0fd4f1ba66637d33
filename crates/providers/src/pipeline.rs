//! Annotation pipeline
//!
//! Drives one invocation end to end: validate configuration, read the text
//! off every document, partition into batches, fetch provider results, and
//! reduce them back in partition order.
//!
//! All batches are fetched before any assembly or staging happens. Graph
//! calls therefore abort cleanly on a failed batch with nothing staged,
//! and in write mode the store sees either the whole invocation or none
//! of it.

use lexigraph_core::{
    partition, AnalysisKind, AssembleOptions, CoreError, Graph, GraphAssembler, NlpConfig,
    SourceDocument, TransactionContext, WEIGHT_PROPERTY,
};
use lexigraph_db::{DbConnection, GraphTransaction};
use serde::Serialize;
use surrealdb::RecordId;
use tracing::{debug, info, instrument};

use crate::client::{NlpClient, ProviderBatch};
use crate::Result;

/// Stream-style result for one document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub document: RecordId,
    pub value: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Run a graph-style invocation: analyze every document and fold the
/// detections into one combined graph.
///
/// Any failed batch fails the whole call. With `write` set, the graph is
/// also persisted, inside a single transaction committed at the end; the
/// returned graph then carries the stored record ids.
#[instrument(skip(client, documents, config, db))]
pub async fn annotate_graph(
    client: &dyn NlpClient,
    documents: Vec<SourceDocument>,
    kind: AnalysisKind,
    config: &NlpConfig,
    db: Option<&DbConnection>,
) -> Result<Graph> {
    config.validate()?;
    let rel_type = config.resolved_relationship_type(kind)?;
    if config.write && db.is_none() {
        return Err(CoreError::WriteWithoutTransaction.into());
    }

    let batches = into_batches(documents, config)?;
    info!(
        "Annotating {} batches for {} graph",
        batches.len(),
        kind
    );
    let responses = fetch_all(client, &batches, kind).await?;

    let options = AssembleOptions {
        kind,
        rel_type,
        weight_property: WEIGHT_PROPERTY.to_string(),
        confidence_cutoff: config.confidence_cutoff,
        match_labels: config.match_labels,
    };

    if config.write {
        let db = db.ok_or(CoreError::WriteWithoutTransaction)?;
        let mut tx = GraphTransaction::begin(db.clone(), &options.rel_type).await?;
        let graph = assemble(options, &batches, &responses, Some(&mut tx))?;
        debug!(staged = tx.staged(), "Persisting assembled graph");
        tx.commit().await?;
        Ok(graph)
    } else {
        assemble(options, &batches, &responses, None)
    }
}

/// Run a stream-style invocation: one record per document, in input order,
/// carrying the provider's raw payload.
///
/// A failed batch does not abort the call; every document of that batch
/// reports the failure in its own record and the remaining batches are
/// still processed.
#[instrument(skip(client, documents, config))]
pub async fn annotate_stream(
    client: &dyn NlpClient,
    documents: Vec<SourceDocument>,
    kind: AnalysisKind,
    config: &NlpConfig,
) -> Result<Vec<DocumentRecord>> {
    config.validate()?;

    let batches = into_batches(documents, config)?;
    info!("Streaming {} batches for {}", batches.len(), kind);

    let mut records = Vec::new();
    for batch in batches {
        let texts: Vec<String> = batch.iter().map(|(_, text)| text.clone()).collect();
        match client.fetch(&texts, kind).await {
            Ok(response) => {
                for (doc_index, (doc, _)) in batch.into_iter().enumerate() {
                    records.push(DocumentRecord {
                        document: doc.id,
                        value: response.value(doc_index),
                        error: response.error(doc_index),
                    });
                }
            }
            Err(e) => {
                let message = e.to_string();
                for (doc, _) in batch {
                    records.push(DocumentRecord {
                        document: doc.id,
                        value: None,
                        error: Some(message.clone()),
                    });
                }
            }
        }
    }

    Ok(records)
}

/// Pair every document with its text and partition the lot.
///
/// A document without the configured text property fails the invocation
/// here, before anything goes over the wire.
fn into_batches(
    documents: Vec<SourceDocument>,
    config: &NlpConfig,
) -> Result<Vec<Vec<(SourceDocument, String)>>> {
    let mut paired = Vec::with_capacity(documents.len());
    for doc in documents {
        let text = doc.get_property(&config.node_property)?;
        paired.push((doc, text));
    }
    Ok(partition(paired, config.batch_size)?)
}

async fn fetch_all(
    client: &dyn NlpClient,
    batches: &[Vec<(SourceDocument, String)>],
    kind: AnalysisKind,
) -> Result<Vec<ProviderBatch>> {
    let mut responses = Vec::with_capacity(batches.len());
    for batch in batches {
        let texts: Vec<String> = batch.iter().map(|(_, text)| text.clone()).collect();
        responses.push(client.fetch(&texts, kind).await?);
    }
    Ok(responses)
}

/// Reduce fetched responses into the combined graph, in partition order.
fn assemble(
    options: AssembleOptions,
    batches: &[Vec<(SourceDocument, String)>],
    responses: &[ProviderBatch],
    tx: Option<&mut dyn TransactionContext>,
) -> Result<Graph> {
    let mut assembler = GraphAssembler::new(options, tx)?;
    for (batch, response) in batches.iter().zip(responses.iter()) {
        for (doc_index, (doc, _)) in batch.iter().enumerate() {
            assembler.process_document(doc, response.items(doc_index))?;
        }
    }
    Ok(assembler.finish())
}
