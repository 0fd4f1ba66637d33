//! Lexigraph CLI
//!
//! A command-line interface for the Lexigraph annotation engine.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexigraph_core::{AnalysisKind, NlpConfig, SourceDocument, WEIGHT_PROPERTY};
use lexigraph_db::{init_memory, init_persistent, label_table, DbConnection, Repository};
use lexigraph_providers::{annotate_graph, annotate_stream, DummyClient, GcpClient, NlpClient};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Lexigraph - Language-analysis graphs over your documents
#[derive(Parser)]
#[command(name = "lexigraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database path (defaults to ~/.lexigraph/data)
    #[arg(short, long)]
    db_path: Option<PathBuf>,

    /// Use in-memory database (for testing)
    #[arg(long)]
    memory: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a document
    Add {
        /// Document text (reads from stdin if not provided)
        text: Option<String>,

        /// Document title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Import a text file as a document
    Import {
        /// Path to file
        path: PathBuf,
    },

    /// List recent documents
    List {
        /// Maximum results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show a document by ID
    Show {
        /// Document ID (e.g., document:xxxxxxxx)
        document_id: String,
    },

    /// Analyze documents and fold the detections into one graph
    Annotate {
        /// Analysis kind: entities, key-phrases or categories
        kind: String,

        /// Document IDs to annotate (comma-separated, defaults to all)
        #[arg(short, long)]
        ids: Option<String>,

        /// Provider API key (defaults to $GCP_API_KEY)
        #[arg(short, long)]
        key: Option<String>,

        /// Drop detections scoring below this
        #[arg(short, long, default_value = "0.0")]
        cutoff: f64,

        /// Persist the graph instead of printing a virtual one
        #[arg(short, long)]
        write: bool,

        /// Override the relationship type
        #[arg(long)]
        relationship_type: Option<String>,

        /// Documents per provider request
        #[arg(short, long, default_value = "25")]
        batch_size: usize,

        /// Identify nodes by properties alone, ignoring labels
        #[arg(long)]
        ignore_labels: bool,

        /// Use the offline dummy client instead of a live provider
        #[arg(long)]
        dummy: bool,
    },

    /// Analyze documents and print one raw result record per document
    Stream {
        /// Analysis kind: entities, key-phrases, categories or sentiment
        kind: String,

        /// Document IDs to analyze (comma-separated, defaults to all)
        #[arg(short, long)]
        ids: Option<String>,

        /// Provider API key (defaults to $GCP_API_KEY)
        #[arg(short, long)]
        key: Option<String>,

        /// Documents per provider request
        #[arg(short, long, default_value = "25")]
        batch_size: usize,

        /// Use the offline dummy client instead of a live provider
        #[arg(long)]
        dummy: bool,
    },

    /// List stored nodes for one analysis kind
    Nodes {
        /// Analysis kind: entities, key-phrases or categories
        kind: String,
    },

    /// List stored relationships of one type
    Edges {
        /// Relationship type (e.g., ENTITY)
        #[arg(default_value = "ENTITY")]
        rel_type: String,
    },

    /// Show database statistics
    Stats,

    /// Delete the local database (fresh start)
    ResetDb {
        /// Database path (defaults to ~/.lexigraph/data)
        #[arg(short, long)]
        db_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Initialize database
    if let Commands::ResetDb { db_path } = &cli.command {
        let path = db_path.clone().unwrap_or_else(|| {
            let mut path = dirs::home_dir().expect("Could not find home directory");
            path.push(".lexigraph");
            path.push("data");
            path
        });

        if path.exists() {
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove db at {}", path.display()))?;
            println!("✓ Removed database at {}", path.display());
        } else {
            println!("Database not found at {}, nothing to remove", path.display());
        }
        return Ok(());
    }

    let db = if cli.memory {
        info!("Using in-memory database");
        init_memory().await?
    } else {
        let db_path = cli.db_path.unwrap_or_else(|| {
            let mut path = dirs::home_dir().expect("Could not find home directory");
            path.push(".lexigraph");
            path.push("data");
            path
        });

        // Ensure directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Using database at: {}", db_path.display());
        init_persistent(&db_path).await?
    };

    let repo = Repository::new(db.clone());

    // Execute command
    match cli.command {
        Commands::Add { text, title } => {
            cmd_add(repo, text, title).await?;
        }
        Commands::Import { path } => {
            cmd_import(repo, path).await?;
        }
        Commands::List { limit } => {
            cmd_list(repo, limit).await?;
        }
        Commands::Show { document_id } => {
            cmd_show(repo, document_id).await?;
        }
        Commands::Annotate {
            kind,
            ids,
            key,
            cutoff,
            write,
            relationship_type,
            batch_size,
            ignore_labels,
            dummy,
        } => {
            let config = NlpConfig {
                key: key.or_else(|| std::env::var("GCP_API_KEY").ok()),
                write,
                relationship_type,
                confidence_cutoff: cutoff,
                batch_size,
                match_labels: !ignore_labels,
                use_dummy_client: dummy,
                ..NlpConfig::default()
            };
            cmd_annotate(repo, db, kind, ids, config).await?;
        }
        Commands::Stream {
            kind,
            ids,
            key,
            batch_size,
            dummy,
        } => {
            let config = NlpConfig {
                key: key.or_else(|| std::env::var("GCP_API_KEY").ok()),
                batch_size,
                use_dummy_client: dummy,
                ..NlpConfig::default()
            };
            cmd_stream(repo, kind, ids, config).await?;
        }
        Commands::Nodes { kind } => {
            cmd_nodes(repo, kind).await?;
        }
        Commands::Edges { rel_type } => {
            cmd_edges(repo, rel_type).await?;
        }
        Commands::Stats => {
            cmd_stats(repo).await?;
        }
        Commands::ResetDb { .. } => {
            // Handled before database init.
        }
    }

    Ok(())
}

async fn cmd_add(repo: Repository, text: Option<String>, title: Option<String>) -> Result<()> {
    let text = match text {
        Some(t) => t,
        None => {
            // Read from stdin
            eprintln!("Enter document text (Ctrl+D to finish):");
            let stdin = io::stdin();
            let lines: Vec<String> = stdin.lock().lines()
                .filter_map(|l| l.ok())
                .collect();
            lines.join("\n")
        }
    };

    if text.trim().is_empty() {
        anyhow::bail!("Document text cannot be empty");
    }

    let mut properties = serde_json::Map::new();
    properties.insert("text".to_string(), serde_json::Value::String(text));
    if let Some(title) = title {
        properties.insert("title".to_string(), serde_json::Value::String(title));
    }

    let doc = repo
        .create_document(serde_json::Value::Object(properties))
        .await?;
    println!("✓ Created document: {}", doc.id);

    Ok(())
}

async fn cmd_import(repo: Repository, path: PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    if text.trim().is_empty() {
        anyhow::bail!("File is empty: {}", path.display());
    }

    let mut properties = serde_json::Map::new();
    properties.insert("text".to_string(), serde_json::Value::String(text));
    properties.insert(
        "source".to_string(),
        serde_json::Value::String(path.display().to_string()),
    );

    let doc = repo
        .create_document(serde_json::Value::Object(properties))
        .await?;
    println!("✓ Imported {} as {}", path.display(), doc.id);

    Ok(())
}

async fn cmd_list(repo: Repository, limit: usize) -> Result<()> {
    let docs = repo.list_documents(limit).await?;

    if docs.is_empty() {
        println!("No documents yet. Add one with: lexigraph add \"your text\"");
        return Ok(());
    }

    println!("Recent documents ({}):\n", docs.len());

    for doc in docs {
        let title = doc
            .properties
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("(untitled)");
        let text = doc
            .properties
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let preview: String = text.chars().take(80).collect();

        println!("• {} [{}]", title, doc.id);
        println!("  {}{}", preview, if text.len() > 80 { "..." } else { "" });
        println!();
    }

    Ok(())
}

async fn cmd_show(repo: Repository, document_id: String) -> Result<()> {
    let key = document_id.strip_prefix("document:").unwrap_or(&document_id);
    let doc = repo
        .get_document(key)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Document not found: {}", document_id))?;

    let title = doc
        .properties
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("(untitled)");
    println!("Document: {} ({})", title, doc.id);
    println!("Ingested: {}", doc.ingested_at.to_rfc3339());
    for (name, value) in &doc.properties {
        if name == "text" || name == "title" {
            continue;
        }
        println!("{}: {}", name, value);
    }
    println!();
    if let Some(text) = doc.properties.get("text").and_then(|v| v.as_str()) {
        println!("{}", text);
    }

    Ok(())
}

async fn cmd_annotate(
    repo: Repository,
    db: DbConnection,
    kind: String,
    ids: Option<String>,
    config: NlpConfig,
) -> Result<()> {
    let kind: AnalysisKind = kind.parse()?;
    let documents = select_documents(&repo, ids).await?;
    if documents.is_empty() {
        anyhow::bail!("No documents to annotate");
    }

    let client = build_client(&config);
    let graph = annotate_graph(client.as_ref(), documents, kind, &config, Some(&db)).await?;

    println!(
        "✓ Assembled graph: {} nodes, {} relationships{}",
        graph.nodes.len(),
        graph.relationships.len(),
        if config.write { " (persisted)" } else { " (virtual)" }
    );

    for node in &graph.nodes {
        let display = if node.labels.iter().any(|l| l == SourceDocument::LABEL) {
            node.id.to_string()
        } else {
            node.property_str("text").unwrap_or("(unnamed)").to_string()
        };
        println!("  • {} [{}]", display, node.labels.join(", "));
    }

    if !graph.relationships.is_empty() {
        println!();
        for edge in &graph.relationships {
            let weight = edge
                .weight(WEIGHT_PROPERTY)
                .map(|w| format!("{:.2}", w))
                .unwrap_or_else(|| "-".into());
            println!(
                "  • {} -[{}]-> {} ({}: {})",
                edge.from, edge.rel_type, edge.to, WEIGHT_PROPERTY, weight
            );
        }
    }

    Ok(())
}

async fn cmd_stream(
    repo: Repository,
    kind: String,
    ids: Option<String>,
    config: NlpConfig,
) -> Result<()> {
    let kind: AnalysisKind = kind.parse()?;
    let documents = select_documents(&repo, ids).await?;
    if documents.is_empty() {
        anyhow::bail!("No documents to analyze");
    }

    let client = build_client(&config);
    let records = annotate_stream(client.as_ref(), documents, kind, &config).await?;

    for record in records {
        println!("{}", serde_json::to_string(&record)?);
    }

    Ok(())
}

async fn cmd_nodes(repo: Repository, kind: String) -> Result<()> {
    let kind: AnalysisKind = kind.parse()?;
    let label = kind
        .node_label()
        .ok_or_else(|| anyhow::anyhow!("No stored nodes for {} analysis", kind))?;
    let nodes = repo.list_nodes(&label_table(label)).await?;

    if nodes.is_empty() {
        println!("No {} nodes stored yet.", label);
        return Ok(());
    }

    println!("{} nodes ({}):", label, nodes.len());
    for node in nodes {
        let node_type = node.node_type.as_deref().unwrap_or("-");
        println!("  • {} [{}] ({})", node.text, node_type, node.id);
    }

    Ok(())
}

async fn cmd_edges(repo: Repository, rel_type: String) -> Result<()> {
    let edges = repo.list_relationships(&rel_type).await?;

    if edges.is_empty() {
        println!("No {} relationships stored yet.", rel_type);
        return Ok(());
    }

    println!("{} relationships ({}):", rel_type, edges.len());
    for edge in edges {
        let score = edge
            .score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".into());
        println!("  • {} -> {} (score: {})", edge.source, edge.target, score);
    }

    Ok(())
}

async fn cmd_stats(repo: Repository) -> Result<()> {
    let stats = repo.get_stats().await?;

    println!("Database Statistics:");
    println!("  • Documents: {}", stats.document_count);
    println!("  • Entities: {}", stats.entity_count);
    println!("  • Key phrases: {}", stats.key_phrase_count);
    println!("  • Categories: {}", stats.category_count);
    println!("  • Relationships: {}", stats.relationship_count);

    Ok(())
}

/// Resolve the documents an invocation targets: the given comma-separated
/// IDs, or every stored document when none are named.
async fn select_documents(repo: &Repository, ids: Option<String>) -> Result<Vec<SourceDocument>> {
    let rows = match ids {
        Some(ids) => {
            let keys: Vec<String> = ids
                .split(',')
                .map(|s| {
                    let s = s.trim();
                    s.strip_prefix("document:").unwrap_or(s).to_string()
                })
                .collect();
            repo.get_documents(&keys).await?
        }
        None => repo.list_documents(usize::MAX).await?,
    };
    Ok(rows.into_iter().map(|row| row.into_source()).collect())
}

fn build_client(config: &NlpConfig) -> Box<dyn NlpClient> {
    if config.use_dummy_client {
        Box::new(DummyClient::new())
    } else {
        // A missing key is rejected by config validation before any request goes out.
        Box::new(GcpClient::new(config.key.clone().unwrap_or_default()))
    }
}
