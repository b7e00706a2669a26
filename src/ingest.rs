//! File ingestion: repair, chunk, extract metadata, store.

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, info};

use crate::chunker::chunk_document;
use crate::error::ChunkingError;
use crate::metadata::extract_metadata;
use crate::models::{Chunk, ChunkReceipt};
use crate::repair::repair;
use crate::store::ChunkStore;

/// Ingest one JSON file: repair its text if needed, split it into
/// chunks, and store each chunk as an independent write. A failure
/// partway through leaves earlier chunks in place.
pub async fn ingest_file(
    store: &dyn ChunkStore,
    path: &Path,
    max_items: usize,
) -> Result<Vec<ChunkReceipt>, ChunkingError> {
    ingest_inner(store, path, max_items)
        .await
        .map_err(|e| ChunkingError::new(path.display().to_string(), e))
}

async fn ingest_inner(
    store: &dyn ChunkStore,
    path: &Path,
    max_items: usize,
) -> anyhow::Result<Vec<ChunkReceipt>> {
    let doc = load_document(path)?;
    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut receipts = Vec::new();
    for (chunk_type, content) in chunk_document(&doc, max_items) {
        let metadata = extract_metadata(&content, &chunk_type);
        let chunk = Chunk::new(&source_file, &chunk_type, metadata, content);
        store
            .put_chunk(&chunk)
            .await
            .with_context(|| format!("failed to store chunk {}", chunk.chunk_type))?;
        debug!(id = %chunk.id, chunk_type = %chunk.chunk_type, "stored chunk");
        receipts.push(ChunkReceipt {
            item_count: chunk.item_count(),
            chunk_id: chunk.id,
            chunk_type: chunk.chunk_type,
        });
    }

    info!(file = %path.display(), chunks = receipts.len(), "ingested file");
    Ok(receipts)
}

/// CLI entry point — ingests one file and prints a receipt per chunk.
pub async fn run_ingest(
    config: &crate::config::Config,
    path: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    let max_items = config.chunking.max_items;

    if dry_run {
        let doc = load_document(path).map_err(|e| ChunkingError::new(path.display().to_string(), e))?;
        let counts: Vec<(String, usize)> = chunk_document(&doc, max_items)
            .map(|(chunk_type, content)| {
                let items = match &content {
                    Value::Array(a) => a.len(),
                    Value::Object(o) => o.len(),
                    _ => 1,
                };
                (chunk_type, items)
            })
            .collect();

        println!("ingest {} (dry-run)", path.display());
        println!("  chunks: {}", counts.len());
        for (chunk_type, items) in &counts {
            println!("  {chunk_type}: {items} items");
        }
        return Ok(());
    }

    let pool = crate::db::connect(config).await?;
    let store = crate::sqlite_store::SqliteStore::new(pool);
    let receipts = ingest_file(&store, path, max_items).await?;

    println!("ingested {}", path.display());
    for receipt in &receipts {
        println!(
            "  {}  {} ({} items)",
            receipt.chunk_id, receipt.chunk_type, receipt.item_count
        );
    }
    println!("  total chunks: {}", receipts.len());
    Ok(())
}

/// Read and parse a JSON file, repairing common format defects first.
/// When repair changed the text, the repaired form is written to a
/// temporary file beside the source and parsed from there, so a parse
/// failure can be inspected against the exact bytes that failed. The
/// temp file is removed when it goes out of scope.
pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let repaired = repair(&raw)?;

    match repaired {
        Cow::Borrowed(text) => {
            serde_json::from_str(text).context("failed to parse JSON document")
        }
        Cow::Owned(text) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let mut temp = tempfile::Builder::new()
                .prefix(".repaired-")
                .suffix(".json")
                .tempfile_in(dir)
                .context("failed to create repair scratch file")?;
            temp.write_all(text.as_bytes())
                .context("failed to write repaired JSON")?;
            let repaired_text = std::fs::read_to_string(temp.path())
                .context("failed to re-read repaired JSON")?;
            serde_json::from_str(&repaired_text).context("failed to parse repaired JSON document")
        }
    }
}
