//! Chunk retrieval by ID.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::db;
use crate::models::Chunk;
use crate::sqlite_store::SqliteStore;
use crate::store::ChunkStore;

/// Fetch a chunk by UUID, erroring when it does not exist.
pub async fn get_chunk(config: &Config, id: &str) -> Result<Chunk> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    match store.get_chunk(id).await? {
        Some(chunk) => Ok(chunk),
        None => bail!("chunk not found: {}", id),
    }
}

/// CLI entry point — calls get_chunk and prints to stdout.
pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let chunk = match get_chunk(config, id).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("--- Chunk ---");
    println!("id:          {}", chunk.id);
    if let Some(ref parent) = chunk.parent_id {
        println!("parent_id:   {}", parent);
    }
    println!("source_file: {}", chunk.source_file);
    println!("chunk_type:  {}", chunk.chunk_type);
    println!("created_at:  {}", format_ts_iso(chunk.created_at));
    println!("updated_at:  {}", format_ts_iso(chunk.updated_at));
    println!("metadata:    {}", chunk.metadata);
    println!();

    println!("--- Content ---");
    println!(
        "{}",
        serde_json::to_string_pretty(&chunk.content).unwrap_or_else(|_| "null".to_string())
    );

    Ok(())
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
