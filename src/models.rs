//! Core data models.
//!
//! These types represent the chunks that flow through the ingestion
//! pipeline and the outcomes produced by the query router.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A bounded-size unit of JSON data stored with extracted metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    /// Process-generated unique identifier, assigned at creation.
    pub id: String,
    /// Optional reference to a hierarchically enclosing chunk. Not
    /// populated by the current chunking rules; kept for future
    /// hierarchical splitting. No referential integrity is enforced.
    pub parent_id: Option<String>,
    /// Name of the originating document.
    pub source_file: String,
    /// How this chunk was produced: a key-derived name, an
    /// index-suffixed array-slice name, or a root-level marker.
    pub chunk_type: String,
    /// Freeform metadata record produced by the extractor.
    pub metadata: Value,
    /// The actual JSON payload (object, array slice, or scalar).
    pub content: Value,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Chunk {
    /// Create a chunk with a fresh UUID and current timestamps.
    pub fn new(source_file: &str, chunk_type: &str, metadata: Value, content: Value) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: None,
            source_file: source_file.to_string(),
            chunk_type: chunk_type.to_string(),
            metadata,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of items carried by this chunk (array length, else 1).
    pub fn item_count(&self) -> usize {
        match &self.content {
            Value::Array(items) => items.len(),
            _ => 1,
        }
    }
}

/// Per-chunk summary returned from an ingestion pass.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkReceipt {
    pub chunk_id: String,
    pub chunk_type: String,
    pub item_count: usize,
}

/// The answer produced by the query router.
///
/// The router always produces an outcome — direct-lookup failures fall
/// through to the language model, and gateway failures are folded into
/// the response text rather than propagated.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub response: String,
    pub is_direct: bool,
    pub metadata: Value,
}
