//! Storage abstraction for chunk persistence and lookup.

use async_trait::async_trait;

use crate::error::StoreQueryError;
use crate::models::Chunk;

/// Fields probed by date lookups, in both the metadata and content
/// surfaces of a chunk.
pub const DATE_LOOKUP_FIELDS: [&str; 2] = ["created_at", "date"];

/// Backend-agnostic chunk storage.
///
/// Date lookups return `StoreQueryError` so the query router can
/// degrade to the generative path instead of failing the request.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Persist a single chunk. Each call is an independent write.
    async fn put_chunk(&self, chunk: &Chunk) -> anyhow::Result<()>;

    /// Fetch a chunk by id.
    async fn get_chunk(&self, id: &str) -> anyhow::Result<Option<Chunk>>;

    /// Chunks whose metadata or content carries any of `fields` with a
    /// string value starting with `prefix`.
    async fn find_by_date_prefix(
        &self,
        fields: &[&str],
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<Chunk>, StoreQueryError>;

    /// Chunks whose metadata or content carries any of `fields` with a
    /// string value in the inclusive `[start, end]` range.
    async fn find_by_date_range(
        &self,
        fields: &[&str],
        start: &str,
        end: &str,
        limit: usize,
    ) -> Result<Vec<Chunk>, StoreQueryError>;

    /// Chunks matching any of `terms` as a case-insensitive substring
    /// of their searchable text.
    async fn search_text(&self, terms: &[String], limit: usize) -> anyhow::Result<Vec<Chunk>>;
}
