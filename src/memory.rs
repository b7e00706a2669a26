//! In-memory chunk store for unit tests.

use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreQueryError;
use crate::models::Chunk;
use crate::store::ChunkStore;

/// A `ChunkStore` backed by a `Vec`, mirroring the SQLite lookup
/// semantics closely enough for router and retrieval tests.
#[derive(Default)]
pub struct InMemoryStore {
    chunks: RwLock<Vec<Chunk>>,
    fail_date_lookups: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose date lookups always fail, for exercising the
    /// degradation path of the query router.
    pub fn with_failing_date_lookups() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
            fail_date_lookups: true,
        }
    }

    fn field_values<'a>(chunk: &'a Chunk, fields: &[&str]) -> Vec<&'a str> {
        fields
            .iter()
            .flat_map(|field| {
                [&chunk.metadata, &chunk.content]
                    .into_iter()
                    .filter_map(move |doc| doc.get(field).and_then(Value::as_str))
            })
            .collect()
    }

    fn collect_matching<F>(&self, limit: usize, predicate: F) -> Vec<Chunk>
    where
        F: Fn(&Chunk) -> bool,
    {
        let chunks = self.chunks.read().unwrap_or_else(|e| e.into_inner());
        chunks
            .iter()
            .filter(|chunk| predicate(chunk))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ChunkStore for InMemoryStore {
    async fn put_chunk(&self, chunk: &Chunk) -> anyhow::Result<()> {
        let mut chunks = self.chunks.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = chunks.iter_mut().find(|c| c.id == chunk.id) {
            *existing = chunk.clone();
        } else {
            chunks.push(chunk.clone());
        }
        Ok(())
    }

    async fn get_chunk(&self, id: &str) -> anyhow::Result<Option<Chunk>> {
        let chunks = self.chunks.read().unwrap_or_else(|e| e.into_inner());
        Ok(chunks.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_date_prefix(
        &self,
        fields: &[&str],
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<Chunk>, StoreQueryError> {
        if self.fail_date_lookups {
            return Err(StoreQueryError(anyhow!("date lookups disabled")));
        }
        Ok(self.collect_matching(limit, |chunk| {
            Self::field_values(chunk, fields)
                .iter()
                .any(|v| v.starts_with(prefix))
        }))
    }

    async fn find_by_date_range(
        &self,
        fields: &[&str],
        start: &str,
        end: &str,
        limit: usize,
    ) -> Result<Vec<Chunk>, StoreQueryError> {
        if self.fail_date_lookups {
            return Err(StoreQueryError(anyhow!("date lookups disabled")));
        }
        Ok(self.collect_matching(limit, |chunk| {
            Self::field_values(chunk, fields)
                .iter()
                .any(|v| *v >= start && *v <= end)
        }))
    }

    async fn search_text(&self, terms: &[String], limit: usize) -> anyhow::Result<Vec<Chunk>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.collect_matching(limit, |chunk| {
            let mut haystack = chunk.content.to_string();
            if let Some(text) = chunk.metadata.get("search_text").and_then(Value::as_str) {
                haystack.push(' ');
                haystack.push_str(text);
            }
            let haystack = haystack.to_lowercase();
            terms.iter().any(|term| haystack.contains(term.as_str()))
        }))
    }
}
