//! SQLite-backed chunk store.
//!
//! Metadata and content are stored as JSON text and probed with
//! `json_extract`, so date lookups and substring search run inside the
//! database instead of deserializing every row.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::StoreQueryError;
use crate::models::Chunk;
use crate::store::ChunkStore;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// OR'd `json_extract` conditions probing each field in both the
    /// metadata and content documents. `op_sql` is the comparison tail
    /// applied to each extracted value (e.g. `LIKE ?`).
    fn date_conditions(fields: &[&str], op_sql: &str) -> String {
        let mut parts = Vec::with_capacity(fields.len() * 2);
        for field in fields {
            parts.push(format!("json_extract(metadata, '$.{field}') {op_sql}"));
            parts.push(format!("json_extract(content, '$.{field}') {op_sql}"));
        }
        parts.join(" OR ")
    }
}

fn row_to_chunk(row: SqliteRow) -> anyhow::Result<Chunk> {
    let metadata: String = row.try_get("metadata")?;
    let content: String = row.try_get("content")?;
    Ok(Chunk {
        id: row.try_get("id")?,
        parent_id: row.try_get("parent_id")?,
        source_file: row.try_get("source_file")?,
        chunk_type: row.try_get("chunk_type")?,
        metadata: serde_json::from_str(&metadata).context("chunk metadata is not valid JSON")?,
        content: serde_json::from_str(&content).context("chunk content is not valid JSON")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const SELECT_COLUMNS: &str =
    "SELECT id, parent_id, source_file, chunk_type, metadata, content, created_at, updated_at \
     FROM chunks";

#[async_trait]
impl ChunkStore for SqliteStore {
    async fn put_chunk(&self, chunk: &Chunk) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO chunks (id, parent_id, source_file, chunk_type, metadata, content, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
               parent_id = excluded.parent_id, \
               source_file = excluded.source_file, \
               chunk_type = excluded.chunk_type, \
               metadata = excluded.metadata, \
               content = excluded.content, \
               updated_at = excluded.updated_at",
        )
        .bind(&chunk.id)
        .bind(&chunk.parent_id)
        .bind(&chunk.source_file)
        .bind(&chunk.chunk_type)
        .bind(chunk.metadata.to_string())
        .bind(chunk.content.to_string())
        .bind(chunk.created_at)
        .bind(chunk.updated_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to store chunk {}", chunk.id))?;
        Ok(())
    }

    async fn get_chunk(&self, id: &str) -> anyhow::Result<Option<Chunk>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load chunk {id}"))?;
        row.map(row_to_chunk).transpose()
    }

    async fn find_by_date_prefix(
        &self,
        fields: &[&str],
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<Chunk>, StoreQueryError> {
        let conditions = Self::date_conditions(fields, "LIKE ?");
        let sql = format!("{SELECT_COLUMNS} WHERE {conditions} ORDER BY created_at LIMIT ?");
        let pattern = format!("{prefix}%");

        let mut query = sqlx::query(&sql);
        for _ in 0..fields.len() * 2 {
            query = query.bind(&pattern);
        }
        let rows = query
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .context("date prefix lookup failed")
            .map_err(StoreQueryError)?;

        rows.into_iter()
            .map(row_to_chunk)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(StoreQueryError)
    }

    async fn find_by_date_range(
        &self,
        fields: &[&str],
        start: &str,
        end: &str,
        limit: usize,
    ) -> Result<Vec<Chunk>, StoreQueryError> {
        let conditions = Self::date_conditions(fields, "BETWEEN ? AND ?");
        let sql = format!("{SELECT_COLUMNS} WHERE {conditions} ORDER BY created_at LIMIT ?");

        let mut query = sqlx::query(&sql);
        for _ in 0..fields.len() * 2 {
            query = query.bind(start).bind(end);
        }
        let rows = query
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .context("date range lookup failed")
            .map_err(StoreQueryError)?;

        rows.into_iter()
            .map(row_to_chunk)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(StoreQueryError)
    }

    async fn search_text(&self, terms: &[String], limit: usize) -> anyhow::Result<Vec<Chunk>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // Any-term match over the metadata search text, a conventional
        // content text field, and the raw content JSON.
        let condition = "(json_extract(metadata, '$.search_text') LIKE ? \
                         OR json_extract(content, '$.text') LIKE ? \
                         OR content LIKE ?)";
        let conditions = vec![condition; terms.len()].join(" OR ");
        let sql = format!("{SELECT_COLUMNS} WHERE {conditions} ORDER BY created_at LIMIT ?");

        let mut query = sqlx::query(&sql);
        for term in terms {
            let pattern = format!("%{term}%");
            query = query.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
        }
        let rows = query
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .context("text search failed")?;

        rows.into_iter().map(row_to_chunk).collect()
    }
}
