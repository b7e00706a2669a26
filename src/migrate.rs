use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Create chunks table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            parent_id TEXT,
            source_file TEXT NOT NULL,
            chunk_type TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_chunk_type ON chunks(chunk_type)")
        .execute(&pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_source_file ON chunks(source_file)")
        .execute(&pool)
        .await?;

    // Precomputed aggregates keyed by (name, key). Declared ahead of a
    // population pass; date and generative answers do not read it yet.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS aggregates (
            name TEXT NOT NULL,
            key TEXT NOT NULL,
            value REAL NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(name, key)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(())
}
