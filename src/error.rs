//! Typed failures for the ingestion and query pipeline.
//!
//! Most orchestration code uses `anyhow::Result`; these types exist for
//! the failures callers need to react to differently: repair failures
//! propagate out of ingestion, store failures degrade a direct lookup
//! into the language-model path, and gateway failures become labeled
//! response text instead of an error.

use thiserror::Error;

/// Input text could not be rewritten into syntactically valid JSON.
///
/// Carries the parse error for the *original* input, not the rewritten
/// text — repair is best-effort and the original error is what the user
/// can act on.
#[derive(Debug, Error)]
#[error("input is not valid JSON (repair attempted): {0}")]
pub struct RepairError(#[source] pub serde_json::Error);

/// A failure while loading, repairing, or splitting a source document,
/// annotated with the file it came from.
#[derive(Debug, Error)]
#[error("error processing JSON file {file}: {source}")]
pub struct ChunkingError {
    pub file: String,
    #[source]
    pub source: anyhow::Error,
}

impl ChunkingError {
    pub fn new(file: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
        }
    }
}

/// A direct-lookup query against the chunk store failed.
///
/// Never surfaced to the end user as a hard failure — the router catches
/// it and falls through to complex handling.
#[derive(Debug, Error)]
#[error("store query failed: {0}")]
pub struct StoreQueryError(#[source] pub anyhow::Error);

/// The hosted language model could not produce a completion.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct GatewayError(pub String);
