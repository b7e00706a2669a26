//! Context retrieval and prompt assembly for the generative path.

use anyhow::Result;

use crate::models::Chunk;
use crate::store::ChunkStore;

/// System prompt sent with every generative completion.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on \
the provided JSON data context. If you don't know the answer based on the context, just say \
that you don't know. Keep answers concise and factual.";

/// Split a query into search terms: lowercased whitespace tokens longer
/// than two characters. Short tokens ("is", "a", "of") match too much
/// stored JSON to be useful.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.len() > 2)
        .map(str::to_string)
        .collect()
}

/// Fetch up to `limit` chunks whose stored text matches any query term.
pub async fn relevant_chunks(
    store: &dyn ChunkStore,
    query: &str,
    limit: usize,
) -> Result<Vec<Chunk>> {
    let terms = tokenize(query);
    if terms.is_empty() {
        return Ok(Vec::new());
    }
    store.search_text(&terms, limit).await
}

/// Assemble the user prompt from retrieved chunks plus the question.
pub fn build_user_prompt(query: &str, chunks: &[Chunk]) -> String {
    let mut prompt = String::from("Context:\n");
    for (i, chunk) in chunks.iter().enumerate() {
        let content =
            serde_json::to_string_pretty(&chunk.content).unwrap_or_else(|_| "null".to_string());
        prompt.push_str(&format!(
            "--- Chunk {} (Source: {}, Type: {}) ---\n{}\n",
            i + 1,
            chunk.source_file,
            chunk.chunk_type,
            content
        ));
    }
    prompt.push_str(&format!("\nQuestion: {query}"));
    prompt
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::InMemoryStore;
    use crate::models::Chunk;

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(
            tokenize("What is the Average Glucose of it?"),
            vec!["what", "the", "average", "glucose", "it?"]
        );
        assert!(tokenize("a of is").is_empty());
    }

    #[tokio::test]
    async fn test_relevant_chunks_matches_any_term() {
        let store = InMemoryStore::new();
        store
            .put_chunk(&Chunk::new(
                "health.json",
                "object",
                json!({}),
                json!({"measurement": "glucose", "value": 98}),
            ))
            .await
            .unwrap();
        store
            .put_chunk(&Chunk::new(
                "health.json",
                "object",
                json!({}),
                json!({"measurement": "pulse", "value": 64}),
            ))
            .await
            .unwrap();

        let chunks = relevant_chunks(&store, "glucose trends", 5)
            .await
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content["measurement"], "glucose");
    }

    #[tokio::test]
    async fn test_empty_terms_skip_the_store() {
        let store = InMemoryStore::new();
        let chunks = relevant_chunks(&store, "a b c", 5).await.unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_user_prompt_shape() {
        let chunk = Chunk::new("data.json", "object", json!({}), json!({"k": "v"}));
        let prompt = build_user_prompt("what is k?", &[chunk]);

        assert!(prompt.starts_with("Context:\n"));
        assert!(prompt.contains("--- Chunk 1 (Source: data.json, Type: object) ---"));
        assert!(prompt.contains("\"k\": \"v\""));
        assert!(prompt.ends_with("Question: what is k?"));
    }
}
