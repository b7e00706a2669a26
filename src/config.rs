use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
        }
    }
}

fn default_max_items() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Maximum rows returned by a direct date lookup.
    #[serde(default = "default_direct_limit")]
    pub direct_limit: usize,
    /// Maximum chunks assembled into a generative prompt.
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,
    /// Sample records echoed in direct-answer metadata.
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            direct_limit: default_direct_limit(),
            context_limit: default_context_limit(),
            sample_limit: default_sample_limit(),
        }
    }
}

fn default_direct_limit() -> usize {
    10
}
fn default_context_limit() -> usize {
    5
}
fn default_sample_limit() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate chunking
    if config.chunking.max_items == 0 {
        anyhow::bail!("chunking.max_items must be > 0");
    }

    // Validate retrieval
    if config.retrieval.direct_limit < 1 {
        anyhow::bail!("retrieval.direct_limit must be >= 1");
    }
    if config.retrieval.context_limit < 1 {
        anyhow::bail!("retrieval.context_limit must be >= 1");
    }

    // Validate llm
    match config.llm.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown llm provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    Ok(config)
}
