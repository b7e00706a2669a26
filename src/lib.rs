//! # jsonrag
//!
//! A local-first pipeline for querying large, messy JSON exports.
//!
//! jsonrag ingests JSON documents — including malformed MongoDB-style
//! exports — by repairing their format, splitting them into bounded
//! chunks, extracting lookup metadata, and storing everything in SQLite.
//! Natural-language questions are routed either to direct date lookups
//! against the store or to a retrieval-plus-language-model path.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌─────────┐
//! │  Repair  │──▶│ Chunker  │──▶│ Metadata │──▶│ SQLite  │
//! └──────────┘   └──────────┘   └──────────┘   └────┬────┘
//!                                                   │
//!                        ┌──────────────────────────┤
//!                        ▼                          ▼
//!                 ┌─────────────┐           ┌──────────────┐
//!                 │ Date lookup │           │ Retrieval +  │
//!                 │  (direct)   │           │ LLM gateway  │
//!                 └─────────────┘           └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`repair`] | JSON format repair pipeline |
//! | [`chunker`] | Streaming document chunking |
//! | [`metadata`] | Chunk metadata extraction |
//! | [`dates`] | Temporal intent extraction |
//! | [`store`] | Chunk storage abstraction |
//! | [`query`] | Query routing |
//! | [`retrieve`] | Context retrieval and prompt assembly |
//! | [`llm`] | Language model gateway |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod chunker;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod get;
pub mod ingest;
pub mod llm;
pub mod memory;
pub mod metadata;
pub mod migrate;
pub mod models;
pub mod query;
pub mod repair;
pub mod retrieve;
pub mod sqlite_store;
pub mod store;
