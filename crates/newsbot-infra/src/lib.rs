//! Infrastructure layer for newsbot.
//!
//! Contains implementations of the ports defined in `newsbot-core`:
//! HTTP clients for the embedding (Jina), vector search (Qdrant) and
//! generation (Gemini) backends, the SQLite conversation store, and the
//! configuration/credential loader.

pub mod config;
pub mod http;
pub mod llm;
pub mod sqlite;
pub mod vector;
