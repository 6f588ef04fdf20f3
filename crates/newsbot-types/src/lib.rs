//! Shared domain types for newsbot.
//!
//! This crate contains the types passed between the chat pipeline, its
//! providers and the conversation store: sessions, turns, retrieved
//! passages, configuration and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod retrieval;
