//! Chat pipeline and port definitions for newsbot.
//!
//! This crate defines the "ports" the infrastructure layer implements
//! (embedding, vector search, generation, conversation storage) and the
//! `ChatOrchestrator` that composes them. It depends only on
//! `newsbot-types` -- never on `newsbot-infra` or any network/database crate.

pub mod chat;
pub mod clock;
pub mod history;
pub mod provider;
