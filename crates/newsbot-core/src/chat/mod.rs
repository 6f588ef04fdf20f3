//! The retrieval-augmented answer pipeline.
//!
//! `ChatOrchestrator` embeds a message, retrieves context, decides whether
//! to call the language model at all, and records the exchange.

pub mod orchestrator;
pub mod prompt;
