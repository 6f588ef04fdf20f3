//! HTTP/REST API layer for newsbot.
//!
//! Axum-based JSON API under `/api/chat`, with permissive CORS and
//! request tracing.

pub mod error;
pub mod handlers;
pub mod router;
