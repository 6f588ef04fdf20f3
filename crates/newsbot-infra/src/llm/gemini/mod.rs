//! Google Gemini generation provider.
//!
//! This module provides the [`GeminiProvider`] which implements the
//! [`GenerationProvider`](newsbot_core::provider::generator::GenerationProvider)
//! trait for the Gemini `generateContent` REST endpoint.

pub mod client;
pub mod types;

pub use client::GeminiProvider;
