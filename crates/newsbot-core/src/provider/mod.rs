//! Provider ports for the retrieval-augmented pipeline.
//!
//! - `EmbeddingProvider`: text to a fixed-dimension vector
//! - `VectorSearchProvider`: vector to ranked context passages
//! - `GenerationProvider`: prompt to completion text
//!
//! Each trait uses RPITIT and has a `Box*` wrapper for runtime selection.
//! Implementations live in newsbot-infra.

pub mod box_embedder;
pub mod box_generator;
pub mod box_search;
pub mod embedder;
pub mod generator;
pub mod search;
