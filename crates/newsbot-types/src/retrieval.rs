//! Retrieval types: passages returned by vector search and the tunables
//! that decide which of them ground an answer.

use serde::{Deserialize, Serialize};

/// A context snippet returned by vector search.
///
/// Transient: produced by a search provider and consumed within a single
/// `send_message` call. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: String,
    /// Similarity score, usually in `[0, 1]` (provider-defined).
    pub score: f32,
}

impl RetrievedPassage {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// How many passages to retrieve and how similar they must be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Maximum number of passages passed to the prompt.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Passages scoring below this are discarded. When none remain the
    /// language model is not called at all.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
}

fn default_limit() -> usize {
    3
}

fn default_score_threshold() -> f32 {
    0.6
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            score_threshold: default_score_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_defaults() {
        let settings = RetrievalSettings::default();
        assert_eq!(settings.limit, 3);
        assert!((settings.score_threshold - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_retrieval_partial_toml() {
        let settings: RetrievalSettings = toml::from_str("limit = 5").unwrap();
        assert_eq!(settings.limit, 5);
        assert!((settings.score_threshold - 0.6).abs() < f32::EPSILON);
    }
}
