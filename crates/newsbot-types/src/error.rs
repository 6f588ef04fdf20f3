use thiserror::Error;

/// Errors raised by an upstream embedding, search or generation backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("empty response: {0}")]
    EmptyResponse(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("provider misconfigured: {0}")]
    Configuration(String),
}

/// Errors from the conversation store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("corrupt stored turn: {0}")]
    Corrupt(String),
}

/// Errors surfaced by the chat pipeline to its caller.
///
/// Provider failures are wrapped, never converted into fallback answers.
/// The one fallback reply the pipeline produces comes from a successful
/// but empty retrieval, which is not an error.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[source] ProviderError),

    #[error("vector search unavailable: {0}")]
    SearchUnavailable(#[source] ProviderError),

    #[error("generation unavailable: {0}")]
    GenerationUnavailable(#[source] ProviderError),

    #[error("conversation store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// A session id that is not a canonical hyphenated UUID string.
#[derive(Debug, Error)]
#[error("session id must be a hyphenated UUID, got {0:?}")]
pub struct InvalidSessionId(pub String);

/// Errors from configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}
