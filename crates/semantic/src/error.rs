use thiserror::Error;

/// Errors surfaced while turning text into an embedding vector.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EmbeddingError {
    /// Nothing left to embed after whitespace normalization.
    #[error("cannot embed empty text")]
    EmptyInput,
    /// Configuration is inconsistent (e.g., api mode without an endpoint).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// Transport or HTTP-level failure talking to the remote provider.
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The provider answered, but not with something we can read as vectors.
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
