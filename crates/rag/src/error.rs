use index::IndexError;
use semantic::EmbeddingError;
use thiserror::Error;

/// Failures of the text-generation step.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("invalid generator config: {0}")]
    InvalidConfig(String),
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),
    /// The model answered with nothing but whitespace.
    #[error("generator returned empty output")]
    EmptyOutput,
    #[error("generation timed out after {0}s")]
    Timeout(u64),
}

/// Errors surfaced by the retrieval pipeline.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RagError {
    /// The index is missing, corrupt, or incompatible with the embedder.
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<IndexError> for RagError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::Unavailable(msg) => RagError::IndexUnavailable(msg),
            other => RagError::IndexUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_errors_map_to_unavailable() {
        let err: RagError = IndexError::DimensionMismatch {
            expected: 384,
            actual: 64,
        }
        .into();
        assert!(matches!(err, RagError::IndexUnavailable(ref m) if m.contains("384")));
    }

    #[test]
    fn display_is_transparent_for_wrapped_errors() {
        let err = RagError::from(GenerationError::Timeout(60));
        assert_eq!(err.to_string(), "generation timed out after 60s");
        let err = RagError::from(EmbeddingError::EmptyInput);
        assert_eq!(err.to_string(), "cannot embed empty text");
    }
}
