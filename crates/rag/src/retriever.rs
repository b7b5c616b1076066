use std::sync::Arc;

use index::{ScoredDocument, VectorIndex};
use semantic::Embedder;

use crate::RagError;

/// Number of passages retrieved per question.
pub const TOP_K: usize = 3;

/// Ordered hits, best first, at most [`TOP_K`] long.
pub type RetrievalResult = Vec<ScoredDocument>;

/// Embeds a question and looks up its nearest passages.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    min_score: f32,
}

impl Retriever {
    /// Fails with [`RagError::IndexUnavailable`] when the index was built for a
    /// different vector dimension than the embedder produces.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Result<Self, RagError> {
        if embedder.dimension() != index.dimension() {
            return Err(RagError::IndexUnavailable(format!(
                "index dimension {} does not match embedder {} ({})",
                index.dimension(),
                embedder.name(),
                embedder.dimension()
            )));
        }
        Ok(Self {
            embedder,
            index,
            min_score: 0.0,
        })
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Read-only; the same question against the same index always yields the same hits.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult, RagError> {
        let vector = self.embedder.embed(query).await?;
        let mut hits = self.index.search(&vector, TOP_K)?;
        hits.retain(|hit| hit.score > self.min_score);
        tracing::debug!(hits = hits.len(), "retrieved passages");
        Ok(hits)
    }
}
