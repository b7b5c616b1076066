use async_trait::async_trait;

use crate::EmbeddingError;

/// Turns text into a fixed-dimension vector.
///
/// Implementations must be deterministic for a given text so that an index
/// built offline stays comparable with query vectors produced at runtime.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model label recorded alongside persisted vectors.
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds several texts, preserving input order. The default runs
    /// [`embed`](Self::embed) sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
