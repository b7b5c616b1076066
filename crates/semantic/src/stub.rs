use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::{l2_normalize_in_place, prepare_text};
use crate::{Embedder, EmbeddingError, SemanticConfig};

/// Deterministic offline embedder used in `"fast"` mode.
///
/// Lower-cased alphanumeric tokens are hashed into `dimension` signed buckets
/// (the feature-hashing trick), so texts sharing vocabulary end up with a
/// positive cosine similarity. No model files or network access required.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            model_name: "hashed-bow-stub".into(),
            dimension: dimension.max(1),
            normalize: true,
        }
    }

    pub fn from_config(cfg: &SemanticConfig) -> Self {
        Self {
            model_name: cfg.model_name.clone(),
            dimension: cfg.dimension.max(1),
            normalize: cfg.normalize,
        }
    }

    fn vectorize(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = prepare_text(text)?;
        let lowered = text.to_lowercase();
        let mut v = vec![0f32; self.dimension];
        let mut tokens = 0usize;
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let h = hash64(token.as_bytes());
            let bucket = (h % self.dimension as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
            tokens += 1;
        }
        if tokens == 0 {
            return Err(EmbeddingError::EmptyInput);
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        Ok(v)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.vectorize(text)
    }
}
