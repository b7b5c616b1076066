//! Medchat embedding providers
//!
//! This crate turns text into dense vectors for the retrieval pipeline. Every
//! provider sits behind the [`Embedder`] trait so the index builder, the
//! retriever, and tests can swap implementations freely.
//!
//! Two modes are available:
//!
//! - **fast** - [`StubEmbedder`], a deterministic feature-hashing embedder. No
//!   model files, no network. Texts that share words get similar vectors, which
//!   is enough to run the whole pipeline offline.
//! - **api** - [`ApiEmbedder`], which calls a Hugging Face feature-extraction
//!   endpoint, an OpenAI-compatible `/embeddings` endpoint, or a custom JSON API.
//!   Transient failures are retried with exponential backoff.
//!
//! The same text always yields the same vector for a given configuration, so an
//! index built offline stays comparable with query vectors at runtime.
//!
//! ## Quick example
//!
//! ```
//! use semantic::{build_embedder, Embedder, SemanticConfig};
//!
//! # async fn run() -> Result<(), semantic::EmbeddingError> {
//! let embedder = build_embedder(&SemanticConfig::default())?;
//! let vector = embedder.embed("What causes a fever?").await?;
//! assert_eq!(vector.len(), embedder.dimension());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod retry;
mod serde_millis;

mod embedder;
mod normalize;
mod stub;

use std::sync::Arc;

pub use crate::api::{ApiEmbedder, ApiProviderKind};
pub use crate::config::SemanticConfig;
pub use crate::embedder::Embedder;
pub use crate::error::EmbeddingError;
pub use crate::normalize::{l2_normalize_in_place, prepare_text};
pub use crate::retry::RetryConfig;
pub use crate::stub::StubEmbedder;

/// Builds the embedder selected by `cfg.mode`.
pub fn build_embedder(cfg: &SemanticConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    cfg.validate().map_err(EmbeddingError::InvalidConfig)?;
    match cfg.mode.as_str() {
        "api" => Ok(Arc::new(ApiEmbedder::from_config(cfg)?)),
        _ => Ok(Arc::new(StubEmbedder::from_config(cfg))),
    }
}
