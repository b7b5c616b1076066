//! Building the index artifact offline and wiring the retrieval pipeline at startup.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use index::{FlatIndex, IndexError, VectorIndex, chunk_sources, load_corpus};
use rag::{RagError, RagOrchestrator, Retriever, build_generator};
use semantic::{Embedder, EmbeddingError, build_embedder};
use thiserror::Error;

use crate::config::{ConfigLoadError, IndexYamlConfig, MedchatConfig};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
    #[error("corpus {0} contains no usable text")]
    EmptyCorpus(String),
}

/// Reads, chunks and embeds every document under `corpus_dir`.
pub async fn build_index(
    corpus_dir: &Path,
    cfg: &IndexYamlConfig,
    embedder: &dyn Embedder,
) -> Result<FlatIndex, BuildError> {
    let start = Instant::now();
    let sources = load_corpus(corpus_dir)?;
    let splitter = cfg.splitter()?;
    let documents = chunk_sources(&sources, &splitter);
    if documents.is_empty() {
        return Err(BuildError::EmptyCorpus(corpus_dir.display().to_string()));
    }

    let mut index = FlatIndex::new(embedder.name(), embedder.dimension());
    for batch in documents.chunks(cfg.batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        for (doc, vector) in batch.iter().cloned().zip(vectors) {
            index.insert(doc, vector)?;
        }
        tracing::debug!(embedded = index.len(), total = documents.len(), "embedding chunks");
    }

    tracing::info!(
        files = sources.len(),
        chunks = index.len(),
        model = embedder.name(),
        duration_ms = start.elapsed().as_millis() as u64,
        "index built"
    );
    Ok(index)
}

/// Builds the index described by `cfg` and writes it to `cfg.index.path` (or `output`).
pub async fn build_and_save(
    corpus_dir: &Path,
    output: Option<&Path>,
    cfg: &MedchatConfig,
) -> Result<FlatIndex, BuildError> {
    let embedder = build_embedder(&cfg.semantic)?;
    let index = build_index(corpus_dir, &cfg.index, embedder.as_ref()).await?;
    let path = output.unwrap_or(cfg.index.path.as_path());
    index.save(path, &cfg.index.compression_config()?)?;
    Ok(index)
}

/// Loads the index artifact and assembles the orchestrator.
///
/// Any failure here means the retrieval pipeline cannot serve requests; the
/// caller decides whether that is fatal.
pub fn load_orchestrator(cfg: &MedchatConfig) -> Result<RagOrchestrator, RagError> {
    let embedder = build_embedder(&cfg.semantic)?;
    let index = FlatIndex::load(&cfg.index.path)?;
    if index.model_name() != embedder.name() {
        tracing::warn!(
            index_model = index.model_name(),
            embedder = embedder.name(),
            "index was built with a different embedding model"
        );
    }
    let retriever = Retriever::new(embedder, Arc::new(index))?;
    let generator = build_generator(&cfg.rag.generator)?;
    Ok(RagOrchestrator::new(retriever, generator, &cfg.rag))
}
