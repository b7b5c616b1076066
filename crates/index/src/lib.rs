//! # Medchat Index
//!
//! Storage and nearest-neighbour search for the reference documents that back
//! the retrieval pipeline.
//!
//! ## Core Features
//!
//! - **[`VectorIndex`] trait**: the narrow seam the retriever depends on. Tests can
//!   substitute their own implementation.
//! - **[`FlatIndex`]**: exact cosine search over `f32` vectors. Results are ordered by
//!   score, ties broken by insertion order, so the same query always returns the same
//!   documents in the same order.
//! - **Artifacts**: an index is built offline, written once with [`FlatIndex::save`]
//!   (bincode, optionally Zstd-compressed, behind a magic header and schema version)
//!   and loaded read-only at startup with [`FlatIndex::load`].
//! - **Corpus preparation**: [`load_corpus`] reads `.txt` / `.md` reference files and
//!   [`TextSplitter`] cuts them into overlapping chunks before embedding.
//!
//! ## Example Usage
//!
//! ```
//! use index::{Document, FlatIndex, VectorIndex};
//!
//! let mut index = FlatIndex::new("demo-model", 3);
//! index
//!     .insert(Document::new("doc-1", "Cholera spreads through contaminated water.", "cholera.txt"), vec![1.0, 0.0, 0.0])
//!     .unwrap();
//! index
//!     .insert(Document::new("doc-2", "Insulin regulates blood sugar.", "diabetes.txt"), vec![0.0, 1.0, 0.0])
//!     .unwrap();
//!
//! let hits = index.search(&[0.9, 0.1, 0.0], 3).unwrap();
//! assert_eq!(hits[0].document.id, "doc-1");
//! ```

mod corpus;
mod flat;
mod splitter;
mod store;

pub use corpus::{chunk_sources, load_corpus, SourceText};
pub use flat::{cosine_similarity, FlatIndex};
pub use splitter::TextSplitter;
pub use store::{CompressionCodec, CompressionConfig, INDEX_MAGIC};

use bincode::error::{DecodeError, EncodeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bump this value whenever the on-disk snapshot layout changes.
pub const INDEX_SCHEMA_VERSION: u16 = 1;

/// A reference passage stored in the index. Immutable once inserted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Document {
    /// Stable identifier, unique within one index.
    pub id: String,
    pub text: String,
    /// Provenance of the passage, typically the corpus file it was cut from.
    pub source: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: source.into(),
        }
    }
}

/// One search hit.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

/// Read-only nearest-neighbour lookup over document vectors.
pub trait VectorIndex: Send + Sync {
    /// Dimension every stored and query vector must have.
    fn dimension(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns at most `k` documents ordered by descending similarity.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredDocument>, IndexError>;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// The index artifact is missing, corrupt, or was written by an incompatible version.
    #[error("index unavailable: {0}")]
    Unavailable(String),
    #[error("vector dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("duplicate document id: {0}")]
    DuplicateId(String),
    #[error("invalid index config: {0}")]
    InvalidConfig(String),
    #[error("serialization encode error: {0}")]
    Encode(String),
    #[error("serialization decode error: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<EncodeError> for IndexError {
    fn from(e: EncodeError) -> Self {
        IndexError::Encode(e.to_string())
    }
}

impl From<DecodeError> for IndexError {
    fn from(e: DecodeError) -> Self {
        IndexError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        IndexError::Io(e.to_string())
    }
}

impl IndexError {
    pub fn unavailable<E: std::fmt::Display>(err: E) -> Self {
        Self::Unavailable(err.to_string())
    }
}
