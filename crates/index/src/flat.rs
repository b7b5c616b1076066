use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Document, IndexError, ScoredDocument, VectorIndex};

const SIMD_CHUNK_SIZE: usize = 8;

/// A document together with its embedding.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct IndexEntry {
    pub(crate) document: Document,
    pub(crate) vector: Vec<f32>,
}

/// Exact (brute-force) cosine index.
///
/// Corpora for this service are a few thousand chunks at most, so a linear
/// scan stays well under a millisecond and keeps ranking fully deterministic.
#[derive(Clone, Debug)]
pub struct FlatIndex {
    pub(crate) model_name: String,
    pub(crate) dimension: usize,
    pub(crate) entries: Vec<IndexEntry>,
    ids: HashSet<String>,
}

impl FlatIndex {
    pub fn new(model_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            model_name: model_name.into(),
            dimension,
            entries: Vec::new(),
            ids: HashSet::new(),
        }
    }

    pub(crate) fn from_entries(
        model_name: String,
        dimension: usize,
        entries: Vec<IndexEntry>,
    ) -> Result<Self, IndexError> {
        let mut index = Self::new(model_name, dimension);
        for entry in entries {
            index.insert(entry.document, entry.vector)?;
        }
        Ok(index)
    }

    /// Name of the embedding model the vectors were produced with.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.entries.iter().map(|e| &e.document)
    }

    /// Appends a document. Insertion order is the tie-breaker for equal scores.
    pub fn insert(&mut self, document: Document, vector: Vec<f32>) -> Result<(), IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if !self.ids.insert(document.id.clone()) {
            return Err(IndexError::DuplicateId(document.id));
        }
        self.entries.push(IndexEntry { document, vector });
        Ok(())
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredDocument>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (pos, cosine_similarity(query, &entry.vector)))
            .collect();

        // Stable: equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        log::debug!(
            "flat search over {} entries returned {} hits",
            self.entries.len(),
            scored.len()
        );

        Ok(scored
            .into_iter()
            .map(|(pos, score)| ScoredDocument {
                document: self.entries[pos].document.clone(),
                score,
            })
            .collect())
    }
}

/// Cosine similarity of two equal-length vectors; `0.0` when either is zero or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0f32;
    let mut norm_a = 0f32;
    let mut norm_b = 0f32;

    // Fixed-width chunks so the compiler can vectorize the inner loop.
    let mut a_chunks = a.chunks_exact(SIMD_CHUNK_SIZE);
    let mut b_chunks = b.chunks_exact(SIMD_CHUNK_SIZE);
    for (ca, cb) in a_chunks.by_ref().zip(b_chunks.by_ref()) {
        for i in 0..SIMD_CHUNK_SIZE {
            dot += ca[i] * cb[i];
            norm_a += ca[i] * ca[i];
            norm_b += cb[i] * cb[i];
        }
    }
    for (x, y) in a_chunks.remainder().iter().zip(b_chunks.remainder()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
