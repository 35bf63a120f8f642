//! Flat in-memory vector index with exact L2 search.
//!
//! The index only ever grows: [`VectorIndex::merge_from`] appends and there is
//! no removal. Vectors are computed once when chunks enter an index, so
//! searching only embeds the query.

use crate::traits::EmbeddingService;
use crate::{IndexError, TextChunk};
use tracing::debug;

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: TextChunk,
    vector: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    /// Euclidean distance to the query; lower is closer.
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimensions: usize,
    entries: Vec<IndexedChunk>,
}

impl VectorIndex {
    /// Embeds every chunk and builds a fresh index.
    pub async fn from_chunks<E>(embedder: &E, chunks: Vec<TextChunk>) -> Result<Self, IndexError>
    where
        E: EmbeddingService + ?Sized,
    {
        if chunks.is_empty() {
            return Err(IndexError::Empty);
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = embedder.embed_documents(&texts).await?;
        debug!(provider = embedder.provider(), chunk_count = chunks.len(), "embedded chunks");

        Self::from_embedded(chunks, vectors)
    }

    pub fn from_embedded(
        chunks: Vec<TextChunk>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, IndexError> {
        if chunks.len() != vectors.len() {
            return Err(IndexError::CountMismatch {
                chunks: chunks.len(),
                embeddings: vectors.len(),
            });
        }

        let dimensions = vectors.first().map(Vec::len).ok_or(IndexError::Empty)?;
        if let Some(bad) = vectors.iter().find(|vector| vector.len() != dimensions) {
            return Err(IndexError::DimensionMismatch {
                expected: dimensions,
                found: bad.len(),
            });
        }

        Ok(Self {
            dimensions,
            entries: chunks
                .into_iter()
                .zip(vectors)
                .map(|(chunk, vector)| IndexedChunk { chunk, vector })
                .collect(),
        })
    }

    /// Appends every entry of `other`. On a dimension mismatch nothing is
    /// appended and `self` is unchanged.
    pub fn merge_from(&mut self, other: VectorIndex) -> Result<(), IndexError> {
        if other.dimensions != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                found: other.dimensions,
            });
        }
        self.entries.extend(other.entries);
        Ok(())
    }

    pub async fn similarity_search<E>(
        &self,
        embedder: &E,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, IndexError>
    where
        E: EmbeddingService + ?Sized,
    {
        let query_vector = embedder.embed_query(query).await?;
        self.search_vector(&query_vector, k)
    }

    pub fn search_vector(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                found: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, l2_distance(query, &entry.vector)))
            .collect();
        scored.sort_by(|left, right| left.1.total_cmp(&right.1));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(position, distance)| ScoredChunk {
                chunk: self.entries[position].chunk.clone(),
                distance,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn chunks(&self) -> impl Iterator<Item = &TextChunk> {
        self.entries.iter().map(|entry| &entry.chunk)
    }
}

fn l2_distance(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt()
}
