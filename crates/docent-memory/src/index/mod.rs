//! Persistent flat vector index over document chunks.

mod error;
pub mod flat;
pub mod persist;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docent_llm::LlmError;
use docent_llm::provider::{LlmProvider, embed_one};
use serde::Serialize;

use crate::document::{Chunk, ChunkMetadata};

pub use error::IndexError;
pub use flat::FlatIndex;

const DIMENSION_SAMPLE: &str = "dimension check";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Raw inner product between the query and chunk embeddings.
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub embedding_dimension: usize,
    pub model_name: String,
}

/// Embeddings, chunk contents and chunk metadata kept as parallel rows,
/// mirrored to three artifacts in one directory.
pub struct VectorIndex<P> {
    provider: Arc<P>,
    dir: PathBuf,
    dimension: Option<usize>,
    flat: Option<FlatIndex>,
    contents: Vec<String>,
    metadata: Vec<ChunkMetadata>,
}

impl<P> std::fmt::Debug for VectorIndex<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("dir", &self.dir)
            .field("dimension", &self.dimension)
            .field("rows", &self.contents.len())
            .finish_non_exhaustive()
    }
}

impl<P: LlmProvider> VectorIndex<P> {
    /// Create `dir` if needed, detect the embedding dimension and load any
    /// persisted state. Unreadable or inconsistent state is discarded.
    ///
    /// An unreachable embedder is not fatal: the dimension is then taken from
    /// persisted state, or from the first batch passed to [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(provider: Arc<P>, dir: impl Into<PathBuf>) -> Result<Self, IndexError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let detected = match embed_one(provider.as_ref(), DIMENSION_SAMPLE).await {
            Ok(vector) if !vector.is_empty() => Some(vector.len()),
            Ok(_) => {
                tracing::warn!("embedder returned an empty vector, dimension unknown");
                None
            }
            Err(e) => {
                tracing::warn!("embedder unavailable, dimension unknown: {e:#}");
                None
            }
        };

        let mut index = Self {
            provider,
            dir,
            dimension: detected,
            flat: None,
            contents: Vec::new(),
            metadata: Vec::new(),
        };

        match persist::load(&index.dir).await {
            Ok(Some(snap)) if detected.is_none_or(|d| d == snap.flat.dimension()) => {
                tracing::info!(
                    rows = snap.contents.len(),
                    dir = %index.dir.display(),
                    "loaded vector index"
                );
                index.dimension = Some(snap.flat.dimension());
                index.flat = Some(snap.flat);
                index.contents = snap.contents;
                index.metadata = snap.metadata;
            }
            Ok(Some(snap)) => {
                tracing::warn!(
                    stored = snap.flat.dimension(),
                    detected = detected.unwrap_or_default(),
                    "stored index has a different embedding dimension, starting empty"
                );
            }
            Ok(None) => {
                tracing::info!(dir = %index.dir.display(), "no persisted index, starting empty");
            }
            Err(e) => {
                tracing::warn!("failed to load persisted index, starting empty: {e:#}");
            }
        }

        Ok(index)
    }

    /// Embed and append `chunks`, then persist. Returns the number of chunks added.
    ///
    /// On any error the in-memory state is left as it was before the call.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails, the embedder returns a malformed
    /// batch, or the artifacts cannot be written.
    pub async fn add(&mut self, chunks: &[Chunk]) -> Result<usize, IndexError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.provider.embed_batch(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(IndexError::BatchSize {
                sent: texts.len(),
                received: vectors.len(),
            });
        }

        let Some(dimension) = self
            .dimension
            .or_else(|| vectors.first().map(Vec::len))
            .filter(|&d| d > 0)
        else {
            return Err(IndexError::Embedding(LlmError::EmptyResponse {
                provider: self.provider.name().to_owned(),
            }));
        };
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        let prior_dimension = self.dimension;
        let fresh = self.flat.is_none();
        let flat = self.flat.get_or_insert_with(|| FlatIndex::new(dimension));
        let before = flat.len();
        flat.add(&vectors)?;
        self.dimension = Some(dimension);
        self.contents.extend(texts);
        let metadata = chunks.iter().map(|c| c.metadata.clone());
        self.metadata.extend(metadata);

        if let Err(e) = self.persist().await {
            let rows = chunks.len();
            tracing::warn!("persisting index failed, rolling back {rows} rows: {e:#}");
            if fresh {
                self.flat = None;
            } else if let Some(flat) = self.flat.as_mut() {
                flat.truncate(before);
            }
            self.dimension = prior_dimension;
            self.contents.truncate(before);
            self.metadata.truncate(before);
            return Err(e);
        }

        tracing::info!(added = chunks.len(), total = self.len(), "indexed chunks");
        Ok(chunks.len())
    }

    /// Top `k` chunks for `query`, best first. An empty index yields no hits.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be embedded.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, IndexError> {
        let Some(flat) = self.flat.as_ref().filter(|f| !f.is_empty()) else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let embedding = embed_one(self.provider.as_ref(), query).await?;
        let hits: Vec<SearchHit> = flat
            .search(&embedding, k)?
            .into_iter()
            .map(|(row, score)| SearchHit {
                content: self.contents[row].clone(),
                metadata: self.metadata[row].clone(),
                score,
            })
            .collect();

        tracing::debug!(k, hits = hits.len(), "vector search");
        Ok(hits)
    }

    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_documents: self.len(),
            embedding_dimension: self.dimension.unwrap_or_default(),
            model_name: self.provider.embedding_model().to_owned(),
        }
    }

    /// Delete the persisted artifacts, then drop every row. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing artifact cannot be removed, in which
    /// case the in-memory rows are kept.
    pub async fn clear(&mut self) -> Result<(), IndexError> {
        persist::remove_all(&self.dir).await?;
        self.flat = None;
        self.contents.clear();
        self.metadata.clear();
        tracing::info!(dir = %self.dir.display(), "vector index cleared");
        Ok(())
    }

    async fn persist(&self) -> Result<(), IndexError> {
        match &self.flat {
            Some(flat) => persist::save(&self.dir, flat, &self.contents, &self.metadata).await,
            None => Ok(()),
        }
    }
}

impl<P> VectorIndex<P> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.flat.as_ref().map_or(0, FlatIndex::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension, if known from the backend, persisted state or a
    /// previous `add`.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Distinct sources of the indexed chunks, sorted.
    #[must_use]
    pub fn sources(&self) -> Vec<String> {
        self.metadata
            .iter()
            .map(|m| m.source.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }
}
