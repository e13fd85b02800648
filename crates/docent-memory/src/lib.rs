//! Document chunking and the persistent vector index behind retrieval.

pub mod document;
pub mod index;

pub use document::{Chunk, ChunkMetadata, DocumentKind, DocumentProcessor, TextSplitter};
pub use index::{IndexError, IndexStats, SearchHit, VectorIndex};
