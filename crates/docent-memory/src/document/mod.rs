pub mod error;
pub mod loader;
pub mod processor;
pub mod splitter;
pub mod types;

pub use error::DocumentError;
pub use loader::TextLoader;
pub use processor::DocumentProcessor;
pub use splitter::{SplitterConfig, TextSplitter, chunk_stats};
pub use types::{Chunk, ChunkMetadata, ChunkStats, DocumentKind};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Decodes raw file bytes of one [`DocumentKind`] into text.
pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        bytes: Vec<u8>,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, DocumentError>> + Send + '_>,
    >;
}
