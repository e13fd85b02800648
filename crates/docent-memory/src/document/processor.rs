use std::path::Path;

use super::loader::loader_for;
use super::{
    Chunk, ChunkStats, DEFAULT_MAX_FILE_SIZE, DocumentError, DocumentKind, SplitterConfig,
    TextSplitter, chunk_stats,
};

/// Turns an uploaded file into ordered, tagged chunks.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    splitter: TextSplitter,
    max_file_size: u64,
}

impl DocumentProcessor {
    #[must_use]
    pub fn new(splitter: TextSplitter, max_file_size: u64) -> Self {
        Self {
            splitter,
            max_file_size,
        }
    }

    #[must_use]
    pub fn splitter(&self) -> &TextSplitter {
        &self.splitter
    }

    /// Extract text from `bytes` according to the extension of `file_name` and split it.
    ///
    /// A document that yields no text produces an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedFormat`] for anything that is not `.pdf` or `.txt`,
    /// [`DocumentError::FileTooLarge`] above the configured limit, or a loader error.
    pub async fn process(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<Chunk>, DocumentError> {
        let kind = DocumentKind::from_file_name(file_name)?;
        let byte_size = bytes.len() as u64;
        if byte_size > self.max_file_size {
            return Err(DocumentError::FileTooLarge(byte_size));
        }

        let text = loader_for(kind)?.load(bytes).await?;
        let chunks = self.splitter.split(&text, file_name, kind, byte_size);

        if chunks.is_empty() {
            tracing::warn!(source = file_name, "document produced no text");
        } else {
            tracing::info!(
                source = file_name,
                kind = %kind,
                chunks = chunks.len(),
                "document processed"
            );
        }
        Ok(chunks)
    }

    /// Read a file from disk and [`process`](Self::process) it under its file name.
    ///
    /// # Errors
    ///
    /// Same as [`process`](Self::process), plus IO errors while reading.
    pub async fn process_path(&self, path: &Path) -> Result<Vec<Chunk>, DocumentError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DocumentError::UnsupportedFormat(path.display().to_string()))?;
        DocumentKind::from_file_name(name)?;

        let size = tokio::fs::metadata(path).await?.len();
        if size > self.max_file_size {
            return Err(DocumentError::FileTooLarge(size));
        }

        let bytes = tokio::fs::read(path).await?;
        self.process(name, bytes).await
    }

    #[must_use]
    pub fn stats(&self, chunks: &[Chunk]) -> ChunkStats {
        chunk_stats(chunks)
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(
            TextSplitter::new(SplitterConfig::default()),
            DEFAULT_MAX_FILE_SIZE,
        )
    }
}
