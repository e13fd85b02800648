use std::path::Path;
use std::sync::Arc;

use docent_llm::LlmProvider;
use docent_memory::document::{ChunkStats, DocumentProcessor, TextSplitter, chunk_stats};
use docent_memory::{Chunk, VectorIndex};
use serde::Serialize;

use crate::config::Config;
use crate::error::CoreError;
use crate::query::{QueryEngine, QueryResult, QuerySettings};

/// Outcome of ingesting one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub chunks: ChunkStats,
    pub indexed: usize,
}

/// Application context built once at startup: configuration, document
/// processor and the engine that owns the index.
#[derive(Debug)]
pub struct App<P> {
    config: Config,
    processor: DocumentProcessor,
    engine: QueryEngine<P>,
}

impl<P: LlmProvider> App<P> {
    /// Open the index at `config.index.dir` and wire up the pipeline. An
    /// unreachable backend is logged and does not prevent startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the index directory cannot be created.
    pub async fn new(config: Config, provider: Arc<P>) -> Result<Self, CoreError> {
        let index = VectorIndex::open(provider, config.index.dir.clone()).await?;
        let processor = DocumentProcessor::new(
            TextSplitter::new(config.document.splitter_config()),
            config.document.max_file_size,
        );
        let engine = QueryEngine::new(index, QuerySettings::from_config(&config));
        tracing::info!(
            model = %engine.model(),
            documents = engine.index().len(),
            "docent ready"
        );
        Ok(Self {
            config,
            processor,
            engine,
        })
    }

    /// Process a file from disk and add its chunks to the index.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported or oversized files, extraction
    /// failures, or when indexing fails.
    pub async fn ingest_path(&mut self, path: &Path) -> Result<IngestReport, CoreError> {
        let chunks = self.processor.process_path(path).await?;
        let source = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        self.index_chunks(source, chunks).await
    }

    /// Process an in-memory upload and add its chunks to the index.
    ///
    /// # Errors
    ///
    /// Same as [`ingest_path`](Self::ingest_path), minus filesystem errors.
    pub async fn ingest_bytes(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<IngestReport, CoreError> {
        let chunks = self.processor.process(file_name, bytes).await?;
        self.index_chunks(file_name.to_owned(), chunks).await
    }

    async fn index_chunks(
        &mut self,
        source: String,
        chunks: Vec<Chunk>,
    ) -> Result<IngestReport, CoreError> {
        let stats = chunk_stats(&chunks);
        let indexed = self.engine.ingest(&chunks).await?;
        Ok(IngestReport {
            source,
            chunks: stats,
            indexed,
        })
    }

    pub async fn ask(&mut self, question: &str) -> QueryResult {
        self.engine.query(question).await
    }

    /// # Errors
    ///
    /// Returns an error if the persisted index cannot be removed.
    pub async fn clear(&mut self) -> Result<(), CoreError> {
        self.engine.clear_index().await
    }
}

impl<P> App<P> {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn engine(&self) -> &QueryEngine<P> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut QueryEngine<P> {
        &mut self.engine
    }

    #[must_use]
    pub fn processor(&self) -> &DocumentProcessor {
        &self.processor
    }
}

#[cfg(test)]
mod tests {
    use docent_llm::mock::MockProvider;

    use super::*;

    fn config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.index.dir = dir.join("index");
        config.document.chunk_size = 60;
        config.document.chunk_overlap = 10;
        config
    }

    #[tokio::test]
    async fn ingest_bytes_reports_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::default());
        let mut app = App::new(config(dir.path()), provider).await.unwrap();

        let text = "Paragraph one talks about rust.\n\nParagraph two talks about tokio.";
        let report = app
            .ingest_bytes("notes.txt", text.as_bytes().to_vec())
            .await
            .unwrap();
        assert_eq!(report.source, "notes.txt");
        assert_eq!(report.indexed, report.chunks.count);
        assert!(report.indexed >= 2);
        assert_eq!(report.chunks.sources, vec!["notes.txt".to_owned()]);
        assert_eq!(app.engine().index().len(), report.indexed);
    }

    #[tokio::test]
    async fn ingest_path_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("guide.txt");
        std::fs::write(&file, "A short guide.").unwrap();
        let mut app = App::new(config(dir.path()), Arc::new(MockProvider::default()))
            .await
            .unwrap();

        let report = app.ingest_path(&file).await.unwrap();
        assert_eq!(report.source, "guide.txt");
        assert_eq!(report.indexed, 1);
    }

    #[tokio::test]
    async fn unsupported_upload_is_rejected_before_indexing() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::default());
        let mut app = App::new(config(dir.path()), Arc::clone(&provider))
            .await
            .unwrap();
        let calls = provider.embed_calls();

        let err = app
            .ingest_bytes("slides.pptx", b"bytes".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Document(_)));
        assert_eq!(provider.embed_calls(), calls);
        assert!(app.engine().index().is_empty());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.document.max_file_size = 8;
        let mut app = App::new(cfg, Arc::new(MockProvider::default()))
            .await
            .unwrap();

        let err = app
            .ingest_bytes("big.txt", vec![b'a'; 64])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Document(_)));
    }

    #[tokio::test]
    async fn new_starts_when_embedder_is_down() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockProvider::default());
        provider.set_fail_embed(true);
        let mut app = App::new(config(dir.path()), provider).await.unwrap();
        assert!(app.engine().index().is_empty());
        assert_eq!(app.engine().stats().embedding_dimension, 0);
        app.clear().await.unwrap();
    }

    #[tokio::test]
    async fn new_fails_when_index_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index"), b"not a directory").unwrap();
        let err = App::new(config(dir.path()), Arc::new(MockProvider::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Index(_)));
    }

    #[tokio::test]
    async fn settings_flow_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.llm.model = "mistral:7b".into();
        cfg.query.top_k = 5;
        let app = App::new(cfg, Arc::new(MockProvider::default()))
            .await
            .unwrap();
        assert_eq!(app.engine().model(), "mistral:7b");
        assert_eq!(app.engine().top_k(), 5);
        assert_eq!(app.processor().splitter().config().chunk_size, 60);
        assert_eq!(app.config().document.chunk_overlap, 10);
    }
}
