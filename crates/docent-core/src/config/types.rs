use std::path::PathBuf;

use docent_llm::GenerationOptions;
use docent_memory::document::{DEFAULT_MAX_FILE_SIZE, SplitterConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}

fn default_model() -> String {
    "llama3.2:3b".into()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Generation model served by Ollama.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
        }
    }
}

/// Named chunk size / overlap pairs tuned for different kinds of material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkPreset {
    Small,
    Medium,
    Large,
    Technical,
}

impl ChunkPreset {
    /// `(chunk_size, chunk_overlap)` in characters.
    #[must_use]
    pub fn sizes(self) -> (usize, usize) {
        match self {
            Self::Small => (300, 30),
            Self::Medium => (500, 50),
            Self::Large => (800, 100),
            Self::Technical => (600, 75),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Technical => "technical",
        }
    }
}

impl std::fmt::Display for ChunkPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Upper bound on an ingested file, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// When set, replaces `chunk_size` and `chunk_overlap` at load time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<ChunkPreset>,
}

impl DocumentConfig {
    pub(crate) fn apply_preset(&mut self) {
        if let Some(preset) = self.preset {
            (self.chunk_size, self.chunk_overlap) = preset.sizes();
        }
    }

    #[must_use]
    pub fn splitter_config(&self) -> SplitterConfig {
        SplitterConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_file_size: default_max_file_size(),
            preset: None,
        }
    }
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./data/index")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Directory holding the persisted index artifacts.
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

fn default_context_budget() -> usize {
    1500
}

fn default_cache_capacity() -> usize {
    10
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_p() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    400
}

fn default_repeat_penalty() -> f32 {
    1.1
}

fn default_num_ctx() -> u64 {
    2048
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Chunks retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Character budget for the assembled context.
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f32,
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u64,
}

impl QueryConfig {
    /// Sampling options without stop sequences; the engine adds those per call.
    #[must_use]
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            repeat_penalty: self.repeat_penalty,
            num_ctx: self.num_ctx,
            stop: Vec::new(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            context_budget: default_context_budget(),
            cache_capacity: default_cache_capacity(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            repeat_penalty: default_repeat_penalty(),
            num_ctx: default_num_ctx(),
        }
    }
}
