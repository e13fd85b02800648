//! Retrieval-augmented question answering over the vector index.

pub mod answer;
pub mod cache;
pub mod context;
pub mod prompt;
pub mod sources;

use std::sync::Arc;

use docent_llm::{GenerationOptions, LlmProvider};
use docent_memory::{Chunk, IndexStats, SearchHit, VectorIndex};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::CoreError;

pub use answer::{BACKEND_UNAVAILABLE_ANSWER, NO_DOCUMENTS_ANSWER};
pub use cache::{QueryCache, fingerprint};
pub use context::{MIN_TRUNCATION, assemble_context};
pub use sources::SourceRef;

/// Everything produced for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub retrieved_chunks: Vec<SearchHit>,
    /// Generation model that produced the answer.
    pub model_id: String,
    /// Length of the assembled context in characters.
    pub context_length: usize,
}

/// Outcome of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Answered(String),
    BackendUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySettings {
    pub model: String,
    pub top_k: usize,
    pub context_budget: usize,
    pub cache_capacity: usize,
    pub options: GenerationOptions,
}

impl QuerySettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            top_k: config.query.top_k,
            context_budget: config.query.context_budget,
            cache_capacity: config.query.cache_capacity,
            options: config.query.generation_options(),
        }
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct QueryEngine<P> {
    provider: Arc<P>,
    index: VectorIndex<P>,
    model: String,
    top_k: usize,
    context_budget: usize,
    options: GenerationOptions,
    cache: QueryCache<QueryResult>,
}

impl<P> std::fmt::Debug for QueryEngine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("model", &self.model)
            .field("top_k", &self.top_k)
            .field("context_budget", &self.context_budget)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl<P: LlmProvider> QueryEngine<P> {
    #[must_use]
    pub fn new(index: VectorIndex<P>, settings: QuerySettings) -> Self {
        Self {
            provider: Arc::clone(index.provider()),
            index,
            model: settings.model,
            top_k: settings.top_k,
            context_budget: settings.context_budget,
            options: settings.options,
            cache: QueryCache::new(settings.cache_capacity),
        }
    }

    /// Answer `question` from the indexed documents.
    ///
    /// Never fails: an empty index, an unreachable backend or a failed query
    /// embedding each produce a fixed explanatory answer, none of which is cached.
    pub async fn query(&mut self, question: &str) -> QueryResult {
        let key = fingerprint(question);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("answer served from cache");
            return hit.clone();
        }

        if self.index.is_empty() {
            return self.fixed_answer(NO_DOCUMENTS_ANSWER, Vec::new(), 0);
        }

        let hits = match self.index.search(question, self.top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("retrieval failed: {e:#}");
                return self.fixed_answer(BACKEND_UNAVAILABLE_ANSWER, Vec::new(), 0);
            }
        };
        if hits.is_empty() {
            return self.fixed_answer(NO_DOCUMENTS_ANSWER, Vec::new(), 0);
        }
        tracing::debug!(retrieved = hits.len(), "retrieved chunks");

        let context = assemble_context(
            hits.iter().map(|h| h.content.as_str()),
            self.context_budget,
        );
        let context_length = context.chars().count();

        match self.answer(question, &context).await {
            Generation::Answered(answer) => {
                let result = QueryResult {
                    answer,
                    sources: sources::format_sources(&hits),
                    retrieved_chunks: hits,
                    model_id: self.model.clone(),
                    context_length,
                };
                self.cache.insert(key, result.clone());
                result
            }
            Generation::BackendUnavailable => {
                self.fixed_answer(BACKEND_UNAVAILABLE_ANSWER, hits, context_length)
            }
        }
    }

    async fn answer(&self, question: &str, context: &str) -> Generation {
        let options = self.options.clone().with_stop(prompt::STOP_SEQUENCES);
        let first = match self
            .generate(&prompt::answer_prompt(question, context), &options)
            .await
        {
            Generation::Answered(raw) => answer::strip_role_prefixes(&raw),
            Generation::BackendUnavailable => return Generation::BackendUnavailable,
        };

        if !answer::needs_repair(&first) {
            return Generation::Answered(first);
        }

        tracing::debug!(
            chars = first.chars().count(),
            "answer looks incomplete, retrying once"
        );
        let retry_options = self.options.clone().with_stop(prompt::RETRY_STOP_SEQUENCES);
        match self
            .generate(&prompt::retry_prompt(question, context), &retry_options)
            .await
        {
            Generation::Answered(raw) => {
                let retry = answer::strip_role_prefixes(&raw);
                if retry.chars().count() > first.chars().count() {
                    Generation::Answered(retry)
                } else {
                    Generation::Answered(first)
                }
            }
            Generation::BackendUnavailable => Generation::Answered(first),
        }
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Generation {
        match self.provider.generate(&self.model, prompt, options).await {
            Ok(text) => Generation::Answered(text),
            Err(e) => {
                tracing::warn!(model = %self.model, "generation backend unavailable: {e:#}");
                Generation::BackendUnavailable
            }
        }
    }

    fn fixed_answer(
        &self,
        answer: &str,
        hits: Vec<SearchHit>,
        context_length: usize,
    ) -> QueryResult {
        QueryResult {
            answer: answer.to_owned(),
            sources: sources::format_sources(&hits),
            retrieved_chunks: hits,
            model_id: self.model.clone(),
            context_length,
        }
    }

    /// Index `chunks`. Cached answers are dropped once new content lands.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or persistence fails; the index is left unchanged.
    pub async fn ingest(&mut self, chunks: &[Chunk]) -> Result<usize, CoreError> {
        let added = self.index.add(chunks).await?;
        if added > 0 {
            self.cache.clear();
        }
        Ok(added)
    }

    /// Clear the index and every cached answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted artifacts cannot be removed.
    pub async fn clear_index(&mut self) -> Result<(), CoreError> {
        self.cache.clear();
        self.index.clear().await?;
        Ok(())
    }

    /// Models the backend currently serves. Empty when it cannot be reached.
    pub async fn available_models(&self) -> Vec<String> {
        match self.provider.list_models().await {
            Ok(models) => models,
            Err(e) => {
                tracing::debug!("listing models failed: {e:#}");
                Vec::new()
            }
        }
    }

    /// Switch the generation model if the backend serves `name`.
    pub async fn change_model(&mut self, name: &str) -> bool {
        let available = self.available_models().await;
        if available.iter().any(|m| m == name) {
            tracing::info!(from = %self.model, to = name, "generation model changed");
            self.model = name.to_owned();
            true
        } else {
            tracing::warn!(
                "model '{name}' not available, available models: {}",
                available.join(", ")
            );
            false
        }
    }

    /// Warn when the configured model is missing. Returns whether it is served.
    pub async fn check_backend(&self) -> bool {
        let available = self.available_models().await;
        let found = available.iter().any(|m| m == &self.model);
        if !found {
            if available.is_empty() {
                tracing::warn!("no models reported by the backend, is Ollama running?");
            } else {
                tracing::warn!(
                    "model '{}' not found, available models: {}. Run: ollama pull {}",
                    self.model,
                    available.join(", "),
                    self.model
                );
            }
        }
        found
    }

    #[must_use]
    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }
}

impl<P> QueryEngine<P> {
    #[must_use]
    pub fn index(&self) -> &VectorIndex<P> {
        &self.index
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    #[must_use]
    pub fn cached_answers(&self) -> usize {
        self.cache.len()
    }
}
