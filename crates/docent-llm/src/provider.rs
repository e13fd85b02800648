use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Sampling parameters passed to a single generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    /// Nucleus-sampling cutoff.
    pub top_p: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    pub repeat_penalty: f32,
    /// Context window requested from the backend, in tokens.
    pub num_ctx: u64,
    /// Sequences that terminate generation when produced.
    pub stop: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.7,
            max_tokens: 400,
            repeat_penalty: 1.1,
            num_ctx: 2048,
            stop: Vec::new(),
        }
    }
}

impl GenerationOptions {
    #[must_use]
    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = stop.into_iter().map(Into::into).collect();
        self
    }
}

pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `prompt` with the given model.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the request.
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Embed a batch of texts in one call. The output preserves input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding model fails or returns a short batch.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send;

    /// List model names the backend can serve.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn list_models(&self) -> impl Future<Output = Result<Vec<String>, LlmError>> + Send;

    /// Name of the model used by [`Self::embed_batch`].
    fn embedding_model(&self) -> &str;

    fn name(&self) -> &str;
}

/// Embed a single text through [`LlmProvider::embed_batch`].
///
/// # Errors
///
/// Returns an error if embedding fails or the provider returns no vector.
pub async fn embed_one<P: LlmProvider>(provider: &P, text: &str) -> Result<Vec<f32>, LlmError> {
    provider
        .embed_batch(&[text.to_owned()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::EmptyResponse {
            provider: provider.name().to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_bounded() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.1).abs() < f32::EPSILON);
        assert!((opts.top_p - 0.7).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 400);
        assert_eq!(opts.num_ctx, 2048);
        assert!(opts.stop.is_empty());
    }

    #[test]
    fn with_stop_replaces_list() {
        let opts = GenerationOptions::default()
            .with_stop(["a"])
            .with_stop(["\n\n", "Question:"]);
        assert_eq!(opts.stop, vec!["\n\n".to_owned(), "Question:".to_owned()]);
    }
}
