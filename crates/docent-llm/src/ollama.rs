use ollama_rs::Ollama;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use ollama_rs::models::ModelOptions;

use crate::error::LlmError;
use crate::provider::{GenerationOptions, LlmProvider};

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Ollama,
    embedding_model: String,
}

impl OllamaProvider {
    #[must_use]
    pub fn new(base_url: &str, embedding_model: String) -> Self {
        let (host, port) = parse_host_port(base_url);
        Self {
            client: Ollama::new(host, port),
            embedding_model,
        }
    }
}

impl LlmProvider for OllamaProvider {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        tracing::debug!(model, prompt_chars = prompt.len(), "ollama generate");
        let request = GenerationRequest::new(model.to_owned(), prompt.to_owned())
            .options(to_model_options(options));

        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| LlmError::Ollama(format!("generation request failed: {e}")))?;

        Ok(response.response)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(model = %self.embedding_model, count = texts.len(), "ollama embed batch");
        let request = GenerateEmbeddingsRequest::new(
            self.embedding_model.clone(),
            EmbeddingsInput::Multiple(texts.to_vec()),
        );

        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| LlmError::Ollama(format!("embedding request failed: {e}")))?;

        if response.embeddings.len() != texts.len() {
            return Err(LlmError::EmbedBatchMismatch {
                sent: texts.len(),
                received: response.embeddings.len(),
            });
        }
        Ok(response.embeddings)
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| LlmError::Ollama(format!("failed to list models: {e}")))?;
        Ok(models.into_iter().map(|m| m.name).collect())
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ollama"
    }
}

fn to_model_options(options: &GenerationOptions) -> ModelOptions {
    ModelOptions::default()
        .temperature(options.temperature)
        .top_p(options.top_p)
        .num_predict(i32::try_from(options.max_tokens).unwrap_or(i32::MAX))
        .repeat_penalty(options.repeat_penalty)
        .num_ctx(options.num_ctx)
        .stop(options.stop.clone())
}

fn parse_host_port(url: &str) -> (String, u16) {
    let url = url.trim_end_matches('/');
    if let Some(colon_pos) = url.rfind(':') {
        let port_str = &url[colon_pos + 1..];
        if let Ok(port) = port_str.parse::<u16>() {
            let host = url[..colon_pos].to_string();
            return (host, port);
        }
    }
    (url.to_string(), 11434)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_host_port_with_port() {
        let (host, port) = parse_host_port("http://localhost:11434");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn parse_host_port_without_port() {
        let (host, port) = parse_host_port("http://localhost");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn parse_host_port_trailing_slash() {
        let (host, port) = parse_host_port("http://127.0.0.1:8080/");
        assert_eq!(host, "http://127.0.0.1");
        assert_eq!(port, 8080);
    }

    #[test]
    fn parse_host_port_invalid_port_falls_back() {
        let (host, port) = parse_host_port("http://localhost:notaport");
        assert_eq!(host, "http://localhost:notaport");
        assert_eq!(port, 11434);
    }

    #[test]
    fn embedding_model_is_reported() {
        let provider = OllamaProvider::new("http://localhost:11434", "nomic-embed-text".into());
        assert_eq!(provider.embedding_model(), "nomic-embed-text");
        assert_eq!(provider.name(), "ollama");
    }

    #[tokio::test]
    async fn empty_batch_skips_request() {
        // Port 1 is never listening; an actual request would fail.
        let provider = OllamaProvider::new("http://127.0.0.1:1", "embed".into());
        let vectors = provider.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        let provider = OllamaProvider::new("http://127.0.0.1:1", "embed".into());
        let result = provider
            .generate("llama3.2:3b", "hi", &GenerationOptions::default())
            .await;
        assert!(matches!(result, Err(LlmError::Ollama(_))));
    }
}
