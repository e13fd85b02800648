#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Ollama request failed: {0}")]
    Ollama(String),

    #[error("provider unavailable")]
    Unavailable,

    #[error("empty response from {provider}")]
    EmptyResponse { provider: String },

    #[error("embedding batch size mismatch: sent {sent}, received {received}")]
    EmbedBatchMismatch { sent: usize, received: usize },

    #[error("{0}")]
    Other(String),
}
