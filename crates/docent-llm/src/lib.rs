//! Generation and embedding backends behind a single provider trait.

pub mod any;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod provider;

pub use any::AnyProvider;
pub use error::LlmError;
pub use provider::{GenerationOptions, LlmProvider};
