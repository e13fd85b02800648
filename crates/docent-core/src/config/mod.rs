mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

use crate::query::MIN_TRUNCATION;

impl Config {
    /// Load configuration from a TOML file, resolve the chunk preset, apply
    /// env var overrides and validate the result.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting configuration is invalid.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.document.apply_preset();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        let doc = &self.document;
        if doc.chunk_size == 0 {
            bail!("document.chunk_size must be greater than zero");
        }
        if doc.chunk_overlap >= doc.chunk_size {
            bail!(
                "document.chunk_overlap ({}) must be smaller than document.chunk_size ({})",
                doc.chunk_overlap,
                doc.chunk_size
            );
        }
        if self.query.top_k == 0 {
            bail!("query.top_k must be greater than zero");
        }
        if self.query.context_budget <= MIN_TRUNCATION {
            bail!(
                "query.context_budget ({}) must exceed {MIN_TRUNCATION} characters",
                self.query.context_budget
            );
        }
        Ok(())
    }
}
