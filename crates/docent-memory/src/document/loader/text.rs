use std::pin::Pin;

use super::super::{DocumentError, DocumentLoader};

/// Plain-text loader: UTF-8 first, Latin-1 when the bytes are not valid UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl TextLoader {
    #[must_use]
    pub fn decode(bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_owned(),
            Err(e) => {
                tracing::debug!("input is not valid UTF-8 ({e}), decoding as Latin-1");
                bytes.iter().copied().map(char::from).collect()
            }
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(
        &self,
        bytes: Vec<u8>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, DocumentError>> + Send + '_>>
    {
        Box::pin(async move { Ok(Self::decode(&bytes)) })
    }
}
