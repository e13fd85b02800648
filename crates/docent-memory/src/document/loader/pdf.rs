use std::pin::Pin;

use super::super::{DocumentError, DocumentLoader};

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(
        &self,
        bytes: Vec<u8>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, DocumentError>> + Send + '_>>
    {
        Box::pin(async move {
            let content = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&bytes)
                    .map_err(|e| DocumentError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| DocumentError::Io(std::io::Error::other(e)))??;

            Ok(content.trim().to_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn garbage_bytes_are_a_pdf_error() {
        let result = PdfLoader.load(b"definitely not a pdf".to_vec()).await;
        assert!(matches!(result, Err(DocumentError::Pdf(_))));
    }
}
