#[cfg(feature = "pdf")]
mod pdf;
mod text;

#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
pub use text::TextLoader;

use super::{DocumentError, DocumentKind, DocumentLoader};

/// Pick the loader responsible for `kind`.
///
/// # Errors
///
/// Returns [`DocumentError::UnsupportedFormat`] for PDFs when the `pdf` feature is off.
pub fn loader_for(kind: DocumentKind) -> Result<Box<dyn DocumentLoader>, DocumentError> {
    match kind {
        DocumentKind::Txt => Ok(Box::new(TextLoader)),
        #[cfg(feature = "pdf")]
        DocumentKind::Pdf => Ok(Box::new(PdfLoader)),
        #[cfg(not(feature = "pdf"))]
        DocumentKind::Pdf => Err(DocumentError::UnsupportedFormat(
            "pdf (built without the `pdf` feature)".into(),
        )),
    }
}
