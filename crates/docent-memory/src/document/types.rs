use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DocumentError;

/// Source format of an ingested document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Txt,
}

impl DocumentKind {
    /// Resolve the kind from a file name's extension, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedFormat`] for anything but `pdf` or `txt`.
    pub fn from_file_name(name: &str) -> Result<Self, DocumentError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::Txt),
            "" => Err(DocumentError::UnsupportedFormat(format!(
                "{name} has no file extension"
            ))),
            other => Err(DocumentError::UnsupportedFormat(other.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance attached to every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub kind: DocumentKind,
    /// Size of the original file in bytes.
    pub byte_size: u64,
    /// 0-based position of the chunk within its document.
    pub chunk_id: usize,
    pub total_chunks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkStats {
    pub count: usize,
    /// Mean chunk length in characters, rounded to two decimals.
    pub avg_size: f64,
    pub total_chars: usize,
    /// Distinct sources, sorted.
    pub sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(
            DocumentKind::from_file_name("notes.txt").unwrap(),
            DocumentKind::Txt
        );
        assert_eq!(
            DocumentKind::from_file_name("Paper.PDF").unwrap(),
            DocumentKind::Pdf
        );
    }

    #[test]
    fn unsupported_extension_rejected() {
        let err = DocumentKind::from_file_name("slides.pptx").unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(ref e) if e == "pptx"));
        assert!(DocumentKind::from_file_name("README").is_err());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&DocumentKind::Pdf).unwrap();
        assert_eq!(json, "\"pdf\"");
        assert_eq!(DocumentKind::Txt.to_string(), "txt");
    }
}
