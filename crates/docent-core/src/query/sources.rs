use docent_memory::SearchHit;
use serde::{Deserialize, Serialize};

const PREVIEW_CHARS: usize = 200;

/// Citation shown alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// 1-based rank.
    pub id: usize,
    pub source: String,
    /// Similarity score rounded to three decimals.
    pub relevance_score: f64,
    pub chunk_id: usize,
    pub preview: String,
}

#[must_use]
pub fn format_sources(hits: &[SearchHit]) -> Vec<SourceRef> {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| SourceRef {
            id: i + 1,
            source: hit.metadata.source.clone(),
            relevance_score: round3(hit.score),
            chunk_id: hit.metadata.chunk_id,
            preview: preview(&hit.content),
        })
        .collect()
}

fn round3(score: f32) -> f64 {
    (f64::from(score) * 1000.0).round() / 1000.0
}

fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use docent_memory::{ChunkMetadata, DocumentKind};

    use super::*;

    fn hit(content: &str, score: f32, chunk_id: usize) -> SearchHit {
        SearchHit {
            content: content.into(),
            metadata: ChunkMetadata {
                source: "guide.pdf".into(),
                kind: DocumentKind::Pdf,
                byte_size: 2048,
                chunk_id,
                total_chunks: 9,
            },
            score,
        }
    }

    #[test]
    fn ids_are_one_based_in_rank_order() {
        let sources = format_sources(&[hit("a", 0.9, 4), hit("b", 0.5, 1)]);
        assert_eq!(sources[0].id, 1);
        assert_eq!(sources[0].chunk_id, 4);
        assert_eq!(sources[1].id, 2);
        assert_eq!(sources[1].source, "guide.pdf");
    }

    #[test]
    fn score_rounded_to_three_decimals() {
        let sources = format_sources(&[hit("a", 0.123_456, 0)]);
        assert!((sources[0].relevance_score - 0.123).abs() < 1e-9);
    }

    #[test]
    fn short_preview_untouched() {
        let sources = format_sources(&[hit("short text", 1.0, 0)]);
        assert_eq!(sources[0].preview, "short text");
    }

    #[test]
    fn long_preview_truncated_with_marker() {
        let content = "ä".repeat(250);
        let sources = format_sources(&[hit(&content, 1.0, 0)]);
        assert_eq!(sources[0].preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(sources[0].preview.ends_with("..."));
    }

    #[test]
    fn exactly_200_chars_not_truncated() {
        let content = "x".repeat(PREVIEW_CHARS);
        assert_eq!(format_sources(&[hit(&content, 1.0, 0)])[0].preview, content);
    }
}
