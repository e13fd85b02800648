use std::collections::{BTreeSet, VecDeque};

use super::types::{Chunk, ChunkMetadata, ChunkStats, DocumentKind};

/// Break points in priority order. The empty separator slices by character.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next.
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split a document into chunks and number them `0..n`.
    #[must_use]
    pub fn split(
        &self,
        text: &str,
        source: &str,
        kind: DocumentKind,
        byte_size: u64,
    ) -> Vec<Chunk> {
        let pieces = self.split_text(text);
        let total_chunks = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_id, content)| Chunk {
                content,
                metadata: ChunkMetadata {
                    source: source.to_owned(),
                    kind,
                    byte_size,
                    chunk_id,
                    total_chunks,
                },
            })
            .collect()
    }

    /// Split raw text into trimmed, non-empty pieces of at most `chunk_size` characters.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        if char_len(trimmed) <= self.chunk_size() {
            return vec![trimmed.to_owned()];
        }

        let mut out = Vec::new();
        self.split_recursive(text, &SEPARATORS, &mut out);
        out
    }

    fn chunk_size(&self) -> usize {
        self.config.chunk_size.max(1)
    }

    fn split_recursive(&self, text: &str, separators: &[&str], out: &mut Vec<String>) {
        let (separator, remaining) = pick_separator(text, separators);
        let splits = split_on(text, separator);

        let mut fitting: Vec<&str> = Vec::new();
        for piece in splits {
            if char_len(piece) < self.chunk_size() {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                self.merge_splits(&fitting, separator, out);
                fitting.clear();
            }
            if remaining.is_empty() {
                push_trimmed(piece, out);
            } else {
                self.split_recursive(piece, remaining, out);
            }
        }

        if !fitting.is_empty() {
            self.merge_splits(&fitting, separator, out);
        }
    }

    /// Greedily join pieces up to `chunk_size`, keeping a tail of at most
    /// `chunk_overlap` characters as the start of the next chunk.
    fn merge_splits(&self, splits: &[&str], separator: &str, out: &mut Vec<String>) {
        let chunk_size = self.chunk_size();
        let overlap = self.config.chunk_overlap;
        let sep_len = char_len(separator);
        let joined_cost = |window: &VecDeque<&str>| if window.is_empty() { 0 } else { sep_len };

        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);
            if total + len + joined_cost(&window) > chunk_size && !window.is_empty() {
                push_joined(&window, separator, out);
                while total > overlap
                    || (total > 0 && total + len + joined_cost(&window) > chunk_size)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total = total.saturating_sub(char_len(front) + joined_cost(&window));
                }
            }
            total += len + joined_cost(&window);
            window.push_back(piece);
        }

        push_joined(&window, separator, out);
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return (sep, &[]);
        }
        if text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn split_on<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split(separator).filter(|s| !s.is_empty()).collect()
    }
}

fn push_joined(window: &VecDeque<&str>, separator: &str, out: &mut Vec<String>) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    push_trimmed(&joined, out);
}

fn push_trimmed(piece: &str, out: &mut Vec<String>) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_owned());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Aggregate size and provenance statistics over a chunk list.
#[must_use]
pub fn chunk_stats(chunks: &[Chunk]) -> ChunkStats {
    let total_chars: usize = chunks.iter().map(|c| char_len(&c.content)).sum();
    let sources: BTreeSet<&str> = chunks.iter().map(|c| c.metadata.source.as_str()).collect();
    #[expect(clippy::cast_precision_loss)]
    let avg_size = if chunks.is_empty() {
        0.0
    } else {
        (total_chars as f64 / chunks.len() as f64 * 100.0).round() / 100.0
    };
    ChunkStats {
        count: chunks.len(),
        avg_size,
        total_chars,
        sources: sources.into_iter().map(str::to_owned).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
        })
    }

    #[test]
    fn empty_document() {
        let default = TextSplitter::new(SplitterConfig::default());
        let chunks = default.split("", "a.txt", DocumentKind::Txt, 0);
        assert!(chunks.is_empty());
        assert!(splitter(10, 0).split_text("   \n\n  ").is_empty());
    }

    #[test]
    fn short_text_is_single_trimmed_chunk() {
        let chunks = splitter(500, 50).split("  Hello world.\n", "a.txt", DocumentKind::Txt, 16);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.");
        assert_eq!(chunks[0].metadata.chunk_id, 0);
        assert_eq!(chunks[0].metadata.total_chunks, 1);
        assert_eq!(chunks[0].metadata.byte_size, 16);
    }

    #[test]
    fn paragraphs_preferred_over_lines() {
        let text = "First paragraph line one.\nline two.\n\nSecond paragraph here.";
        let pieces = splitter(40, 0).split_text(text);
        assert_eq!(
            pieces,
            vec![
                "First paragraph line one.\nline two.".to_owned(),
                "Second paragraph here.".to_owned(),
            ]
        );
    }

    #[test]
    fn words_overlap_between_chunks() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let pieces = splitter(20, 10).split_text(text);
        assert!(pieces.len() > 1);
        assert_eq!(pieces[0], "alpha beta gamma");
        assert_eq!(pieces[1], "beta gamma delta");
        for pair in pieces.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(
                pair[0].split(' ').any(|w| w == first_word),
                "{:?} should continue from {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn unbroken_text_falls_back_to_character_slices() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let pieces = splitter(10, 3).split_text(text);
        assert_eq!(pieces[0], "abcdefghij");
        assert_eq!(&pieces[1][..3], "hij");
        assert!(pieces.iter().all(|p| p.chars().count() <= 10));
        assert!(pieces.last().unwrap().ends_with('z'));
    }

    #[test]
    fn trailing_short_content_kept() {
        let text = "one two three four five six seven eight nine ten end";
        let pieces = splitter(15, 0).split_text(text);
        assert!(pieces.last().unwrap().ends_with("end"));
    }

    #[test]
    fn overlap_larger_than_chunk_still_progresses() {
        let pieces = splitter(5, 50).split_text("aa bb cc dd ee ff");
        assert!(!pieces.is_empty());
        assert!(pieces.iter().all(|p| p.chars().count() <= 5));
        assert!(pieces.last().unwrap().ends_with("ff"));
    }

    #[test]
    fn multibyte_characters_counted_as_chars() {
        let text = "ééééééééééééééééééééé";
        let pieces = splitter(7, 0).split_text(text);
        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| p.chars().count() == 7));
    }

    #[test]
    fn metadata_carries_source_and_kind() {
        let chunks =
            splitter(10, 0).split("aaaa bbbb cccc dddd", "notes.pdf", DocumentKind::Pdf, 99);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.metadata.source, "notes.pdf");
            assert_eq!(chunk.metadata.kind, DocumentKind::Pdf);
            assert_eq!(chunk.metadata.byte_size, 99);
        }
    }

    #[test]
    fn stats_on_empty() {
        let stats = chunk_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.avg_size.abs() < f64::EPSILON);
        assert!(stats.sources.is_empty());
    }

    #[test]
    fn stats_aggregate() {
        let mut chunks = splitter(10, 0).split("aaaa bbbb cccc", "b.txt", DocumentKind::Txt, 14);
        chunks.extend(splitter(10, 0).split("xyz", "a.txt", DocumentKind::Txt, 3));
        let stats = chunk_stats(&chunks);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_chars, 9 + 4 + 3);
        assert!((stats.avg_size - 5.33).abs() < 1e-9);
        assert_eq!(stats.sources, vec!["a.txt".to_owned(), "b.txt".to_owned()]);
    }

    mod proptest_splitter {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn split_never_panics(
                content in "\\PC{0,3000}",
                chunk_size in 1usize..800,
                chunk_overlap in 0usize..200,
            ) {
                let _ = splitter(chunk_size, chunk_overlap).split_text(&content);
            }

            #[test]
            fn chunk_ids_sequential(
                content in "[a-z \n.]{0,2000}",
                chunk_size in 5usize..300,
                chunk_overlap in 0usize..50,
            ) {
                let chunks = splitter(chunk_size, chunk_overlap)
                    .split(&content, "p.txt", DocumentKind::Txt, 0);
                let n = chunks.len();
                for (i, chunk) in chunks.iter().enumerate() {
                    prop_assert_eq!(chunk.metadata.chunk_id, i);
                    prop_assert_eq!(chunk.metadata.total_chunks, n);
                }
            }

            #[test]
            fn chunks_respect_size_and_are_nonempty(
                content in "[a-zA-Z \n]{1,2000}",
                chunk_size in 1usize..300,
                chunk_overlap in 0usize..100,
            ) {
                for piece in splitter(chunk_size, chunk_overlap).split_text(&content) {
                    prop_assert!(!piece.is_empty());
                    prop_assert!(piece.chars().count() <= chunk_size);
                }
            }

            #[test]
            fn short_input_is_one_trimmed_chunk(
                content in "[a-z \n]{1,200}",
            ) {
                prop_assume!(!content.trim().is_empty());
                let pieces = splitter(200, 20).split_text(&content);
                prop_assert_eq!(pieces, vec![content.trim().to_owned()]);
            }

            #[test]
            fn last_word_survives(
                words in proptest::collection::vec("[a-z]{1,12}", 1..200),
                chunk_size in 15usize..200,
            ) {
                let text = words.join(" ");
                let pieces = splitter(chunk_size, 0).split_text(&text);
                let last = words.last().unwrap();
                prop_assert!(pieces.last().unwrap().ends_with(last.as_str()));
            }
        }
    }
}
