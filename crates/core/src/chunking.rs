use crate::error::IngestError;
use crate::models::{DocumentFingerprint, IngestionOptions, TextChunk};
use sha2::{Digest, Sha256};

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl ChunkingConfig {
    pub fn validate(self) -> Result<Self, IngestError> {
        if self.max_chars == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "max_chars must be positive".to_string(),
            ));
        }
        if self.overlap_chars >= self.max_chars {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap {} must be smaller than chunk size {}",
                self.overlap_chars, self.max_chars
            )));
        }
        Ok(self)
    }
}

impl From<&IngestionOptions> for ChunkingConfig {
    fn from(value: &IngestionOptions) -> Self {
        Self {
            max_chars: value.chunk_max_chars,
            overlap_chars: value.chunk_overlap_chars,
        }
    }
}

/// Splits text on the coarsest separator present, recursing into finer
/// separators for pieces that are still too long, then packs the pieces
/// into windows of at most `max_chars` with up to `overlap_chars` carried
/// forward into the next window. Whitespace at window boundaries is kept
/// so no source characters are lost; windows that are entirely blank are
/// dropped.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    config: ChunkingConfig,
}

impl RecursiveSplitter {
    pub fn new(config: ChunkingConfig) -> Result<Self, IngestError> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &DEFAULT_SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|separator| separator.is_empty() || text.contains(separator))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.config.max_chars {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge_pieces(&pending));
                pending.clear();
            }

            if finer.is_empty() {
                if !piece.trim().is_empty() {
                    chunks.push(piece.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge_pieces(&pending));
        }

        chunks
    }

    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut merged = Vec::new();
        let mut window: Vec<(&str, usize)> = Vec::new();
        let mut total = 0usize;

        for piece in pieces {
            let length = char_len(piece);

            if total + length > self.config.max_chars && !window.is_empty() {
                push_joined(&mut merged, &window);

                while total > self.config.overlap_chars
                    || (total + length > self.config.max_chars && total > 0)
                {
                    let (_, dropped) = window.remove(0);
                    total -= dropped;
                }
            }

            window.push((piece, length));
            total += length;
        }

        push_joined(&mut merged, &window);
        merged
    }
}

fn push_joined(target: &mut Vec<String>, window: &[(&str, usize)]) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    if !joined.trim().is_empty() {
        target.push(joined);
    }
}

/// Splits on `separator`, leaving each separator at the start of the piece
/// that follows it. An empty separator splits into single characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(index, ch)| &text[index..index + ch.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (position, _) in text.match_indices(separator) {
        if position > start {
            pieces.push(&text[start..position]);
        }
        start = position;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn build_chunks(
    document: &DocumentFingerprint,
    text: &str,
    options: &IngestionOptions,
) -> Result<Vec<TextChunk>, IngestError> {
    let splitter = RecursiveSplitter::new(ChunkingConfig::from(options))?;

    let chunks = splitter
        .split_text(text)
        .into_iter()
        .enumerate()
        .map(|(index, piece)| {
            let index = index as u64;
            TextChunk {
                chunk_id: make_chunk_id(&document.checksum, index, &piece),
                document_name: document.document_name.clone(),
                chunk_index: index,
                text: piece,
            }
        })
        .collect();

    Ok(chunks)
}

fn make_chunk_id(document_checksum: &str, index: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_checksum.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(max_chars: usize, overlap_chars: usize) -> RecursiveSplitter {
        RecursiveSplitter::new(ChunkingConfig {
            max_chars,
            overlap_chars,
        })
        .expect("valid config")
    }

    fn shared_boundary(left: &str, right: &str) -> usize {
        let left: Vec<char> = left.chars().collect();
        let right: Vec<char> = right.chars().collect();
        (0..=left.len().min(right.len()))
            .rev()
            .find(|&n| left[left.len() - n..] == right[..n])
            .unwrap_or(0)
    }

    fn report_text() -> String {
        (0..600)
            .map(|i| format!("Revenue line {i} rose by {} percent.", i % 17))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = splitter(2_000, 200).split_text("  Net revenue grew 4%.  ");
        assert_eq!(chunks, vec!["  Net revenue grew 4%.  ".to_string()]);
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        assert!(splitter(2_000, 200).split_text("").is_empty());
        assert!(splitter(2_000, 200).split_text(" \n\n ").is_empty());
    }

    #[test]
    fn chunks_respect_size_and_overlap_bounds() {
        let text = report_text();
        let chunks = splitter(2_000, 200).split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 2_000, "chunk too long: {}", char_len(chunk));
        }
        for pair in chunks.windows(2) {
            assert!(shared_boundary(&pair[0], &pair[1]) <= 200);
        }
    }

    #[test]
    fn chunks_cover_the_whole_text() {
        let text = report_text();
        let chunks = splitter(2_000, 200).split_text(&text);
        let covered: usize = chunks.iter().map(|chunk| char_len(chunk)).sum();
        assert!(covered >= char_len(&text));
        assert!(text.starts_with(chunks[0].as_str()));
        assert!(text.ends_with(chunks[chunks.len() - 1].as_str()));
    }

    #[test]
    fn paragraph_breaks_are_preferred() {
        let first = "a".repeat(30);
        let second = "b".repeat(30);
        let text = format!("{first}\n\n{second}");
        let chunks = splitter(40, 5).split_text(&text);
        assert_eq!(chunks, vec![first, format!("\n\n{second}")]);
    }

    #[test]
    fn paragraph_boundaries_keep_every_character() {
        let text = format!("{}\n\n{}", "a".repeat(1_500), "b".repeat(1_500));
        let chunks = splitter(2_000, 200).split_text(&text);

        assert_eq!(chunks.len(), 2);
        let covered: usize = chunks.iter().map(|chunk| char_len(chunk)).sum();
        assert!(covered >= char_len(&text), "covered {covered} of {}", char_len(&text));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn unbroken_text_falls_back_to_hard_cuts() {
        let text: String = (0..200)
            .map(|i| i.to_string())
            .collect::<String>()
            .chars()
            .take(95)
            .collect();
        let chunks = splitter(40, 10).split_text(&text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|chunk| char_len(chunk) <= 40));
        assert_eq!(shared_boundary(&chunks[0], &chunks[1]), 10);
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "€".repeat(120);
        let chunks = splitter(50, 5).split_text(&text);
        assert!(chunks.iter().all(|chunk| char_len(chunk) <= 50));
    }

    #[test]
    fn overlap_larger_than_chunk_is_rejected() {
        let result = RecursiveSplitter::new(ChunkingConfig {
            max_chars: 100,
            overlap_chars: 100,
        });
        assert!(matches!(result, Err(IngestError::InvalidChunkConfig(_))));
    }

    #[test]
    fn build_chunks_assigns_stable_ids() {
        let document = DocumentFingerprint {
            document_name: "annual.pdf".to_string(),
            checksum: "abc".to_string(),
            page_count: 1,
            ingested_at: chrono::Utc::now(),
        };
        let text = report_text();
        let first = build_chunks(&document, &text, &IngestionOptions::default()).unwrap();
        let second = build_chunks(&document, &text, &IngestionOptions::default()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].document_name, "annual.pdf");
        assert_eq!(first[1].chunk_index, 1);
        assert_ne!(first[0].chunk_id, first[1].chunk_id);
    }
}
