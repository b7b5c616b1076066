use std::collections::VecDeque;

use crate::IndexError;

/// Recursive character splitter.
///
/// Text is split on the first separator that occurs in it (paragraphs, then
/// lines, then words, then characters), and the pieces are greedily merged back
/// into chunks of at most `chunk_size` characters. Consecutive chunks share up
/// to `chunk_overlap` characters of trailing context. Pieces that are still too
/// long are split again with the next separator.
#[derive(Clone, Debug)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            separators: default_separators(),
        }
    }
}

fn default_separators() -> Vec<String> {
    ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect()
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, IndexError> {
        if chunk_size == 0 {
            return Err(IndexError::InvalidConfig("chunk_size must be positive".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(IndexError::InvalidConfig(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: default_separators(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let pos = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(pos).map(String::as_str).unwrap_or("");
        let remaining = separators.get(pos + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks.retain(|c| !c.is_empty());
        chunks
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };
            if total + len + joiner > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);
                // Drop from the front until only the overlap remains and the next piece fits.
                while total > self.chunk_overlap
                    || (total > 0
                        && total + len + if window.is_empty() { 0 } else { sep_len }
                            > self.chunk_size)
                {
                    let Some(first) = window.pop_front() else {
                        break;
                    };
                    let dropped = char_len(first) + if window.is_empty() { 0 } else { sep_len };
                    total = total.saturating_sub(dropped);
                }
            }
            if !window.is_empty() {
                total += sep_len;
            }
            window.push_back(piece);
            total += len;
        }
        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string();
    if !joined.is_empty() {
        chunks.push(joined);
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
