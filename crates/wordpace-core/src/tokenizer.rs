//! Word tokenizer — splits source text into offset-tracked word tokens.
//!
//! The source text is assumed to be single-space-delimited. Splitting happens
//! on single literal spaces only: tabs, newlines, and runs of spaces are not
//! normalized. A run of two spaces yields an empty token whose range is the
//! zero-length position at the search anchor. This preserves the established
//! word-to-offset mapping — normalizing here would silently change which
//! byte ranges get highlighted, so hosts that accept free-form text must
//! pre-normalize it themselves.

use serde::{Deserialize, Serialize};

use crate::error::ReaderError;

/// A word plus its byte offsets into the immutable source snapshot.
///
/// `end` is exclusive. Tokens are produced once per playback session and
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken {
    /// The word text, exactly as it appears in the source.
    pub text: String,

    /// Byte offset of the first byte of the word.
    pub start: usize,

    /// Byte offset one past the last byte of the word.
    pub end: usize,
}

impl WordToken {
    /// Number of characters in the word. Pacing is per character, not per
    /// byte, so multi-byte words pace the same as equally long ASCII ones.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into word tokens with strictly advancing byte offsets.
///
/// Each word is located by searching for it at or after the end of the
/// previously resolved token. The anchor only ever moves forward, so
/// repeated words ("a a a") each resolve to their own position instead of
/// all collapsing onto the first occurrence.
///
/// # Errors
///
/// [`ReaderError::EmptyInput`] if `text` is empty or whitespace-only.
/// [`ReaderError::TokenizationMismatch`] if a word cannot be found at or
/// after the anchor — unreachable for text the split itself produced, kept
/// as a guard so a violation aborts before any speech starts.
pub fn tokenize(text: &str) -> Result<Vec<WordToken>, ReaderError> {
    if text.trim().is_empty() {
        return Err(ReaderError::EmptyInput);
    }

    let mut tokens = Vec::new();
    let mut anchor = 0usize;

    for word in text.split(' ') {
        let Some(found) = text[anchor..].find(word) else {
            return Err(ReaderError::TokenizationMismatch {
                word: word.to_string(),
                searched_from: anchor,
            });
        };
        let start = anchor + found;
        let end = start + word.len();
        tokens.push(WordToken {
            text: word.to_string(),
            start,
            end,
        });
        anchor = end;
    }

    Ok(tokens)
}
