//! Character index and word-to-character expansion.
//!
//! Lowercase ASCII letters map to `1..=26`; every other character maps to
//! [`UNKNOWN_CHAR`]. Each position of a normalized word sequence expands to a
//! fixed-length row of character codes, or an all-padding row when the
//! position does not resolve to a word (padding, start, OOV).

use ndarray::{Array1, Array2};
use std::collections::HashMap;

use super::sequence::pad_sequence;
use super::vocab::VocabularyIndex;
use crate::Config;

/// Code for characters outside `a..z`.
pub const UNKNOWN_CHAR: i64 = 27;

/// Alphabet in code order: `ALPHABET[i]` has code `i + 1`.
const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Character-to-code index.
#[derive(Debug, Clone)]
pub struct CharIndex {
    char_to_code: HashMap<char, i64>,
    unknown: i64,
}

impl CharIndex {
    /// The 26-letter lowercase index with the given unknown code.
    #[must_use]
    pub fn lowercase_ascii(unknown: i64) -> Self {
        let char_to_code = ALPHABET
            .iter()
            .zip(1i64..)
            .map(|(&c, code)| (c, code))
            .collect();
        Self {
            char_to_code,
            unknown,
        }
    }

    /// Number of known characters.
    #[must_use]
    pub fn size(&self) -> usize {
        self.char_to_code.len()
    }

    /// The code used for characters outside the alphabet.
    #[must_use]
    pub fn unknown(&self) -> i64 {
        self.unknown
    }

    /// Get the code for a character, or `None` if it is not in the alphabet.
    #[must_use]
    pub fn lookup(&self, c: char) -> Option<i64> {
        self.char_to_code.get(&c).copied()
    }

    /// Code for a character, falling back to the unknown code.
    #[must_use]
    pub fn encode(&self, c: char) -> i64 {
        self.lookup(c).unwrap_or(self.unknown)
    }

    /// Encode every character of a word.
    #[must_use]
    pub fn encode_word(&self, word: &str) -> Vec<i64> {
        word.chars().map(|c| self.encode(c)).collect()
    }
}

impl Default for CharIndex {
    fn default() -> Self {
        Self::lowercase_ascii(UNKNOWN_CHAR)
    }
}

/// Expand one normalized word index into `config.word_char_len` character codes.
///
/// The offset is removed to recover the vocabulary rank. A resolved word is
/// spelled through `chars` and padded/truncated with [`pad_sequence`]; an
/// unresolved position yields `config.char_padding` everywhere.
#[must_use]
pub fn expand_word(
    w: i64,
    vocab: &VocabularyIndex,
    chars: &CharIndex,
    config: &Config,
) -> Vec<i64> {
    match w
        .checked_sub(config.index_from)
        .and_then(|rank| vocab.lookup(rank))
    {
        Some(word) => pad_sequence(
            &chars.encode_word(word),
            config.word_char_len,
            config.char_padding,
        ),
        None => vec![config.char_padding; config.word_char_len],
    }
}

/// Expand a whole normalized sequence into a `(seq.len(), word_char_len)` tensor.
#[must_use]
pub fn expand_sequence(
    seq: &[i64],
    vocab: &VocabularyIndex,
    chars: &CharIndex,
    config: &Config,
) -> Array2<i64> {
    let mut out = Array2::from_elem((seq.len(), config.word_char_len), config.char_padding);
    for (row, &w) in seq.iter().enumerate() {
        let encoded = Array1::from(expand_word(w, vocab, chars, config));
        out.row_mut(row).assign(&encoded);
    }
    out
}
