//! Word-sequence normalization.
//!
//! Turns a raw review (frequency ranks) into a fixed-length sequence:
//!
//! ```text
//! [10, 20, 5001]
//!   shift + start   -> [2, 13, 23, 5004]
//!   oov (cap 5000)  -> [2, 13, 23, 3]
//!   pad to 6        -> [1, 1, 2, 13, 23, 3]
//! ```
//!
//! Padding goes on the left and truncation keeps the rightmost elements, so
//! the end of a long review is what survives.

use crate::Config;

/// Shift every token by `index_from` and prepend `start_char`.
///
/// The shift saturates at `i64::MAX`, which is always past the OOV cap.
#[must_use]
pub fn shift_and_mark(tokens: &[i64], start_char: i64, index_from: i64) -> Vec<i64> {
    let mut out = Vec::with_capacity(tokens.len() + 1);
    out.push(start_char);
    out.extend(tokens.iter().map(|&t| t.saturating_add(index_from)));
    out
}

/// Replace every value `>= max_words` with `oov_char`, in place.
///
/// Idempotent as long as `oov_char < max_words`.
pub fn replace_oov(seq: &mut [i64], max_words: usize, oov_char: i64) {
    let cap = i64::try_from(max_words).unwrap_or(i64::MAX);
    for v in seq.iter_mut() {
        if *v >= cap {
            *v = oov_char;
        }
    }
}

/// Left-pad with `padding` or keep the last `target_len` elements.
///
/// The result always has exactly `target_len` elements. Applying it twice
/// with the same arguments is a no-op the second time.
#[must_use]
pub fn pad_sequence(seq: &[i64], target_len: usize, padding: i64) -> Vec<i64> {
    if seq.len() >= target_len {
        return seq[seq.len() - target_len..].to_vec();
    }
    let mut out = Vec::with_capacity(target_len);
    out.resize(target_len - seq.len(), padding);
    out.extend_from_slice(seq);
    out
}

/// Normalize a raw review to `config.sequence_len` word indices.
///
/// Shift, start marker, OOV clamp (compared against shifted values), then
/// [`pad_sequence`]. Total over any input.
#[must_use]
pub fn normalize_review(tokens: &[i64], config: &Config) -> Vec<i64> {
    let mut seq = shift_and_mark(tokens, config.start_char, config.index_from);
    replace_oov(&mut seq, config.max_words, config.oov_char);
    pad_sequence(&seq, config.sequence_len, config.padding_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_config(sequence_len: usize) -> Config {
        Config {
            max_words: 5000,
            index_from: 3,
            oov_char: 3,
            start_char: 2,
            padding_value: 1,
            sequence_len,
            ..Config::default()
        }
    }

    #[test]
    fn test_shift_and_mark() {
        assert_eq!(shift_and_mark(&[10, 20, 5001], 2, 3), vec![2, 13, 23, 5004]);
        assert_eq!(shift_and_mark(&[], 2, 3), vec![2]);
    }

    #[test]
    fn test_replace_oov_after_shift() {
        // 4997 + 3 = 5000 hits the cap only after shifting
        let mut seq = shift_and_mark(&[4996, 4997], 2, 3);
        replace_oov(&mut seq, 5000, 3);
        assert_eq!(seq, vec![2, 4999, 3]);
    }

    #[test]
    fn test_replace_oov_idempotent() {
        let mut seq = vec![2, 13, 23, 5004, 9000];
        replace_oov(&mut seq, 5000, 3);
        let once = seq.clone();
        replace_oov(&mut seq, 5000, 3);
        assert_eq!(seq, once);
    }

    #[test]
    fn test_pad_sequence_left_pads() {
        assert_eq!(pad_sequence(&[7, 8], 4, 0), vec![0, 0, 7, 8]);
    }

    #[test]
    fn test_pad_sequence_keeps_tail() {
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5], 3, 0), vec![3, 4, 5]);
        assert_eq!(pad_sequence(&[1, 2, 3], 3, 0), vec![1, 2, 3]);
    }

    #[test]
    fn test_pad_sequence_idempotent() {
        let once = pad_sequence(&[5, 6, 7], 6, 1);
        assert_eq!(pad_sequence(&once, 6, 1), once);
        let once = pad_sequence(&[5, 6, 7, 8, 9, 10, 11], 6, 1);
        assert_eq!(pad_sequence(&once, 6, 1), once);
    }

    #[test]
    fn test_normalize_pads_short_review() {
        let seq = normalize_review(&[10, 20, 5001], &scenario_config(6));
        assert_eq!(seq, vec![1, 1, 2, 13, 23, 3]);
    }

    #[test]
    fn test_normalize_truncates_long_review() {
        let seq = normalize_review(&[10, 20, 5001], &scenario_config(3));
        assert_eq!(seq, vec![13, 23, 3]);
    }

    #[test]
    fn test_normalize_empty_review() {
        let seq = normalize_review(&[], &scenario_config(4));
        assert_eq!(seq, vec![1, 1, 1, 2]);
    }

    #[test]
    fn test_huge_rank_becomes_oov() {
        assert_eq!(shift_and_mark(&[i64::MAX], 2, 3), vec![2, i64::MAX]);
        let seq = normalize_review(&[i64::MAX, i64::MAX - 1, 7], &scenario_config(4));
        assert_eq!(seq, vec![2, 3, 3, 10]);
    }

    #[test]
    fn test_normalize_exact_fit_keeps_start() {
        let seq = normalize_review(&[1, 2, 3], &scenario_config(4));
        assert_eq!(seq, vec![2, 4, 5, 6]);
    }
}
