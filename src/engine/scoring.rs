use std::borrow::Cow;

use icu_normalizer::ComposingNormalizerBorrowed;

/// Result of checking one change of the input buffer against the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    /// The buffer no longer matches the target. The caller resets the buffer
    /// to the first `reset_to` characters of the target.
    Miss { reset_to: usize },
    Accepted {
        /// Score earned by this change.
        delta: u64,
        /// Characters typed by this change, spaces included.
        typed: usize,
        confirmed_len: usize,
        complete: bool,
    },
}

pub fn nfc(text: &str) -> Cow<'_, str> {
    ComposingNormalizerBorrowed::new_nfc().normalize(text)
}

pub fn non_space_chars(text: &str) -> usize {
    text.chars().filter(|c| *c != ' ').count()
}

/// Base value of a problem; also the perfect bonus.
pub fn problem_value(target: &str, points_per_char: u32) -> u64 {
    non_space_chars(target) as u64 * u64::from(points_per_char)
}

/// Validate `value` against `target`, given that the first `previous_len`
/// characters were confirmed and the first `scored_len` characters have
/// already earned points. `scored_len` only grows, so retyping characters
/// after a backspace earns nothing.
pub fn validate(
    target: &str,
    previous_len: usize,
    scored_len: usize,
    value: &str,
    points_per_char: u32,
) -> Validation {
    let value = nfc(value);
    if !target.starts_with(value.as_ref()) {
        return Validation::Miss {
            reset_to: previous_len,
        };
    }

    let len = value.chars().count();
    let fresh = value
        .chars()
        .skip(scored_len)
        .filter(|c| *c != ' ')
        .count() as u64;

    Validation::Accepted {
        delta: fresh * u64::from(points_per_char),
        typed: len.saturating_sub(previous_len),
        confirmed_len: len,
        complete: value.as_ref() == target,
    }
}

/// Prefix of `target` that the input buffer is reset to after a miss.
pub fn confirmed_prefix(target: &str, len: usize) -> String {
    target.chars().take(len).collect()
}

pub fn accuracy(typed: usize, misses: u32) -> f64 {
    let attempts = typed + misses as usize;
    if attempts == 0 {
        return 100.0;
    }
    (typed as f64 / attempts as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_value_ignores_spaces() {
        assert_eq!(problem_value("cat", 10), 30);
        assert_eq!(problem_value("I am", 10), 30);
        assert_eq!(problem_value("", 10), 0);
    }

    #[test]
    fn test_correct_keystrokes_accumulate() {
        assert_eq!(
            validate("cat", 0, 0, "c", 10),
            Validation::Accepted {
                delta: 10,
                typed: 1,
                confirmed_len: 1,
                complete: false
            }
        );
        assert_eq!(
            validate("cat", 2, 2, "cat", 10),
            Validation::Accepted {
                delta: 10,
                typed: 1,
                confirmed_len: 3,
                complete: true
            }
        );
    }

    #[test]
    fn test_miss_resets_to_previous_prefix() {
        assert_eq!(validate("cat", 0, 0, "x", 10), Validation::Miss { reset_to: 0 });
        assert_eq!(validate("cat", 2, 2, "cax", 10), Validation::Miss { reset_to: 2 });
        assert_eq!(confirmed_prefix("cat", 2), "ca");
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert_eq!(validate("Cat", 0, 0, "c", 10), Validation::Miss { reset_to: 0 });
    }

    #[test]
    fn test_space_counts_as_typed_but_not_scored() {
        assert_eq!(
            validate("a b", 1, 1, "a ", 10),
            Validation::Accepted {
                delta: 0,
                typed: 1,
                confirmed_len: 2,
                complete: false
            }
        );
    }

    #[test]
    fn test_empty_value_is_not_a_miss() {
        assert_eq!(
            validate("cat", 0, 0, "", 10),
            Validation::Accepted {
                delta: 0,
                typed: 0,
                confirmed_len: 0,
                complete: false
            }
        );
    }

    #[test]
    fn test_pasted_chunk_scores_all_new_chars() {
        assert_eq!(
            validate("hello world", 0, 0, "hello w", 5),
            Validation::Accepted {
                delta: 30,
                typed: 7,
                confirmed_len: 7,
                complete: false
            }
        );
    }

    #[test]
    fn test_backspace_earns_nothing() {
        assert_eq!(
            validate("cat", 2, 2, "c", 10),
            Validation::Accepted {
                delta: 0,
                typed: 0,
                confirmed_len: 1,
                complete: false
            }
        );
    }

    #[test]
    fn test_retyping_after_backspace_earns_nothing() {
        assert_eq!(
            validate("cat", 0, 2, "c", 10),
            Validation::Accepted {
                delta: 0,
                typed: 1,
                confirmed_len: 1,
                complete: false
            }
        );
        assert_eq!(
            validate("cat", 1, 2, "cat", 10),
            Validation::Accepted {
                delta: 10,
                typed: 2,
                confirmed_len: 3,
                complete: true
            }
        );
    }

    #[test]
    fn test_multibyte_lengths_are_chars() {
        assert_eq!(
            validate("ねこ", 0, 0, "ね", 10),
            Validation::Accepted {
                delta: 10,
                typed: 1,
                confirmed_len: 1,
                complete: false
            }
        );
        assert_eq!(confirmed_prefix("ねこ", 1), "ね");
    }

    #[test]
    fn test_decomposed_input_matches_composed_target() {
        let outcome = validate("caf\u{e9}", 3, 3, "cafe\u{301}", 10);
        assert!(matches!(
            outcome,
            Validation::Accepted {
                complete: true,
                ..
            }
        ));
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(0, 0), 100.0);
        assert_eq!(accuracy(9, 1), 90.0);
    }
}
