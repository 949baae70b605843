//! Answer Judge - exact and fuzzy correctness
//!
//! Both strings are trimmed and lowercased before comparison. An exact match
//! wins immediately; otherwise a Levenshtein ratio over characters decides,
//! `ratio = 1 - distance / max_chars`, correct iff `ratio >= threshold`.
//!
//! Diacritics are NOT folded: "café" and "cafe" differ by one edit like any
//! other character pair. Case folding uses Unicode lowercase, which is
//! locale-independent, so the verdict is deterministic for identical inputs.

/// Default similarity threshold for a fuzzy match
pub const FUZZY_THRESHOLD: f64 = 0.8;

/// Judges submitted answers against the reference translation
///
/// Pure and stateless apart from the configured threshold.
#[derive(Debug, Clone, Copy)]
pub struct AnswerJudge {
    threshold: f64,
}

impl Default for AnswerJudge {
    fn default() -> Self {
        Self {
            threshold: FUZZY_THRESHOLD,
        }
    }
}

impl AnswerJudge {
    /// Create a judge with a custom similarity threshold in `[0, 1]`
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Decide whether `submitted` counts as a correct answer for `reference`
    pub fn judge(&self, submitted: &str, reference: &str) -> bool {
        let submitted = normalize(submitted);
        let reference = normalize(reference);

        if submitted == reference {
            return true;
        }
        // An empty submission can only match an empty reference, which the
        // exact check above already handled.
        if submitted.is_empty() || reference.is_empty() {
            return false;
        }

        similarity_ratio(&submitted, &reference) >= self.threshold
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Levenshtein similarity in `[0, 1]` over characters
///
/// `1.0` means identical, `0.0` means every character must change.
fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

/// Classic two-row Levenshtein distance
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_after_normalization() {
        let judge = AnswerJudge::default();
        assert!(judge.judge("apel", "Apel "));
        assert!(judge.judge("  Rumah", "rumah"));
    }

    #[test]
    fn test_typo_within_threshold() {
        let judge = AnswerJudge::default();
        // "aple" vs "apple": 1 edit over 5 chars = 0.8, exactly at threshold
        assert!(judge.judge("aple", "apple"));
    }

    #[test]
    fn test_wrong_answer_rejected() {
        let judge = AnswerJudge::default();
        assert!(!judge.judge("xyz", "apple"));
    }

    #[test]
    fn test_empty_submission() {
        let judge = AnswerJudge::default();
        assert!(!judge.judge("", "apple"));
        assert!(!judge.judge("   ", "apple"));
        // Both empty after normalization = exact match
        assert!(judge.judge("  ", ""));
    }

    #[test]
    fn test_judge_is_reflexive() {
        let judge = AnswerJudge::default();
        for word in ["buku", "sepeda motor", "x", "Ärger"] {
            assert!(judge.judge(word, word), "judge({word}, {word}) must be true");
        }
    }

    #[test]
    fn test_diacritics_are_not_folded() {
        // One edit over 4 chars = 0.75, below the default threshold
        let judge = AnswerJudge::default();
        assert!(!judge.judge("cafe", "café"));
    }

    #[test]
    fn test_custom_threshold() {
        let strict = AnswerJudge::with_threshold(1.0);
        assert!(!strict.judge("aple", "apple"));
        assert!(strict.judge("apple", "apple"));

        let lenient = AnswerJudge::with_threshold(0.5);
        assert!(lenient.judge("aply", "apple"));
    }

    #[test]
    fn test_levenshtein_known_distances() {
        let d = |a: &str, b: &str| {
            levenshtein(
                &a.chars().collect::<Vec<_>>(),
                &b.chars().collect::<Vec<_>>(),
            )
        };
        assert_eq!(d("kitten", "sitting"), 3);
        assert_eq!(d("", "abc"), 3);
        assert_eq!(d("abc", "abc"), 0);
        assert_eq!(d("flaw", "lawn"), 2);
    }
}
