//! Name similarity scoring.
//!
//! Deterministic, allocation-light string comparison used by the screening
//! evaluator. All comparisons run on normalized strings; the final score is
//! the maximum over several strategies (exact, bounded edit distance,
//! Jaro-Winkler, substring containment) so that no single strategy's blind
//! spot suppresses a genuine match.

use crate::types::ReasonCode;

/// Score assigned when one normalized name fully contains the other.
const CONTAINMENT_SCORE: f64 = 0.9;

/// Score at or above which a match is tagged as high similarity.
const HIGH_SIMILARITY: f64 = 0.95;

/// Edit distances beyond this cap score zero from the Levenshtein strategy.
const MAX_EDIT_DISTANCE: usize = 3;

/// Normalize a name for comparison: lowercase, strip everything outside
/// alphanumerics and whitespace, collapse runs of whitespace, trim.
pub fn normalize(input: &str) -> String {
    let filtered: String = input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity between two raw names in `[0,1]`. Both inputs are normalized
/// before comparison.
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_normalized(&normalize(a), &normalize(b))
}

/// Similarity between two already-normalized names in `[0,1]`.
///
/// Symmetric and reflexive. Two empty strings score 1.0; one empty string
/// against a non-empty one scores 0.0.
pub fn similarity_normalized(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let jw = jaro_winkler(a, b);

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let edit = match levenshtein_within(a, b, MAX_EDIT_DISTANCE) {
        Some(distance) => 1.0 - distance as f64 / len_a.max(len_b) as f64,
        None => 0.0,
    };

    let containment = if a.contains(b) || b.contains(a) {
        CONTAINMENT_SCORE
    } else {
        0.0
    };

    jw.max(edit).max(containment).clamp(0.0, 1.0)
}

/// Reason codes for a retained match, most specific first.
///
/// Exactly one code is emitted per match: equality beats containment beats
/// the similarity bands.
pub fn reason_codes(query: &str, candidate: &str, score: f64, threshold: f64) -> Vec<ReasonCode> {
    if query == candidate {
        vec![ReasonCode::ExactNameMatch]
    } else if query.contains(candidate) || candidate.contains(query) {
        vec![ReasonCode::PartialNameMatch]
    } else if score >= HIGH_SIMILARITY {
        vec![ReasonCode::HighSimilarityMatch]
    } else if score >= threshold {
        vec![ReasonCode::FuzzyNameMatch]
    } else {
        vec![]
    }
}

/// Levenshtein distance, abandoned once it provably exceeds `cap`.
///
/// Returns `None` when the distance is greater than `cap`. The cap keeps
/// the edit strategy focused on near-misses (typos, transliterations)
/// instead of rewarding short unrelated strings.
fn levenshtein_within(a: &str, b: &str, cap: usize) -> Option<usize> {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.len().abs_diff(b_chars.len()) > cap {
        return None;
    }

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        let mut row_min = current[0];

        for (j, cb) in b_chars.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
            row_min = row_min.min(current[j + 1]);
        }

        if row_min > cap {
            return None;
        }
        std::mem::swap(&mut previous, &mut current);
    }

    let distance = previous[b_chars.len()];
    (distance <= cap).then_some(distance)
}

/// Jaro-Winkler similarity with the standard prefix boost (scaling 0.1,
/// prefix capped at 4).
fn jaro_winkler(s1: &str, s2: &str) -> f64 {
    let jaro = jaro(s1, s2);
    let prefix_len = s1
        .chars()
        .zip(s2.chars())
        .take(4)
        .take_while(|(a, b)| a == b)
        .count();
    jaro + (prefix_len as f64 * 0.1 * (1.0 - jaro))
}

/// Jaro similarity function.
fn jaro(s1: &str, s2: &str) -> f64 {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 || len2 == 0 {
        return 0.0;
    }

    if s1 == s2 {
        return 1.0;
    }

    let match_distance = (len1.max(len2) / 2).saturating_sub(1);

    let mut s1_matches = vec![false; len1];
    let mut s2_matches = vec![false; len2];

    let mut matches = 0usize;
    let mut transpositions = 0usize;

    for i in 0..len1 {
        let start = i.saturating_sub(match_distance);
        let end = (i + match_distance + 1).min(len2);

        for j in start..end {
            if s2_matches[j] || s1_chars[i] != s2_chars[j] {
                continue;
            }
            s1_matches[i] = true;
            s2_matches[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut k = 0usize;
    for i in 0..len1 {
        if !s1_matches[i] {
            continue;
        }
        while !s2_matches[k] {
            k += 1;
        }
        if s1_chars[i] != s2_chars[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = transpositions as f64 / 2.0;

    (m / len1 as f64 + m / len2 as f64 + (m - t) / m) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("  John   SMITH-Jones, Jr. "), "john smithjones jr");
        assert_eq!(normalize("O'Brien"), "obrien");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_identical_names_score_one() {
        assert_eq!(similarity("John Smith", "john  SMITH."), 1.0);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("john", ""), 0.0);
        assert_eq!(similarity("", "john"), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("John Smith", "Jon Smyth"),
            ("Maria Garcia", "Mariya Garsia"),
            ("ACME Trading Ltd", "ACME Trading Limited"),
        ];
        for (a, b) in pairs {
            let forward = similarity(a, b);
            let backward = similarity(b, a);
            assert!((forward - backward).abs() < 1e-12, "{a} vs {b}");
        }
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let names = ["", "a", "john smith", "completely different text here"];
        for a in names {
            for b in names {
                let score = similarity(a, b);
                assert!((0.0..=1.0).contains(&score), "{a} vs {b} -> {score}");
            }
        }
    }

    #[test]
    fn test_typo_scores_as_fuzzy_match() {
        let score = similarity("Jon Smyth", "John Smith");
        assert!(score >= 0.85, "expected fuzzy-range score, got {score}");
        assert!(score < HIGH_SIMILARITY);

        let codes = reason_codes(
            &normalize("Jon Smyth"),
            &normalize("John Smith"),
            score,
            0.85,
        );
        assert_eq!(codes, vec![ReasonCode::FuzzyNameMatch]);
    }

    #[test]
    fn test_containment_scores_fixed_value() {
        let score = similarity("John Smith", "Mr John Smith");
        assert!(score >= CONTAINMENT_SCORE);

        let codes = reason_codes(
            &normalize("John Smith"),
            &normalize("Mr John Smith"),
            score,
            0.85,
        );
        assert_eq!(codes, vec![ReasonCode::PartialNameMatch]);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        let score = similarity("John Smith", "Wei Zhang");
        assert!(score < 0.85, "unexpected high score {score}");
    }

    #[test]
    fn test_levenshtein_cap() {
        assert_eq!(levenshtein_within("kitten", "sitting", 3), Some(3));
        assert_eq!(levenshtein_within("abcdef", "ghijkl", 3), None);
        assert_eq!(levenshtein_within("same", "same", 3), Some(0));
    }

    #[test]
    fn test_exact_reason_takes_precedence() {
        let codes = reason_codes("john smith", "john smith", 1.0, 0.85);
        assert_eq!(codes, vec![ReasonCode::ExactNameMatch]);
    }
}
