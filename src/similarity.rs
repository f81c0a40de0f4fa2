//! String similarity scoring on the 0–100 scale.
//!
//! The classifier needs two flavors: a token-set comparison that ignores
//! word order and duplicates (joint transfers name two people in any order)
//! and a partial ratio that finds the best-aligned substring (a family name
//! buried in a longer memo). Both are built on the normalized Levenshtein
//! distance from `strsim`.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

/// Lowercase and keep only letters and digits, collapsing everything else
/// into single spaces. Hebrew letters are alphanumeric and pass through.
fn process(s: &str) -> String {
    let mapped: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn raw_ratio(a: &str, b: &str) -> f64 {
    (normalized_levenshtein(a, b) * 100.0).round()
}

/// Best similarity between the shorter string and any equal-length window
/// of the longer one, 0–100. A name contained verbatim in a memo scores 100.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = (process(a), process(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = short.chars().count();
    let long_chars: Vec<char> = long.chars().collect();

    let mut best = 0.0_f64;
    for start in 0..=(long_chars.len() - short_len) {
        let window: String = long_chars[start..start + short_len].iter().collect();
        let score = raw_ratio(&short, &window);
        if score > best {
            best = score;
        }
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Token-set similarity, 0–100: tokens are deduplicated and sorted, then the
/// shared-token string is compared against each side's full token string.
/// Scores 100 whenever one side's token set is a subset of the other's.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let (pa, pb) = (process(a), process(b));
    if pa.is_empty() || pb.is_empty() {
        return 0.0;
    }
    let ta: BTreeSet<&str> = pa.split_whitespace().collect();
    let tb: BTreeSet<&str> = pb.split_whitespace().collect();

    let shared = ta.intersection(&tb).copied().collect::<Vec<_>>().join(" ");
    let only_a = ta.difference(&tb).copied().collect::<Vec<_>>().join(" ");
    let only_b = tb.difference(&ta).copied().collect::<Vec<_>>().join(" ");

    let with_a = format!("{shared} {only_a}").trim().to_string();
    let with_b = format!("{shared} {only_b}").trim().to_string();

    raw_ratio(&shared, &with_a)
        .max(raw_ratio(&shared, &with_b))
        .max(raw_ratio(&with_a, &with_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_full() {
        assert_eq!(partial_ratio("משפחת כהן", "משפחת כהן"), 100.0);
        assert_eq!(partial_ratio("levy", "LEVY"), 100.0);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        assert_eq!(partial_ratio("", "כהן"), 0.0);
        assert_eq!(partial_ratio("כהן", ""), 0.0);
        assert_eq!(token_set_ratio("", ""), 0.0);
        assert_eq!(token_set_ratio("...", "כהן"), 0.0);
    }

    #[test]
    fn test_punctuation_is_stripped() {
        assert_eq!(token_set_ratio("עבור: כהן", "עבור כהן"), 100.0);
    }

    #[test]
    fn test_partial_finds_name_inside_memo() {
        assert_eq!(partial_ratio("כהן", "העברה ממשפחת כהן"), 100.0);
        assert_eq!(partial_ratio("גז", "ניצנה גז עבור ועד בית"), 100.0);
    }

    #[test]
    fn test_partial_unrelated_is_low() {
        assert!(partial_ratio("אברמוביץ", "סתם העברה") < 50.0);
    }

    #[test]
    fn test_token_set_ignores_order_and_duplicates() {
        assert_eq!(token_set_ratio("מרדכי ניצנה", "ניצנה מרדכי"), 100.0);
        assert_eq!(token_set_ratio("גז גז", "גז"), 100.0);
    }

    #[test]
    fn test_token_set_subset_scores_full() {
        let combined = "ניצנה גז מרדכי גז";
        let memo = "ניצנה מרדכי גז עבור ועד בית";
        assert_eq!(token_set_ratio(combined, memo), 100.0);
    }

    #[test]
    fn test_token_set_disjoint_is_low() {
        assert!(token_set_ratio("אברהם לוי", "רות פרץ") < 40.0);
    }

    #[test]
    fn test_near_miss_spelling() {
        let score = partial_ratio("אברמוביץ", "העברה מ אברמוביץ׳ עבור ועד");
        assert!(score >= 75.0, "one-letter variant should clear 75, got {score}");
    }
}
