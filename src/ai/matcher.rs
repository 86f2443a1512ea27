//! Matcher primitives shared by every extractor: word-boundary match,
//! multi-word phrase match, and edit-distance fuzzy match.
//!
//! All functions are pure. Callers that scan the same phrase repeatedly use
//! [`boundary_regex`] once and keep the compiled pattern.

use regex::Regex;

/// Compile `\bphrase\b` (case-insensitive) with the phrase taken literally.
pub fn boundary_regex(phrase: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
}

/// True if `phrase` occurs in `text` delimited by word boundaries.
pub fn boundary_match(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    match boundary_regex(phrase) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

/// True if `phrase` has more than one word and appears verbatim in `text`.
pub fn phrase_match(text: &str, phrase: &str) -> bool {
    phrase.contains(' ') && text.contains(phrase)
}

/// Levenshtein distance over lowercased characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    // dp[i][j] = distance between a[..i] and b[..j]
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        dp[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let substitution = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + substitution);
        }
    }

    dp[a.len()][b.len()]
}

/// Normalized similarity in `0.0..=1.0`; identical strings score 1.0.
pub fn similarity(a: &str, b: &str) -> f32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    (max_len - edit_distance(a, b).min(max_len)) as f32 / max_len as f32
}

/// Approximate match tolerant of small typos.
///
/// Literal containment wins immediately. Otherwise every whitespace token of
/// at least 3 characters is compared against `term`.
pub fn fuzzy_match(text: &str, term: &str, threshold: f32) -> bool {
    let text = text.to_lowercase();
    let term = term.to_lowercase();
    if term.is_empty() {
        return false;
    }
    if text.contains(&term) {
        return true;
    }

    text.split_whitespace()
        .filter(|token| token.chars().count() >= 3)
        .any(|token| similarity(token, &term) >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_match_respects_word_edges() {
        assert!(boundary_match("we build apps", "build"));
        assert!(boundary_match("Need an APP today", "app"));
        assert!(!boundary_match("i am happy", "app"));
        assert!(!boundary_match("anything", ""));
    }

    #[test]
    fn boundary_match_treats_metacharacters_literally() {
        assert!(boundary_match("we use react.js daily", "react.js"));
        assert!(!boundary_match("we use reactxjs daily", "react.js"));
        // Unbalanced pattern characters must not blow up.
        assert!(!boundary_match("a (b", "(b["));
    }

    #[test]
    fn phrase_match_needs_multiple_words() {
        assert!(phrase_match("we want an online store soon", "online store"));
        assert!(!phrase_match("store", "store"));
        assert!(!phrase_match("online shop", "online store"));
    }

    #[test]
    fn edit_distance_classic_cases() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("React", "react"), 0);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
    }

    #[test]
    fn fuzzy_match_tolerates_typos() {
        assert!(fuzzy_match("can you do wordpres sites", "wordpress", 0.85));
        assert!(fuzzy_match("I like Shopify", "shopify", 0.85));
        assert!(!fuzzy_match("completely unrelated words", "wordpress", 0.85));
    }

    #[test]
    fn fuzzy_match_skips_short_tokens() {
        // "js" is too short to be compared against "jsx".
        assert!(!fuzzy_match("js", "jsx", 0.6));
        assert!(fuzzy_match("jsx", "jsx", 0.6));
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }
}
