//! Fuzzy string matching using Levenshtein distance
//!
//! Used by the line recognizer to snap misspelled or mis-heard words onto
//! the closed vocabulary of the grammars.

/// Fuzzy match using Levenshtein distance, allows ~30% errors
pub fn fuzzy_match(expected: &str, actual: &str) -> bool {
    if expected == actual {
        return true;
    }
    let max_dist = (expected.chars().count() / 3).max(1);
    levenshtein(expected, actual) <= max_dist
}

/// Calculate Levenshtein distance between two strings
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        row[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            row[j] = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

/// Lowercase and keep only letters and whitespace
pub fn clean_for_matching(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect()
}

/// Closest vocabulary entry that fuzzy-matches `word`, ties going to the earlier entry.
pub fn closest<'a, I>(word: &str, vocabulary: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    vocabulary
        .into_iter()
        .filter(|entry| fuzzy_match(entry, word))
        .min_by_key(|entry| levenshtein(entry, word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(fuzzy_match("fermer", "fermer"));
        assert!(fuzzy_match("top", "top"));
    }

    #[test]
    fn test_fuzzy_match() {
        assert!(fuzzy_match("annuler", "anuler"));
        assert!(fuzzy_match("calibration", "calibrasion"));
        assert!(fuzzy_match("top", "tops"));
    }

    #[test]
    fn test_no_match() {
        assert!(!fuzzy_match("zoom", "texte"));
        assert!(!fuzzy_match("top", "stop it"));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("texte", "texte"), 0);
        assert_eq!(levenshtein("texte", "text"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("hello", "world"), 4);
    }

    #[test]
    fn test_clean_for_matching() {
        assert_eq!(clean_for_matching("Fermer!"), "fermer");
        assert_eq!(clean_for_matching("Al, zoom."), "al zoom");
    }

    #[test]
    fn test_closest_prefers_smallest_distance() {
        let vocabulary = ["top", "tiptop"];
        assert_eq!(closest("tiptop", vocabulary), Some("tiptop"));
        assert_eq!(closest("tip", vocabulary), Some("top"));
        assert_eq!(closest("tiptap", vocabulary), Some("tiptop"));
        assert_eq!(closest("bonjour", vocabulary), None);
    }
}
