//! Turns municipality names into join keys.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Maps a municipality name to its canonical join key.
///
/// Diacritics are dropped, letters are lowercased, every run of whitespace or
/// punctuation becomes a single space and a leading elided article (`L'…`) is
/// removed. The function is total and idempotent. Two names with the same key
/// are treated as the same municipality, which is an approximation.
///
/// # Examples
///
/// ```
/// use radiolink::normalize_name;
///
/// assert_eq!(normalize_name("Saint-Étienne"), "saint etienne");
/// assert_eq!(normalize_name("  saint   etienne "), "saint etienne");
/// assert_eq!(normalize_name("L'Isle-Adam"), "isle adam");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        // Compatibility decomposition can reintroduce capitals (e.g. "ℌ").
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    while tokens.len() > 1 && tokens[0] == "l" {
        tokens.remove(0);
    }
    tokens.join(" ")
}
