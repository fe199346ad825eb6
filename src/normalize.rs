//! Accent-insensitive comparison for Portuguese words.
//!
//! Players type on an A–Z keyboard, so `SABIO` has to match the target `SÁBIO`
//! and, once matched, be shown with the target's accents.

/// Accented lowercase character and its unaccented base.
const ACCENT_TABLE: &[(char, char)] = &[
    ('á', 'a'),
    ('à', 'a'),
    ('ã', 'a'),
    ('â', 'a'),
    ('ä', 'a'),
    ('é', 'e'),
    ('è', 'e'),
    ('ê', 'e'),
    ('ë', 'e'),
    ('í', 'i'),
    ('ì', 'i'),
    ('î', 'i'),
    ('ï', 'i'),
    ('ó', 'o'),
    ('ò', 'o'),
    ('õ', 'o'),
    ('ô', 'o'),
    ('ö', 'o'),
    ('ú', 'u'),
    ('ù', 'u'),
    ('û', 'u'),
    ('ü', 'u'),
    ('ç', 'c'),
    ('ñ', 'n'),
];

/// Base character of a single (already lowercased) character.
#[must_use]
pub fn fold_char(c: char) -> char {
    ACCENT_TABLE
        .iter()
        .find(|(accented, _)| *accented == c)
        .map_or(c, |&(_, base)| base)
}

/// Lowercase `word` and strip accents.
#[must_use]
pub fn remove_accents(word: &str) -> String {
    word.to_lowercase().chars().map(fold_char).collect()
}

/// Uppercase, accent-free form used for letter comparison and the keyboard map.
#[must_use]
pub fn fold_upper(word: &str) -> String {
    remove_accents(word).to_uppercase()
}

/// Case- and accent-insensitive equality.
#[must_use]
pub fn are_equal(a: &str, b: &str) -> bool {
    remove_accents(a) == remove_accents(b)
}

/// Rebuild `user_input` with the accents of `original_word`.
///
/// Returns `user_input` untouched when the two words differ after
/// normalization; otherwise returns the uppercase accented form.
#[must_use]
pub fn add_accents(user_input: &str, original_word: &str) -> String {
    if !are_equal(user_input, original_word) {
        return user_input.to_string();
    }

    let original: Vec<char> = original_word.to_lowercase().chars().collect();
    user_input
        .to_lowercase()
        .chars()
        .enumerate()
        .map(|(i, c)| match original.get(i) {
            Some(&o) if fold_char(o) == fold_char(c) => o,
            _ => c,
        })
        .collect::<String>()
        .to_uppercase()
}
