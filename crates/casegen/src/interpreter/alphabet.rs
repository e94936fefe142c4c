//! Character alphabets for `str` and `strlist`.

const CLASSES: [(&str, &str); 3] = [
    ("a-z", "abcdefghijklmnopqrstuvwxyz"),
    ("A-Z", "ABCDEFGHIJKLMNOPQRSTUVWXYZ"),
    ("0-9", "0123456789"),
];

/// Expand an alphabet such as `a-z0_` into the characters it stands for.
///
/// Only the three shorthands `a-z`, `A-Z` and `0-9` are expanded, in that
/// order and textually; every other character stands for itself. Repeated
/// characters are kept, so they are drawn proportionally more often.
pub fn expand_alphabet(alphabet: &str) -> Vec<char> {
    CLASSES
        .iter()
        .fold(alphabet.to_string(), |text, (shorthand, expansion)| {
            text.replace(shorthand, expansion)
        })
        .chars()
        .collect()
}
