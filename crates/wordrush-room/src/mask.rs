//! The display mask shown to guessers.

/// Placeholder shown for each hidden character.
const HIDDEN: &str = "_";

/// Renders the partially hidden word shown to guessers.
///
/// The first and last characters are shown uppercase; every character in
/// between becomes `_`, with single spaces between all of them:
/// `"apple"` renders as `"A _ _ _ E"`. Words of one character or less are
/// shown in full.
pub fn mask_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= 1 {
        return word.to_uppercase();
    }

    let last = chars.len() - 1;
    let mut parts = Vec::with_capacity(chars.len());
    for (i, c) in chars.iter().enumerate() {
        if i == 0 || i == last {
            parts.push(c.to_uppercase().collect::<String>());
        } else {
            parts.push(HIDDEN.to_owned());
        }
    }
    parts.join(" ")
}
