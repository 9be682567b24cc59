//! The word record and the text normalization shared by the whole engine.

use serde::{Deserialize, Serialize};

/// One playable word.
///
/// Immutable once built: `word` is lowercase and trimmed, `hint` has its
/// whitespace collapsed, `length` is the number of characters in `word`
/// and always greater than zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    pub hint: String,
    pub length: usize,
}

impl WordRecord {
    /// Normalizes a raw word/hint pair. Returns `None` if the word is empty
    /// after normalization.
    pub fn new(word: &str, hint: &str) -> Option<Self> {
        let word = collapse_whitespace(word).to_lowercase();
        let length = word.chars().count();
        if length == 0 {
            return None;
        }
        Some(Self {
            word,
            hint: collapse_whitespace(hint),
            length,
        })
    }
}

/// Trims `input` and collapses every run of internal whitespace to a
/// single space.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_word_and_hint() {
        let record = WordRecord::new("  Apple ", " a   red\tfruit ").unwrap();
        assert_eq!(record.word, "apple");
        assert_eq!(record.hint, "a red fruit");
        assert_eq!(record.length, 5);
    }

    #[test]
    fn test_new_rejects_blank_word() {
        assert!(WordRecord::new("   ", "hint").is_none());
        assert!(WordRecord::new("", "").is_none());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let record = WordRecord::new("Café", "coffee shop").unwrap();
        assert_eq!(record.word, "café");
        assert_eq!(record.length, 4);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  ice \n  cream  "), "ice cream");
        assert_eq!(collapse_whitespace(""), "");
    }
}
