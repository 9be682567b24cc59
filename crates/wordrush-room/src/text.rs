//! Nickname and guess normalization.

use wordrush_words::collapse_whitespace;

use crate::RoomError;

/// Normalizes a nickname for display: collapses whitespace and truncates to
/// `max_len` characters.
///
/// # Errors
/// [`RoomError::InvalidNickname`] if nothing is left.
pub fn normalize_nickname(raw: &str, max_len: usize) -> Result<String, RoomError> {
    let collapsed = collapse_whitespace(raw);
    let truncated: String = collapsed.chars().take(max_len).collect();
    let nickname = truncated.trim_end().to_owned();
    if nickname.is_empty() {
        return Err(RoomError::InvalidNickname);
    }
    Ok(nickname)
}

/// The key two nicknames are compared by. `"Bob"` and `"  bOB "` collide.
pub fn nickname_key(nickname: &str) -> String {
    collapse_whitespace(nickname).to_lowercase()
}

/// Normalizes a guess the same way words are normalized, so a guess can be
/// compared to `WordRecord::word` with `==`.
pub fn normalize_guess(raw: &str) -> String {
    collapse_whitespace(raw).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_nickname_collapses_whitespace() {
        assert_eq!(normalize_nickname("  Ada   Lovelace ", 20).unwrap(), "Ada Lovelace");
    }

    #[test]
    fn test_normalize_nickname_rejects_blank() {
        assert!(matches!(
            normalize_nickname(" \t\n ", 20),
            Err(RoomError::InvalidNickname)
        ));
    }

    #[test]
    fn test_normalize_nickname_truncates_without_trailing_space() {
        assert_eq!(normalize_nickname("abcd efgh", 5).unwrap(), "abcd");
        assert_eq!(normalize_nickname("ÄÖÜäöü", 3).unwrap(), "ÄÖÜ");
    }

    #[test]
    fn test_nickname_key_is_case_insensitive() {
        assert_eq!(nickname_key("Bob"), nickname_key("  bOB "));
        assert_ne!(nickname_key("Bob"), nickname_key("Bobby"));
    }

    #[test]
    fn test_normalize_guess() {
        assert_eq!(normalize_guess("  Ice   CREAM "), "ice cream");
        assert_eq!(normalize_guess("   "), "");
    }
}
