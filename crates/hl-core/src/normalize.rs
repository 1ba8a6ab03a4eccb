//! Text canonicalization applied before every digest.

/// Lowercase and trim `s`, keeping internal whitespace exactly as written.
#[inline]
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Whether `c` survives word-key extraction.
///
/// Everything that is neither alphanumeric nor whitespace counts as
/// punctuation and is dropped from word keys.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Normalize a single whitespace-delimited chunk into its word key.
pub fn word_key(chunk: &str) -> String {
    let raw: String = chunk.chars().filter(|&c| is_word_char(c)).collect();
    raw.to_lowercase()
}

/// Canonical form of a word or phrase block list entry.
///
/// Word keys joined by single spaces, the same text the tokenizer hashes for
/// an n-gram. `None` when the entry has no word characters.
pub fn canonical_phrase(entry: &str) -> Option<String> {
    let keys: Vec<String> = entry
        .split_whitespace()
        .map(word_key)
        .filter(|key| !key.is_empty())
        .collect();
    if keys.is_empty() {
        return None;
    }
    Some(keys.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_case_and_trim() {
        assert_eq!(normalize("  Hello World\t"), "hello world");
    }

    #[test]
    fn test_normalize_keeps_internal_whitespace() {
        assert_eq!(normalize("a  b\tc"), "a  b\tc");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_unicode() {
        assert_eq!(normalize("ÉCOLE"), "école");
    }

    #[test]
    fn test_word_key_strips_punctuation() {
        assert_eq!(word_key("Chair."), "chair");
        assert_eq!(word_key("\"don't\""), "dont");
        assert_eq!(word_key("..."), "");
    }

    #[test]
    fn test_word_key_final_sigma() {
        assert_eq!(word_key("ΟΔΟΣ!"), normalize("ΟΔΟΣ"));
    }

    #[test]
    fn test_canonical_phrase() {
        assert_eq!(canonical_phrase("  Sit   DOWN "), Some("sit down".to_string()));
        assert_eq!(canonical_phrase("don't"), Some("dont".to_string()));
        assert_eq!(canonical_phrase("e-mail"), Some("email".to_string()));
        assert_eq!(canonical_phrase("wait - what"), Some("wait what".to_string()));
        assert_eq!(canonical_phrase(" ... "), None);
        assert_eq!(canonical_phrase(""), None);
    }
}
