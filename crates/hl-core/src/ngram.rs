//! Word tokenization and n-gram generation
//!
//! Text is split on whitespace; each chunk is lowercased and stripped of
//! punctuation to form its key. Chunks with an empty key are skipped. Tokens
//! keep the byte range of their first through last kept character so the
//! scrubber can rewrite the original text in place.

use crate::normalize::is_word_char;

/// Default longest phrase, in words, considered by phrase matching.
pub const DEFAULT_MAX_NGRAM: usize = 6;

/// A word of the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Normalized, punctuation-free word.
    pub key: String,
    /// Byte offset of the first kept character in the original text.
    pub start: usize,
    /// Byte offset just past the last kept character.
    pub end: usize,
}

/// A contiguous window of words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NGram {
    /// First word index (inclusive).
    pub start: usize,
    /// Last word index (exclusive).
    pub end: usize,
    /// Word keys joined by single spaces.
    pub text: String,
}

impl NGram {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `text` into word tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut raw = String::new();
    let mut range: Option<(usize, usize)> = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            flush_token(&mut tokens, &mut raw, &mut range);
            continue;
        }
        if is_word_char(c) {
            raw.push(c);
            let end = i + c.len_utf8();
            range = Some(match range {
                Some((start, _)) => (start, end),
                None => (i, end),
            });
        }
    }
    flush_token(&mut tokens, &mut raw, &mut range);

    tokens
}

// Lowercase the whole run at once: some folds (final sigma) depend on context.
fn flush_token(tokens: &mut Vec<Token>, raw: &mut String, range: &mut Option<(usize, usize)>) {
    if let Some((start, end)) = range.take() {
        tokens.push(Token {
            key: raw.to_lowercase(),
            start,
            end,
        });
    }
    raw.clear();
}

/// Join the keys of `tokens[start..end]` with single spaces.
pub fn window_text(tokens: &[Token], start: usize, end: usize) -> String {
    let mut text = String::new();
    for (i, token) in tokens[start..end].iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        text.push_str(&token.key);
    }
    text
}

/// Every n-gram of `text` for `n` in `1..=max_n`, shortest first.
pub fn generate(text: &str, max_n: usize) -> Vec<NGram> {
    generate_from_tokens(&tokenize(text), max_n)
}

/// Every n-gram over already tokenized words, shortest first.
pub fn generate_from_tokens(tokens: &[Token], max_n: usize) -> Vec<NGram> {
    let limit = max_n.min(tokens.len());
    let mut ngrams = Vec::new();

    for n in 1..=limit {
        for start in 0..=tokens.len() - n {
            ngrams.push(NGram {
                start,
                end: start + n,
                text: window_text(tokens, start, start + n),
            });
        }
    }

    ngrams
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.key).collect()
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(keys("Hello, World!"), vec!["hello", "world"]);
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(keys("  a \t\n b  "), vec!["a", "b"]);
    }

    #[test]
    fn test_tokenize_drops_pure_punctuation() {
        assert_eq!(keys("a - b ... c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tokenize_ranges_exclude_edge_punctuation() {
        let text = "(Chair), table";
        let tokens = tokenize(text);
        assert_eq!(&text[tokens[0].start..tokens[0].end], "Chair");
        assert_eq!(&text[tokens[1].start..tokens[1].end], "table");
    }

    #[test]
    fn test_tokenize_multibyte() {
        let text = "café naïve";
        let tokens = tokenize(text);
        assert_eq!(&text[tokens[0].start..tokens[0].end], "café");
        assert_eq!(&text[tokens[1].start..tokens[1].end], "naïve");
    }

    #[test]
    fn test_tokenize_final_sigma_matches_normalize() {
        let tokens = tokenize("ΟΔΟΣ, ΟΔΟΣ");
        assert_eq!(tokens[0].key, "\u{3bf}\u{3b4}\u{3bf}\u{3c2}");
        assert_eq!(tokens[0].key, crate::normalize::normalize("ΟΔΟΣ"));
        assert_eq!(tokens[1].key, tokens[0].key);
    }

    #[test]
    fn test_generate_counts() {
        // 4 words, max 6: 4 + 3 + 2 + 1
        assert_eq!(generate("a b c d", DEFAULT_MAX_NGRAM).len(), 10);
        // max 2: 4 + 3
        assert_eq!(generate("a b c d", 2).len(), 7);
    }

    #[test]
    fn test_generate_windows() {
        let ngrams = generate("The quick, brown fox", 2);
        let texts: Vec<&str> = ngrams.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["the", "quick", "brown", "fox", "the quick", "quick brown", "brown fox"]
        );
        assert_eq!(ngrams[5].start, 1);
        assert_eq!(ngrams[5].end, 3);
        assert_eq!(ngrams[5].len(), 2);
    }

    #[test]
    fn test_generate_empty() {
        assert!(generate("", DEFAULT_MAX_NGRAM).is_empty());
        assert!(generate("!!!", DEFAULT_MAX_NGRAM).is_empty());
        assert!(generate("a b", 0).is_empty());
    }
}
