//! Digest membership checks over text
//!
//! Two granularities are kept as separate operations: the word-level check
//! answers "does this text contain anything blocked" using single words only,
//! while the phrase-level check walks every n-gram up to a maximum length.
//! They are not interchangeable; a phrase blocked as "a b" never trips the
//! word-level check.

use crate::hash::{DigestSet, Digester, HashError};
use crate::ngram::{generate_from_tokens, tokenize};

/// Whether any single word of `text` is in `set`.
pub fn contains_blocked_word<D: Digester + ?Sized>(
    digester: &D,
    text: &str,
    set: &DigestSet,
) -> Result<bool, HashError> {
    if set.is_empty() {
        return Ok(false);
    }

    for token in tokenize(text) {
        if set.contains(&digester.digest(&token.key)?) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Whether any n-gram of `text` of up to `max_n` words is in `set`.
pub fn contains_blocked_phrase<D: Digester + ?Sized>(
    digester: &D,
    text: &str,
    set: &DigestSet,
    max_n: usize,
) -> Result<bool, HashError> {
    if set.is_empty() {
        return Ok(false);
    }

    let tokens = tokenize(text);
    for ngram in generate_from_tokens(&tokens, max_n) {
        if set.contains(&digester.digest(&ngram.text)?) {
            return Ok(true);
        }
    }

    Ok(false)
}
