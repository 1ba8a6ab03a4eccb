//! Digest functions for Hushlist
//!
//! Every blocked word, phrase, or site is stored only as the SHA-256 digest of
//! its normalized form, rendered as 64 lowercase hex characters. Lookups
//! digest the candidate text the same way and test set membership; nothing is
//! ever reversed.
//!
//! # Empty Input
//!
//! The normalized empty string short-circuits to the well-known SHA-256 digest
//! of zero bytes instead of running the hash.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;

use sha2::{Digest as _, Sha256};

use crate::normalize::normalize;

/// Length of a rendered digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// SHA-256 of the empty byte string.
const EMPTY_DIGEST_HEX: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

// =============================================================================
// Digest
// =============================================================================

/// Fixed-length lowercase hex digest of a normalized string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

/// Error returned when a string is not a well-formed digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid digest {0:?}: expected {DIGEST_HEX_LEN} hex characters")]
pub struct DigestParseError(pub String);

impl Digest {
    /// Parse a hex digest, accepting either case and storing it lowercase.
    pub fn parse(hex: &str) -> Result<Self, DigestParseError> {
        let hex = hex.trim();
        if hex.len() != DIGEST_HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DigestParseError(hex.to_string()));
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    /// Digest of the empty normalized string.
    pub fn empty() -> Self {
        Self(EMPTY_DIGEST_HEX.to_string())
    }

    /// Render raw hash bytes as a digest.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            // Writing to a String cannot fail.
            let _ = write!(hex, "{:02x}", b);
        }
        Self(hex)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Digest {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

// =============================================================================
// Digester
// =============================================================================

/// The hash primitive could not produce a digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    #[error("hash primitive unavailable: {0}")]
    Unavailable(String),
}

/// One-way digest of normalized text.
///
/// Implementations only supply [`Digester::digest_normalized`]; the provided
/// [`Digester::digest`] normalizes and handles the empty input.
pub trait Digester {
    /// Hash text that is already normalized and non-empty.
    fn digest_normalized(&self, normalized: &str) -> Result<Digest, HashError>;

    /// Normalize `input` and hash it.
    fn digest(&self, input: &str) -> Result<Digest, HashError> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return Ok(Digest::empty());
        }
        self.digest_normalized(&normalized)
    }
}

/// The default digester: SHA-256 via the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    #[inline]
    fn digest_normalized(&self, normalized: &str) -> Result<Digest, HashError> {
        let hash = Sha256::digest(normalized.as_bytes());
        Ok(Digest::from_bytes(&hash))
    }
}

/// Digest with the default SHA-256 digester, which never fails.
pub fn digest_str(input: &str) -> Digest {
    let normalized = normalize(input);
    if normalized.is_empty() {
        return Digest::empty();
    }
    Digest::from_bytes(&Sha256::digest(normalized.as_bytes()))
}

// =============================================================================
// Digest Sets
// =============================================================================

/// A collection of blocked digests.
///
/// Built once from configuration and then only read; a reload builds a new
/// set rather than editing this one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSet {
    digests: HashSet<Digest>,
}

impl DigestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set by digesting plaintext entries.
    pub fn from_plaintext<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entries.into_iter().map(|e| digest_str(e.as_ref())).collect()
    }

    #[inline]
    pub fn contains(&self, digest: &Digest) -> bool {
        self.digests.contains(digest)
    }

    /// Look up a digest by its hex rendering.
    #[inline]
    pub fn contains_hex(&self, hex: &str) -> bool {
        self.digests.contains(hex)
    }

    pub fn insert(&mut self, digest: Digest) -> bool {
        self.digests.insert(digest)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Digest> {
        self.digests.iter()
    }
}

impl FromIterator<Digest> for DigestSet {
    fn from_iter<T: IntoIterator<Item = Digest>>(iter: T) -> Self {
        Self {
            digests: iter.into_iter().collect(),
        }
    }
}

impl Extend<Digest> for DigestSet {
    fn extend<T: IntoIterator<Item = Digest>>(&mut self, iter: T) {
        self.digests.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_consistent() {
        assert_eq!(digest_str("chair"), digest_str("chair"));
    }

    #[test]
    fn test_digest_normalizes() {
        assert_eq!(digest_str(" X "), digest_str("x"));
        assert_eq!(digest_str("Example.COM"), digest_str("example.com"));
    }

    #[test]
    fn test_digest_known_value() {
        assert_eq!(
            digest_str("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_empty_matches_sha256() {
        assert_eq!(digest_str(""), Digest::empty());
        assert_eq!(digest_str("   "), Digest::empty());
        assert_eq!(Digest::empty(), Digest::from_bytes(&Sha256::digest(b"")));
    }

    #[test]
    fn test_digest_internal_whitespace_preserved() {
        assert_ne!(digest_str("a  b"), digest_str("a b"));
    }

    #[test]
    fn test_digest_shape() {
        let d = digest_str("anything");
        assert_eq!(d.as_str().len(), DIGEST_HEX_LEN);
        assert!(d.as_str().bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_digester_trait_matches_helper() {
        assert_eq!(Sha256Digester.digest("Chair"), Ok(digest_str("chair")));
    }

    #[test]
    fn test_parse_accepts_uppercase() {
        let d = digest_str("chair");
        let upper = d.as_str().to_ascii_uppercase();
        assert_eq!(Digest::parse(&upper), Ok(d));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Digest::parse("abc").is_err());
        assert!(Digest::parse(&"z".repeat(DIGEST_HEX_LEN)).is_err());
    }

    #[test]
    fn test_set_lookup_by_hex() {
        let set = DigestSet::from_plaintext(["chair", "table"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&digest_str("CHAIR")));
        assert!(set.contains_hex(digest_str("table").as_str()));
        assert!(!set.contains(&digest_str("lamp")));
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let d = digest_str("chair");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(serde_json::from_str::<Digest>(&json).unwrap(), d);
        assert!(serde_json::from_str::<Digest>("\"nothex\"").is_err());
    }
}
