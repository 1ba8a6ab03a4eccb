//! Phrase redaction
//!
//! Candidate windows are tried longest first, left to right within each
//! length. A window that touches a word already claimed by an earlier match
//! is skipped, so the resulting spans never overlap and each one is the
//! longest blocked phrase available at its position.
//!
//! The output is rebuilt from the original text: each span replaces the byte
//! range from its first word's first kept character to its last word's last
//! kept character. Case, inner punctuation, and whitespace inside that range
//! are replaced with it; everything outside is left alone, including other
//! occurrences of the same phrase that were not matched.

use crate::hash::{DigestSet, Digester, HashError};
use crate::ngram::{tokenize, window_text};
use crate::types::{MatchSpan, ScrubOutcome};

/// Replacement used when no replacement list is configured.
pub const DEFAULT_REPLACEMENT: &str = "***";

// =============================================================================
// Replacement Sources
// =============================================================================

/// Supplies one replacement value per matched phrase.
pub trait ReplacementSource {
    fn next_replacement(&mut self) -> String;
}

impl<F> ReplacementSource for F
where
    F: FnMut() -> String,
{
    fn next_replacement(&mut self) -> String {
        self()
    }
}

/// Always the same replacement.
#[derive(Debug, Clone)]
pub struct FixedReplacement(pub String);

impl ReplacementSource for FixedReplacement {
    fn next_replacement(&mut self) -> String {
        self.0.clone()
    }
}

/// Round-robin over a list of replacements.
#[derive(Debug, Clone)]
pub struct CyclingReplacements {
    values: Vec<String>,
    next: usize,
}

impl CyclingReplacements {
    /// Empty lists fall back to [`DEFAULT_REPLACEMENT`].
    pub fn new(values: Vec<String>) -> Self {
        let values = if values.is_empty() {
            vec![DEFAULT_REPLACEMENT.to_string()]
        } else {
            values
        };
        Self { values, next: 0 }
    }
}

impl ReplacementSource for CyclingReplacements {
    fn next_replacement(&mut self) -> String {
        let value = self.values[self.next % self.values.len()].clone();
        self.next = (self.next + 1) % self.values.len();
        value
    }
}

// =============================================================================
// Scrub
// =============================================================================

/// Redact every blocked phrase of up to `max_n` words in `text`.
///
/// `source` is called exactly once per match. A hash failure aborts the pass;
/// callers decide how to fail open.
pub fn scrub<D, R>(
    digester: &D,
    text: &str,
    set: &DigestSet,
    max_n: usize,
    source: &mut R,
) -> Result<ScrubOutcome, HashError>
where
    D: Digester + ?Sized,
    R: ReplacementSource + ?Sized,
{
    let tokens = tokenize(text);
    if tokens.is_empty() || set.is_empty() {
        return Ok(ScrubOutcome::unchanged(text));
    }

    let longest = max_n.min(tokens.len());
    let mut claimed = vec![false; tokens.len()];
    let mut spans: Vec<MatchSpan> = Vec::new();

    for n in (1..=longest).rev() {
        let mut i = 0;
        while i + n <= tokens.len() {
            if claimed[i..i + n].iter().any(|&c| c) {
                i += 1;
                continue;
            }

            let digest = digester.digest(&window_text(&tokens, i, i + n))?;
            if !set.contains(&digest) {
                i += 1;
                continue;
            }

            claimed[i..i + n].fill(true);
            spans.push(MatchSpan {
                start_word: i,
                end_word: i + n,
                start_byte: tokens[i].start,
                end_byte: tokens[i + n - 1].end,
                replacement: source.next_replacement(),
            });
            i += n;
        }
    }

    if spans.is_empty() {
        return Ok(ScrubOutcome::unchanged(text));
    }

    spans.sort_by_key(|span| span.start_word);

    // Right to left so earlier byte offsets stay valid.
    let mut output = text.to_string();
    for span in spans.iter().rev() {
        output.replace_range(span.start_byte..span.end_byte, &span.replacement);
    }

    Ok(ScrubOutcome {
        text: output,
        match_count: spans.len(),
        spans,
    })
}
