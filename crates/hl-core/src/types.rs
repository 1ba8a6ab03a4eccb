//! Shared type definitions for Hushlist
//!
//! Result types for the scrubber and the event masks used by the input
//! interceptor.

// =============================================================================
// Scrub Results
// =============================================================================

/// A resolved match over word indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// First word index (inclusive)
    pub start_word: usize,
    /// Last word index (exclusive)
    pub end_word: usize,
    /// Byte range in the original text that was replaced
    pub start_byte: usize,
    pub end_byte: usize,
    /// Replacement written over the range
    pub replacement: String,
}

impl MatchSpan {
    /// Number of words covered.
    #[inline]
    pub fn word_len(&self) -> usize {
        self.end_word - self.start_word
    }

    /// Whether two spans share a word index.
    #[inline]
    pub fn overlaps(&self, other: &MatchSpan) -> bool {
        self.start_word < other.end_word && other.start_word < self.end_word
    }
}

/// Output of one scrub pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubOutcome {
    /// Redacted text, or the input unchanged when nothing matched
    pub text: String,
    /// Number of matched phrases
    pub match_count: usize,
    /// Matched spans ordered by start word
    pub spans: Vec<MatchSpan>,
}

impl ScrubOutcome {
    /// An outcome that leaves `text` untouched.
    pub fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            match_count: 0,
            spans: Vec::new(),
        }
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.match_count > 0
    }
}

// =============================================================================
// Edit Events (bit mask for interceptor listeners)
// =============================================================================

bitflags::bitflags! {
    /// Edit event kinds the interceptor reacts to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EditEvent: u8 {
        /// Typed input
        const INPUT = 1 << 0;
        /// Programmatic value change
        const CHANGE = 1 << 1;
        /// Key release
        const KEYUP = 1 << 2;
        /// Paste, handled after a short delay
        const PASTE = 1 << 3;

        /// All edit events
        const ALL = Self::INPUT.bits() | Self::CHANGE.bits() | Self::KEYUP.bits() | Self::PASTE.bits();
    }
}

impl EditEvent {
    /// Parse from a DOM event type string.
    pub fn from_dom_type(s: &str) -> Option<Self> {
        match s {
            "input" => Some(Self::INPUT),
            "change" => Some(Self::CHANGE),
            "keyup" => Some(Self::KEYUP),
            "paste" => Some(Self::PASTE),
            _ => None,
        }
    }

    /// DOM event type strings for every kind in this mask.
    pub fn dom_types(self) -> Vec<&'static str> {
        let mut types = Vec::with_capacity(4);
        if self.contains(Self::INPUT) {
            types.push("input");
        }
        if self.contains(Self::CHANGE) {
            types.push("change");
        }
        if self.contains(Self::KEYUP) {
            types.push("keyup");
        }
        if self.contains(Self::PASTE) {
            types.push("paste");
        }
        types
    }
}
