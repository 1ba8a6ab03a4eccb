//! Hushlist Core Library
//!
//! This crate provides the matching engine for the Hushlist blocker: a word,
//! phrase, and site blocker whose block lists hold only SHA-256 digests.
//!
//! # Architecture
//!
//! Plaintext never enters the engine's state. Block lists arrive as digests
//! of normalized entries; at check time the engine normalizes candidate text,
//! digests it, and tests set membership. Phrases are found by digesting every
//! word window up to a maximum length rather than by looking anything up in a
//! dictionary.
//!
//! # Modules
//!
//! - `normalize`: case folding and trimming applied before every digest
//! - `hash`: SHA-256 digests and digest sets
//! - `ngram`: word tokenization and n-gram windows
//! - `matcher`: word-level and phrase-level membership checks
//! - `scrub`: longest-match-first redaction
//! - `url`: URL decomposition for site checks
//! - `site`: per-segment and navigation site checks
//! - `config`: engine configuration and providers
//! - `service`: the stateful blocking facade
//! - `interceptor`: in-place scrubbing of editable surfaces
//! - `types`: shared type definitions

pub mod config;
pub mod hash;
pub mod interceptor;
pub mod matcher;
pub mod ngram;
pub mod normalize;
pub mod scrub;
pub mod service;
pub mod site;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use config::{ConfigError, ConfigProvider, EngineConfig, JsonFileConfig, StaticConfig};
pub use hash::{digest_str, Digest, DigestSet, Digester, HashError, Sha256Digester};
pub use interceptor::{EditableSurface, InputInterceptor, InterceptOutcome, SurfaceId, TextFilter};
pub use normalize::canonical_phrase;
pub use scrub::{scrub, CyclingReplacements, FixedReplacement, ReplacementSource};
pub use service::{BlockingDecisionService, EngineError, EngineState};
pub use site::{canonical_site, is_navigation_blocked, is_site_blocked};
pub use types::{EditEvent, MatchSpan, ScrubOutcome};
