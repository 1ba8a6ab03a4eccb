//! Blocking Decision Service
//!
//! Stateful facade over the pure matchers. State moves from Uninitialized to
//! Ready on a successful [`BlockingDecisionService::initialize`] and back on
//! [`BlockingDecisionService::dispose`]. The loaded state is an immutable
//! [`EngineState`] behind an `Arc`; reload builds a new one and swaps the
//! pointer, so a check that already cloned the old `Arc` finishes against a
//! consistent snapshot.
//!
//! Every check returns `false` (or leaves text unchanged) when the service is
//! Uninitialized or disabled. Per-check failures are logged and fail open.

use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{ConfigError, ConfigProvider, EngineConfig};
use crate::hash::{DigestSet, Digester, Sha256Digester};
use crate::matcher;
use crate::scrub::{self, CyclingReplacements, ReplacementSource};
use crate::site;
use crate::types::ScrubOutcome;

/// Error type for service lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] ConfigError),
}

/// Digest collections and settings loaded from configuration.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub word_digests: DigestSet,
    pub site_digests: DigestSet,
    pub enabled: bool,
    pub max_ngram: usize,
    pub replacements: Vec<String>,
}

impl From<EngineConfig> for EngineState {
    fn from(config: EngineConfig) -> Self {
        Self {
            word_digests: config.word_set(),
            site_digests: config.site_set(),
            enabled: config.enabled,
            max_ngram: config.max_ngram,
            replacements: config.replacements,
        }
    }
}

/// The blocking facade used by the interceptor and the navigation gate.
pub struct BlockingDecisionService<P> {
    provider: P,
    digester: Box<dyn Digester + Send + Sync>,
    state: RwLock<Option<Arc<EngineState>>>,
}

impl<P: ConfigProvider> BlockingDecisionService<P> {
    /// Create an Uninitialized service using SHA-256.
    pub fn new(provider: P) -> Self {
        Self::with_digester(provider, Sha256Digester)
    }

    /// Create an Uninitialized service with a specific digester.
    pub fn with_digester<D>(provider: P, digester: D) -> Self
    where
        D: Digester + Send + Sync + 'static,
    {
        Self {
            provider,
            digester: Box::new(digester),
            state: RwLock::new(None),
        }
    }

    /// Load configuration and become Ready.
    ///
    /// On failure the previous state (Uninitialized on first call) is kept
    /// and the error is returned: the caller decides whether to retry or
    /// leave the feature inert.
    pub fn initialize(&self) -> Result<(), EngineError> {
        let state = self.load_state().map_err(|e| {
            log::error!("Blocking service failed to initialize: {}", e);
            e
        })?;
        log::info!(
            "Blocking service ready: {} word digests, {} site digests, enabled={}",
            state.word_digests.len(),
            state.site_digests.len(),
            state.enabled
        );
        self.swap(Some(Arc::new(state)));
        Ok(())
    }

    /// Re-read configuration and swap it in.
    ///
    /// On failure the previously loaded collections stay in effect.
    pub fn reload(&self) -> Result<(), EngineError> {
        match self.load_state() {
            Ok(state) => {
                log::debug!(
                    "Blocking service reloaded: {} word digests, {} site digests",
                    state.word_digests.len(),
                    state.site_digests.len()
                );
                self.swap(Some(Arc::new(state)));
                Ok(())
            }
            Err(e) => {
                log::warn!("Blocking service reload failed, keeping previous state: {}", e);
                Err(e)
            }
        }
    }

    /// Drop loaded state and return to Uninitialized.
    pub fn dispose(&self) {
        self.swap(None);
        log::info!("Blocking service disposed");
    }

    fn load_state(&self) -> Result<EngineState, EngineError> {
        let config = self.provider.load()?;
        config.validate()?;
        Ok(EngineState::from(config))
    }

    fn swap(&self, next: Option<Arc<EngineState>>) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }

    /// Current state, if Ready.
    pub fn snapshot(&self) -> Option<Arc<EngineState>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Current state, if Ready and enabled.
    fn active(&self) -> Option<Arc<EngineState>> {
        self.snapshot().filter(|state| state.enabled)
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.active().is_some()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Checks
    // =========================================================================

    /// Word-level check of `text` against the word digests.
    pub fn contains_blocked_word(&self, text: &str) -> bool {
        let Some(state) = self.active() else {
            return false;
        };

        match matcher::contains_blocked_word(&*self.digester, text, &state.word_digests) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("Word check failed open: {}", e);
                false
            }
        }
    }

    /// Navigation gate: domain alone, then domain + path + query.
    pub fn should_block_url(&self, url: &str) -> bool {
        match self.active() {
            Some(state) => site::is_navigation_blocked(&*self.digester, url, &state.site_digests),
            None => false,
        }
    }

    /// Cumulative per-segment site check.
    pub fn is_site_blocked(&self, url: &str) -> bool {
        match self.active() {
            Some(state) => site::is_site_blocked(&*self.digester, url, &state.site_digests),
            None => false,
        }
    }

    /// Redact blocked phrases using the configured replacement list.
    pub fn scrub(&self, text: &str) -> ScrubOutcome {
        let Some(state) = self.active() else {
            return ScrubOutcome::unchanged(text);
        };
        let mut source = CyclingReplacements::new(state.replacements.clone());
        self.scrub_state(&state, text, &mut source)
    }

    /// Redact blocked phrases, taking replacements from `source`.
    pub fn scrub_with(&self, text: &str, source: &mut dyn ReplacementSource) -> ScrubOutcome {
        match self.active() {
            Some(state) => self.scrub_state(&state, text, source),
            None => ScrubOutcome::unchanged(text),
        }
    }

    fn scrub_state<R>(&self, state: &EngineState, text: &str, source: &mut R) -> ScrubOutcome
    where
        R: ReplacementSource + ?Sized,
    {
        match scrub::scrub(&*self.digester, text, &state.word_digests, state.max_ngram, source) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Scrub failed open: {}", e);
                ScrubOutcome::unchanged(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfig;
    use crate::hash::digest_str;

    struct FailingProvider;

    impl ConfigProvider for FailingProvider {
        fn load(&self) -> Result<EngineConfig, ConfigError> {
            Err(ConfigError::Unavailable("storage offline".to_string()))
        }
    }

    fn config(words: &[&str], sites: &[&str]) -> EngineConfig {
        EngineConfig {
            word_digests: words.iter().map(|w| digest_str(w)).collect(),
            site_digests: sites.iter().map(|s| digest_str(s)).collect(),
            replacements: vec!["wellness".to_string()],
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_uninitialized_is_inert() {
        let service = BlockingDecisionService::new(StaticConfig::new(config(&["chair"], &["example.com"])));
        assert!(!service.is_ready());
        assert!(!service.contains_blocked_word("chair"));
        assert!(!service.should_block_url("https://example.com"));
        assert_eq!(service.scrub("chair").match_count, 0);
    }

    #[test]
    fn test_initialize_then_check() {
        let service = BlockingDecisionService::new(StaticConfig::new(config(&["chair"], &["example.com"])));
        service.initialize().unwrap();
        assert!(service.is_ready());
        assert!(service.contains_blocked_word("I sat on a chair"));
        let out = service.scrub("I sat on a chair");
        assert_eq!(out.text, "I sat on a wellness");
        assert_eq!(out.match_count, 1);
        assert!(service.should_block_url("https://example.com/anything"));
        assert!(!service.should_block_url("https://notexample.com"));
    }

    #[test]
    fn test_initialize_failure_propagates() {
        let service = BlockingDecisionService::new(FailingProvider);
        assert!(matches!(service.initialize(), Err(EngineError::ConfigLoad(_))));
        assert!(!service.is_ready());
        assert!(!service.contains_blocked_word("anything"));
    }

    #[test]
    fn test_disabled_is_inert() {
        let mut cfg = config(&["chair"], &["example.com"]);
        cfg.enabled = false;
        let service = BlockingDecisionService::new(StaticConfig::new(cfg));
        service.initialize().unwrap();
        assert!(service.is_ready());
        assert!(!service.is_enabled());
        assert!(!service.contains_blocked_word("chair"));
        assert!(!service.is_site_blocked("https://example.com"));
    }

    #[test]
    fn test_reload_swaps_state() {
        let service = BlockingDecisionService::new(StaticConfig::new(config(&["chair"], &[])));
        service.initialize().unwrap();
        let before = service.snapshot().unwrap();

        service.provider().set(config(&["table"], &[]));
        service.reload().unwrap();

        assert!(!service.contains_blocked_word("chair"));
        assert!(service.contains_blocked_word("table"));
        // A snapshot taken before the reload is unaffected.
        assert!(before.word_digests.contains(&digest_str("chair")));
    }

    #[test]
    fn test_dispose_returns_to_uninitialized() {
        let service = BlockingDecisionService::new(StaticConfig::new(config(&["chair"], &[])));
        service.initialize().unwrap();
        service.dispose();
        assert!(!service.is_ready());
        assert!(!service.contains_blocked_word("chair"));
    }

    #[test]
    fn test_scrub_with_custom_source() {
        let service = BlockingDecisionService::new(StaticConfig::new(config(&["chair"], &[])));
        service.initialize().unwrap();
        let mut source = || "stool".to_string();
        assert_eq!(service.scrub_with("a chair", &mut source).text, "a stool");
    }
}
