//! Input Interceptor
//!
//! Watches editable surfaces and rewrites their text in place when a blocked
//! word appears. The platform side (DOM elements in the browser) implements
//! [`EditableSurface`]; this module owns the attach registry and the rewrite
//! rules:
//!
//! 1. Read the surface text. Skip it if it is the text this interceptor just
//!    wrote (one suppressed pass per write).
//! 2. Word-level check; nothing to do on a miss.
//! 3. Scrub. Nothing to do if the text is unchanged.
//! 4. Re-read the surface and drop the rewrite if the text moved on since
//!    step 1 or a newer event arrived.
//! 5. Write, shift the caret by the length change, remember the written
//!    text, and emit synthetic change notifications.
//!
//! Notifications raised synchronously by step 5 cannot reach the interceptor
//! while `commit` holds it; the platform side drops them (the wasm bindings do
//! so when the interceptor is already borrowed).
//!
//! Caret positions are in UTF-16 code units, matching DOM selection offsets.

use crate::config::ConfigProvider;
use crate::service::BlockingDecisionService;
use crate::types::{EditEvent, ScrubOutcome};

// =============================================================================
// Surfaces
// =============================================================================

/// An editable text surface on a page.
pub trait EditableSurface {
    /// Current text content.
    fn text(&self) -> String;

    /// Replace the text content.
    ///
    /// Returns `false`, writing nothing, when the surface cannot take `text`
    /// without losing its structure.
    fn set_text(&mut self, text: &str) -> bool;

    /// Caret offset in UTF-16 units, if the surface has one.
    fn caret(&self) -> Option<usize>;

    fn set_caret(&mut self, caret: usize);

    /// Emit synthetic edit notifications for other observers.
    fn notify_changed(&mut self);

    /// Identity comparison; two handles to the same node are the same surface.
    fn is_same_surface(&self, other: &Self) -> bool;
}

/// The checks the interceptor needs from the engine.
pub trait TextFilter {
    fn contains_blocked_word(&self, text: &str) -> bool;
    fn scrub(&self, text: &str) -> ScrubOutcome;
}

impl<P: ConfigProvider> TextFilter for BlockingDecisionService<P> {
    fn contains_blocked_word(&self, text: &str) -> bool {
        BlockingDecisionService::contains_blocked_word(self, text)
    }

    fn scrub(&self, text: &str) -> ScrubOutcome {
        BlockingDecisionService::scrub(self, text)
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Stable handle to an attached surface.
///
/// The generation makes handles to detached surfaces go stale instead of
/// aliasing whatever reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId {
    index: u32,
    generation: u32,
}

/// Per-surface interceptor state.
#[derive(Debug)]
pub struct SurfaceEntry<S> {
    pub surface: S,
    /// Bumped on every event; a pending rewrite from an older event is stale.
    edit_seq: u64,
    /// Text of the last rewrite, consumed by the next event.
    just_wrote: Option<String>,
}

#[derive(Debug)]
struct Slot<S> {
    generation: u32,
    entry: Option<SurfaceEntry<S>>,
}

/// Arena of attached surfaces keyed by node identity.
#[derive(Debug)]
pub struct SurfaceRegistry<S> {
    slots: Vec<Slot<S>>,
    free: Vec<u32>,
    len: usize,
}

impl<S> Default for SurfaceRegistry<S> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<S: EditableSurface> SurfaceRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of an already attached surface.
    pub fn find(&self, surface: &S) -> Option<SurfaceId> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .filter(|entry| entry.surface.is_same_surface(surface))
                .map(|_| SurfaceId {
                    index: index as u32,
                    generation: slot.generation,
                })
        })
    }

    /// Attach `surface` unless it is already attached.
    ///
    /// Returns the handle and whether the surface was newly attached.
    pub fn attach(&mut self, surface: S) -> (SurfaceId, bool) {
        if let Some(id) = self.find(&surface) {
            return (id, false);
        }

        let entry = SurfaceEntry {
            surface,
            edit_seq: 0,
            just_wrote: None,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].entry = Some(entry);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.len += 1;

        let generation = self.slots[index as usize].generation;
        (SurfaceId { index, generation }, true)
    }

    /// Remove a surface; its handle goes stale.
    pub fn detach(&mut self, id: SurfaceId) -> Option<S> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(entry.surface)
    }

    /// Detach every surface for which `keep` returns false.
    pub fn retain<F: FnMut(&S) -> bool>(&mut self, mut keep: F) -> usize {
        let doomed: Vec<SurfaceId> = self
            .iter()
            .filter(|(_, surface)| !keep(*surface))
            .map(|(id, _)| id)
            .collect();
        for id in &doomed {
            self.detach(*id);
        }
        doomed.len()
    }

    pub fn get(&self, id: SurfaceId) -> Option<&SurfaceEntry<S>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut SurfaceEntry<S>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &S)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry.as_ref().map(|entry| {
                (
                    SurfaceId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    &entry.surface,
                )
            })
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Detach everything. Outstanding handles go stale.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.len = 0;
    }
}

// =============================================================================
// Interceptor
// =============================================================================

/// Result of handling one edit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptOutcome {
    /// The handle does not refer to an attached surface.
    Detached,
    /// The event came from this interceptor's own write.
    Suppressed,
    /// Nothing blocked in the text.
    Clean,
    /// A word matched but scrubbing produced identical text.
    Unchanged,
    /// The surface refused the redacted text; it is left as typed.
    Unwritable,
    /// The surface changed before the rewrite could be applied.
    Stale,
    /// The surface was rewritten.
    Rewritten {
        match_count: usize,
        caret: Option<usize>,
    },
}

/// A computed rewrite waiting to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRewrite {
    id: SurfaceId,
    edit_seq: u64,
    pub original: String,
    pub redacted: String,
    pub match_count: usize,
    pub caret: Option<usize>,
}

/// First phase of handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prepared {
    Rewrite(PendingRewrite),
    Skip(InterceptOutcome),
}

/// Attaches to editable surfaces and scrubs them as they are edited.
#[derive(Debug)]
pub struct InputInterceptor<S> {
    registry: SurfaceRegistry<S>,
    events: EditEvent,
}

impl<S: EditableSurface> Default for InputInterceptor<S> {
    fn default() -> Self {
        Self::new(EditEvent::ALL)
    }
}

impl<S: EditableSurface> InputInterceptor<S> {
    /// Interceptor reacting to the given event kinds.
    pub fn new(events: EditEvent) -> Self {
        Self {
            registry: SurfaceRegistry::new(),
            events,
        }
    }

    /// Event kinds this interceptor listens for.
    pub fn events(&self) -> EditEvent {
        self.events
    }

    /// Attach at most once per surface.
    pub fn attach(&mut self, surface: S) -> (SurfaceId, bool) {
        self.registry.attach(surface)
    }

    pub fn detach(&mut self, id: SurfaceId) -> Option<S> {
        self.registry.detach(id)
    }

    pub fn find(&self, surface: &S) -> Option<SurfaceId> {
        self.registry.find(surface)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&S> {
        self.registry.get(id).map(|entry| &entry.surface)
    }

    pub fn registry(&self) -> &SurfaceRegistry<S> {
        &self.registry
    }

    /// Detach surfaces that are gone from the page.
    pub fn prune<F: FnMut(&S) -> bool>(&mut self, keep: F) -> usize {
        self.registry.retain(keep)
    }

    /// Detach everything.
    pub fn dispose(&mut self) {
        self.registry.clear();
    }

    /// Handle an edit event synchronously.
    pub fn handle_event<F>(&mut self, id: SurfaceId, event: EditEvent, filter: &F) -> InterceptOutcome
    where
        F: TextFilter + ?Sized,
    {
        match self.prepare(id, event, filter) {
            Prepared::Rewrite(pending) => self.commit(pending),
            Prepared::Skip(outcome) => outcome,
        }
    }

    /// Read, check, and scrub without touching the surface.
    pub fn prepare<F>(&mut self, id: SurfaceId, event: EditEvent, filter: &F) -> Prepared
    where
        F: TextFilter + ?Sized,
    {
        let Some(entry) = self.registry.get_mut(id) else {
            return Prepared::Skip(InterceptOutcome::Detached);
        };

        if !self.events.intersects(event) {
            return Prepared::Skip(InterceptOutcome::Clean);
        }

        entry.edit_seq += 1;

        let text = entry.surface.text();
        if let Some(marker) = entry.just_wrote.take() {
            if marker == text {
                log::trace!("Suppressing event caused by own rewrite");
                return Prepared::Skip(InterceptOutcome::Suppressed);
            }
        }

        if !filter.contains_blocked_word(&text) {
            return Prepared::Skip(InterceptOutcome::Clean);
        }

        let outcome = filter.scrub(&text);
        if outcome.text == text {
            return Prepared::Skip(InterceptOutcome::Unchanged);
        }

        Prepared::Rewrite(PendingRewrite {
            id,
            edit_seq: entry.edit_seq,
            caret: entry.surface.caret(),
            original: text,
            redacted: outcome.text,
            match_count: outcome.match_count,
        })
    }

    /// Apply a rewrite if the surface has not moved on.
    pub fn commit(&mut self, pending: PendingRewrite) -> InterceptOutcome {
        let Some(entry) = self.registry.get_mut(pending.id) else {
            return InterceptOutcome::Detached;
        };

        if entry.edit_seq != pending.edit_seq || entry.surface.text() != pending.original {
            log::debug!("Dropping stale rewrite");
            return InterceptOutcome::Stale;
        }

        if !entry.surface.set_text(&pending.redacted) {
            log::debug!("Surface refused rewrite of {} match(es)", pending.match_count);
            return InterceptOutcome::Unwritable;
        }

        let caret = pending
            .caret
            .map(|old| shift_caret(old, &pending.original, &pending.redacted));
        if let Some(caret) = caret {
            entry.surface.set_caret(caret);
        }

        entry.just_wrote = Some(pending.redacted);
        entry.surface.notify_changed();

        log::debug!("Rewrote surface: {} match(es)", pending.match_count);
        InterceptOutcome::Rewritten {
            match_count: pending.match_count,
            caret,
        }
    }
}

/// Move `old` by the UTF-16 length change, clamped to the new text.
pub fn shift_caret(old: usize, original: &str, redacted: &str) -> usize {
    let old_len = original.encode_utf16().count() as i64;
    let new_len = redacted.encode_utf16().count() as i64;
    let shifted = old as i64 + (new_len - old_len);
    shifted.clamp(0, new_len) as usize
}
