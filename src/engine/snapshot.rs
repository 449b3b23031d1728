//! Latest-value parameter hand-off.
//!
//! One slot per effect kind. Publishing replaces whatever the slot held, so
//! the audio thread always sees the newest complete snapshot and a burst of
//! updates can never back up behind each other.
//!
//! ```text
//!  control thread                         audio thread
//!  ──────────────                         ────────────
//!  publish(params) ──▶ [ slot per kind ] ──▶ SnapshotReader::take(kind)
//!                       (ArcSwap, whole       Some(params) once per new
//!                        snapshot swapped)    generation, else None
//! ```
//!
//! The reader only ever loads and copies; it never allocates. The old
//! snapshot is normally freed by the publishing thread.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use arc_swap::ArcSwap;

use crate::params::{EffectKind, EffectParameters};

#[derive(Debug)]
struct Published {
    params: EffectParameters,
    /// 0 means "never published".
    generation: u64,
}

#[derive(Debug)]
pub struct ParameterSlots {
    slots: [ArcSwap<Published>; 5],
    generation: AtomicU64,
}

impl ParameterSlots {
    pub fn new() -> Self {
        Self {
            slots: EffectKind::ALL.map(|kind| {
                ArcSwap::from_pointee(Published {
                    params: EffectParameters::defaults(kind),
                    generation: 0,
                })
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the snapshot for `params.kind()`. Never blocks and never
    /// fails. Allocates; call off the audio thread.
    pub fn publish(&self, params: EffectParameters) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.slots[params.kind().index()].store(Arc::new(Published {
            params: params.sanitized(),
            generation,
        }));
    }

    /// The snapshot currently held for `kind`, published or not.
    pub fn current(&self, kind: EffectKind) -> EffectParameters {
        self.slots[kind.index()].load().params
    }
}

impl Default for ParameterSlots {
    fn default() -> Self {
        Self::new()
    }
}

/// Audio-side view of [`ParameterSlots`] that remembers what it has
/// already consumed.
#[derive(Debug)]
pub struct SnapshotReader {
    slots: Arc<ParameterSlots>,
    seen: [u64; 5],
}

impl SnapshotReader {
    pub fn new(slots: Arc<ParameterSlots>) -> Self {
        Self { slots, seen: [0; 5] }
    }

    /// The newest snapshot for `kind` if one was published since the last
    /// call, otherwise `None`. Lock-free.
    pub fn take(&mut self, kind: EffectKind) -> Option<EffectParameters> {
        let index = kind.index();
        let published = self.slots.slots[index].load();
        if published.generation > self.seen[index] {
            self.seen[index] = published.generation;
            Some(published.params)
        } else {
            None
        }
    }
}
