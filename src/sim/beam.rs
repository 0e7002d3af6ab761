//! Beams and the active-beam registry
//!
//! The registry is the only owner of live beams. Removing a beam is how the
//! hit resolver or the miss sweeper claims it, so whichever removes it first
//! wins and the other simply finds it gone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Millis;

/// Beam identifier, allocated in increasing order and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeamId(pub u64);

/// A beam travelling toward the target zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beam {
    pub id: BeamId,
    /// Session time the beam was spawned
    pub spawn_at: Millis,
    /// Spawn to impact
    pub travel_ms: Millis,
    /// Decoys never score and are harmless when missed
    pub decoy: bool,
}

impl Beam {
    #[inline]
    pub fn impact_at(&self) -> Millis {
        self.spawn_at.saturating_add(self.travel_ms)
    }

    /// Inclusive window in which an action intercepts this beam
    #[inline]
    pub fn in_window(&self, now: Millis, hit_window_ms: Millis) -> bool {
        let impact = self.impact_at();
        let closes = impact.saturating_add(hit_window_ms);
        now >= impact.saturating_sub(hit_window_ms) && now <= closes
    }

    /// True once the window has fully closed
    #[inline]
    pub fn expired(&self, now: Millis, hit_window_ms: Millis) -> bool {
        now > self.impact_at().saturating_add(hit_window_ms)
    }

    /// Progress from spawn (0.0) to impact (1.0), for hosts animating beams
    pub fn progress(&self, now: Millis) -> f32 {
        let travelled = now.saturating_sub(self.spawn_at) as f32;
        (travelled / self.travel_ms as f32).min(1.0)
    }
}

/// Active beams keyed by id (iteration is in id order)
#[derive(Debug, Clone, Default)]
pub struct BeamRegistry {
    beams: BTreeMap<BeamId, Beam>,
    /// Next id to hand out; survives `clear`
    next_id: u64,
}

impl BeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh beam id
    pub fn next_beam_id(&mut self) -> BeamId {
        self.next_id += 1;
        BeamId(self.next_id)
    }

    /// Insert a beam. Ids come from `next_beam_id`, so a duplicate is a bug.
    pub fn add(&mut self, beam: Beam) {
        let previous = self.beams.insert(beam.id, beam);
        debug_assert!(previous.is_none(), "duplicate beam id {:?}", beam.id);
    }

    /// Claim a beam. Returns `None` if it was already removed.
    pub fn remove(&mut self, id: BeamId) -> Option<Beam> {
        self.beams.remove(&id)
    }

    /// Read-only copy of the active beams, ordered by id
    pub fn snapshot(&self) -> Vec<Beam> {
        self.beams.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Beam> {
        self.beams.values()
    }

    pub fn contains(&self, id: BeamId) -> bool {
        self.beams.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.beams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    /// Drop every active beam (id allocation continues)
    pub fn clear(&mut self) {
        self.beams.clear();
    }
}
