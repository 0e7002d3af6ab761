//! Beam spawner and difficulty scaling
//!
//! Spawns are paced by a random interval between `min_delay` and `max_delay`.
//! In endless mode both bounds shrink as the score grows, clamped to their
//! floors; timed mode always uses the base bounds.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::beam::{Beam, BeamRegistry};
use super::state::Mode;
use crate::Millis;
use crate::settings::Tuning;

/// Interval bounds for the next spawn (upper bound exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnBounds {
    pub min_delay: Millis,
    pub max_delay: Millis,
}

/// Score-derived difficulty step, always 0 outside endless mode
pub fn difficulty_factor(score: u32, mode: Mode, tuning: &Tuning) -> u32 {
    match mode {
        Mode::Endless => (score / tuning.score_per_difficulty_step).min(tuning.difficulty_cap),
        Mode::Timed { .. } => 0,
    }
}

/// Spawn interval bounds for a difficulty step
pub fn spawn_bounds(factor: u32, tuning: &Tuning) -> SpawnBounds {
    let factor = Millis::from(factor);
    let min_delay = tuning
        .spawn_min_base_ms
        .saturating_sub(factor.saturating_mul(tuning.spawn_min_step_ms))
        .max(tuning.spawn_min_floor_ms);
    let max_delay = tuning
        .spawn_max_base_ms
        .saturating_sub(factor.saturating_mul(tuning.spawn_max_step_ms))
        .max(tuning.spawn_max_floor_ms);
    SpawnBounds {
        min_delay,
        max_delay,
    }
}

/// Decides when the next beam appears
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    next_spawn_at: Millis,
}

impl Spawner {
    /// Arm the spawner for a session that entered Playing at `started_at`
    pub fn new(started_at: Millis, tuning: &Tuning) -> Self {
        Self {
            next_spawn_at: started_at + tuning.initial_spawn_delay_ms,
        }
    }

    pub fn next_spawn_at(&self) -> Millis {
        self.next_spawn_at
    }

    /// Spawn at most one beam if it is due, then schedule the next one
    pub fn poll<R: Rng>(
        &mut self,
        now: Millis,
        score: u32,
        mode: Mode,
        tuning: &Tuning,
        rng: &mut R,
        registry: &mut BeamRegistry,
    ) -> Option<Beam> {
        if now < self.next_spawn_at {
            return None;
        }

        let decoy = rng.random::<f64>() < tuning.decoy_probability;
        let beam = Beam {
            id: registry.next_beam_id(),
            spawn_at: now,
            travel_ms: tuning.travel_ms,
            decoy,
        };
        registry.add(beam);

        let bounds = spawn_bounds(difficulty_factor(score, mode, tuning), tuning);
        let delay = if bounds.max_delay > bounds.min_delay {
            rng.random_range(bounds.min_delay..bounds.max_delay)
        } else {
            bounds.min_delay
        };
        self.next_spawn_at = now + delay;

        log::debug!(
            "Spawned beam {} (decoy={}) at {}ms, next in {}ms",
            beam.id.0,
            decoy,
            now,
            delay
        );
        Some(beam)
    }
}
