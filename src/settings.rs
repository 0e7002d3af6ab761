//! Timing and difficulty tuning
//!
//! Every field has a default (see `crate::consts`), so a tuning file only needs
//! the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::consts::*;
use crate::error::{Error, Result};

/// Upper bound for every duration field (one hour)
pub const MAX_DURATION_MS: Millis = 60 * 60 * 1000;

/// Session tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Beams ===
    /// Half-width of the hit window around impact
    pub hit_window_ms: Millis,
    /// Spawn to impact
    pub travel_ms: Millis,
    /// Probability (0.0 - 1.0) that a spawned beam is a decoy
    pub decoy_probability: f64,

    // === Spawn pacing ===
    pub initial_spawn_delay_ms: Millis,
    pub spawn_min_base_ms: Millis,
    pub spawn_max_base_ms: Millis,
    pub spawn_min_floor_ms: Millis,
    pub spawn_max_floor_ms: Millis,
    pub spawn_min_step_ms: Millis,
    pub spawn_max_step_ms: Millis,

    // === Difficulty (endless only) ===
    pub score_per_difficulty_step: u32,
    pub difficulty_cap: u32,

    // === Session timers ===
    pub countdown_from: u8,
    pub countdown_step_ms: Millis,
    pub tick_ms: Millis,
    pub acting_flag_ms: Millis,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            hit_window_ms: HIT_WINDOW_MS,
            travel_ms: BEAM_TRAVEL_MS,
            decoy_probability: DECOY_PROBABILITY,

            initial_spawn_delay_ms: INITIAL_SPAWN_DELAY_MS,
            spawn_min_base_ms: SPAWN_MIN_BASE_MS,
            spawn_max_base_ms: SPAWN_MAX_BASE_MS,
            spawn_min_floor_ms: SPAWN_MIN_FLOOR_MS,
            spawn_max_floor_ms: SPAWN_MAX_FLOOR_MS,
            spawn_min_step_ms: SPAWN_MIN_STEP_MS,
            spawn_max_step_ms: SPAWN_MAX_STEP_MS,

            score_per_difficulty_step: SCORE_PER_DIFFICULTY_STEP,
            difficulty_cap: DIFFICULTY_CAP,

            countdown_from: COUNTDOWN_FROM,
            countdown_step_ms: COUNTDOWN_STEP_MS,
            tick_ms: TICK_MS,
            acting_flag_ms: ACTING_FLAG_MS,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the scheduler cannot run with
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: &str| Err(Error::InvalidTuning(reason.to_string()));

        let durations = [
            ("hit_window_ms", self.hit_window_ms),
            ("travel_ms", self.travel_ms),
            ("initial_spawn_delay_ms", self.initial_spawn_delay_ms),
            ("spawn_min_base_ms", self.spawn_min_base_ms),
            ("spawn_max_base_ms", self.spawn_max_base_ms),
            ("spawn_min_floor_ms", self.spawn_min_floor_ms),
            ("spawn_max_floor_ms", self.spawn_max_floor_ms),
            ("spawn_min_step_ms", self.spawn_min_step_ms),
            ("spawn_max_step_ms", self.spawn_max_step_ms),
            ("countdown_step_ms", self.countdown_step_ms),
            ("tick_ms", self.tick_ms),
            ("acting_flag_ms", self.acting_flag_ms),
        ];
        for (name, value) in durations {
            if value > MAX_DURATION_MS {
                return Err(Error::InvalidTuning(format!(
                    "{name} must be at most {MAX_DURATION_MS}ms"
                )));
            }
        }

        if self.tick_ms == 0 {
            return fail("tick_ms must be positive");
        }
        if self.countdown_step_ms == 0 {
            return fail("countdown_step_ms must be positive");
        }
        if self.countdown_from == 0 {
            return fail("countdown_from must be at least 1");
        }
        if self.travel_ms == 0 {
            return fail("travel_ms must be positive");
        }
        if !(0.0..=1.0).contains(&self.decoy_probability) {
            return fail("decoy_probability must be within 0.0..=1.0");
        }
        if self.score_per_difficulty_step == 0 {
            return fail("score_per_difficulty_step must be positive");
        }
        if self.spawn_min_base_ms > self.spawn_max_base_ms {
            return fail("spawn_min_base_ms exceeds spawn_max_base_ms");
        }
        if self.spawn_min_floor_ms > self.spawn_max_floor_ms {
            return fail("spawn_min_floor_ms exceeds spawn_max_floor_ms");
        }
        Ok(())
    }
}
