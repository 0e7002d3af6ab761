//! Beam Guard - a reaction-timing game core
//!
//! Core modules:
//! - `sim`: Deterministic session simulation (beams, spawner, hit/miss resolution, tick driver)
//! - `platform`: Clock sources (wall clock for hosts, manual clock for tests)
//! - `settings`: Data-driven timing and difficulty tuning
//! - `levels`: Built-in level catalog
//! - `error`: Crate error type

pub mod error;
pub mod levels;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use levels::{Level, LevelId};
pub use platform::{Clock, ManualClock, SystemClock};
pub use settings::Tuning;
pub use sim::{
    Beam, BeamId, Completion, HitResolution, Mode, ModeKind, Outcome, Phase, Session,
    SessionEvent, SessionSnapshot,
};

/// Timestamp or duration in milliseconds on the session clock
pub type Millis = u64;

/// Default tuning constants
pub mod consts {
    use crate::Millis;

    /// Half-width of the hit window around a beam's impact time
    pub const HIT_WINDOW_MS: Millis = 300;
    /// Time from spawn to impact
    pub const BEAM_TRAVEL_MS: Millis = 1500;
    /// Chance that a spawned beam is a decoy
    pub const DECOY_PROBABILITY: f64 = 0.20;

    /// Delay between entering Playing and the first spawn
    pub const INITIAL_SPAWN_DELAY_MS: Millis = 1000;
    /// Spawn interval bounds at difficulty 0
    pub const SPAWN_MIN_BASE_MS: Millis = 1500;
    pub const SPAWN_MAX_BASE_MS: Millis = 3000;
    /// Spawn interval bounds never drop below these
    pub const SPAWN_MIN_FLOOR_MS: Millis = 800;
    pub const SPAWN_MAX_FLOOR_MS: Millis = 1200;
    /// Bound tightening per difficulty step
    pub const SPAWN_MIN_STEP_MS: Millis = 100;
    pub const SPAWN_MAX_STEP_MS: Millis = 200;
    /// Score needed per difficulty step (endless only)
    pub const SCORE_PER_DIFFICULTY_STEP: u32 = 10;
    /// Highest difficulty step
    pub const DIFFICULTY_CAP: u32 = 5;

    /// Countdown starts here and shows every value down to 1
    pub const COUNTDOWN_FROM: u8 = 3;
    pub const COUNTDOWN_STEP_MS: Millis = 1000;
    /// Tick driver cadence (20 Hz)
    pub const TICK_MS: Millis = 50;
    /// Visual-only "acting" feedback duration
    pub const ACTING_FLAG_MS: Millis = 300;
}
