//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes from the host, never from the OS
//! - Injected RNG only
//! - Stable iteration order (by beam ID)
//! - No rendering, audio or storage dependencies

pub mod beam;
pub mod resolve;
pub mod schedule;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use beam::{Beam, BeamId, BeamRegistry};
pub use resolve::{HitResolution, HitVerdict, SweepResult, resolve, sweep};
pub use session::Session;
pub use spawner::{SpawnBounds, Spawner, difficulty_factor, spawn_bounds};
pub use state::{Completion, Mode, ModeKind, Outcome, Phase, SessionEvent, SessionSnapshot};
