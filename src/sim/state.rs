//! Session phases, modes, events and snapshots
//!
//! Everything a host can observe about a session lives here.

use serde::{Deserialize, Serialize};

use super::beam::{Beam, BeamId};
use crate::Millis;
use crate::levels::LevelId;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing started yet (or reset)
    #[default]
    Idle,
    /// Counting down before play
    Countdown,
    /// Beams are live
    Playing,
    /// Timed session survived to the end
    Victory,
    /// Fatal miss or false action
    GameOver,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Victory | Phase::GameOver)
    }
}

/// Session length policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Survive `duration_sec` to win
    Timed { duration_sec: u32 },
    /// Play until the first failure; the score is the result
    Endless,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Timed { .. } => ModeKind::Timed,
            Mode::Endless => ModeKind::Endless,
        }
    }

    /// Session length, if timed
    pub fn duration_ms(&self) -> Option<Millis> {
        match self {
            Mode::Timed { duration_sec } => Some(Millis::from(*duration_sec) * 1000),
            Mode::Endless => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeKind {
    Timed,
    Endless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    GameOver,
}

/// Completion signal, emitted once per terminal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub level: LevelId,
    pub outcome: Outcome,
    pub score: u32,
    pub mode: ModeKind,
    /// Time spent in Playing
    pub elapsed_ms: Millis,
}

/// Things that happened, in order, since the host last drained events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Countdown shows `value` (3, 2, 1 by default)
    Countdown { value: u8 },
    PlayingStarted { at: Millis },
    BeamSpawned { beam: Beam },
    /// Real beam intercepted
    BeamHit { id: BeamId, at: Millis },
    /// Decoy intercepted, no effect
    DecoyAbsorbed { id: BeamId, at: Millis },
    /// Action with nothing in range
    FalseAction { at: Millis },
    /// Real beam expired unresolved
    BeamMissed { id: BeamId, at: Millis },
    /// Decoy expired, no effect
    DecoyExpired { id: BeamId, at: Millis },
    Completed(Completion),
}

/// Read-only view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub level: Option<LevelId>,
    pub mode: Option<Mode>,
    /// Meaningful only during Countdown
    pub countdown: u8,
    pub elapsed_ms: Millis,
    /// Timed mode only
    pub remaining_ms: Option<Millis>,
    pub score: u32,
    pub beams: Vec<Beam>,
    /// Visual feedback only
    pub acting: bool,
    /// Latest time the session has observed
    pub now: Millis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_duration() {
        assert_eq!(Mode::Timed { duration_sec: 20 }.duration_ms(), Some(20_000));
        assert_eq!(Mode::Endless.duration_ms(), None);
        assert_eq!(Mode::Endless.kind(), ModeKind::Endless);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(Phase::Victory.is_terminal());
        assert!(Phase::GameOver.is_terminal());
        assert!(!Phase::Playing.is_terminal());
        assert!(!Phase::Idle.is_terminal());
    }
}
