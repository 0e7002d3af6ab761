//! Built-in level catalog
//!
//! Levels only contribute an identifier and a timed duration to the core;
//! the names are presentation data for hosts.

use serde::{Deserialize, Serialize};

use crate::sim::Mode;

/// Opaque level identifier, echoed back in the completion signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(pub u32);

/// A playable level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub id: LevelId,
    /// Character the player controls
    pub player: &'static str,
    /// Character firing the beams
    pub opponent: &'static str,
    /// Name of the intercept move
    pub action: &'static str,
    /// Timed-mode length
    pub duration_sec: u32,
}

impl Level {
    pub const ALL: [Level; 3] = [
        Level {
            id: LevelId(1),
            player: "Belial",
            opponent: "Zero",
            action: "Leg Clip",
            duration_sec: 20,
        },
        Level {
            id: LevelId(2),
            player: "Zero",
            opponent: "Belial",
            action: "Shield Block",
            duration_sec: 30,
        },
        Level {
            id: LevelId(3),
            player: "Ace",
            opponent: "Belial",
            action: "Jump Dodge",
            duration_sec: 40,
        },
    ];

    pub fn by_id(id: LevelId) -> Option<Level> {
        Self::ALL.iter().copied().find(|l| l.id == id)
    }

    /// Session mode for this level: its timed duration, or endless
    pub fn mode(&self, endless: bool) -> Mode {
        if endless {
            Mode::Endless
        } else {
            Mode::Timed {
                duration_sec: self.duration_sec,
            }
        }
    }
}
