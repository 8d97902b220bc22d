//! The persistent profile record.

use std::fmt;

use warchest_types::{PlayerId, Stockpile};

/// Which stat an upgrade targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Attack,
    Defense,
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::Defense => write!(f, "defense"),
        }
    }
}

/// A player's cross-match account state.
///
/// Matches snapshot these values at start and only write back on
/// termination (win/loss counters, recovery progress). The in-match
/// stockpile is a separate copy — losing a match never drains the
/// persistent economy below what the match-end writeback applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub player_id: PlayerId,
    pub display_name: String,
    /// Persistent economy (distinct from any in-match snapshot).
    pub stockpile: Stockpile,
    pub attack_level: u8,
    pub defense_level: u8,
    pub wins: u32,
    pub losses: u32,
    /// While set, the player is restricted to training matches.
    pub recovery_mode: bool,
    /// Finished matches accumulated toward exiting recovery mode.
    pub recovery_progress: u32,
}

impl PlayerProfile {
    /// Level of the given stat.
    pub fn level(&self, stat: StatKind) -> u8 {
        match stat {
            StatKind::Attack => self.attack_level,
            StatKind::Defense => self.defense_level,
        }
    }

    pub(crate) fn level_mut(&mut self, stat: StatKind) -> &mut u8 {
        match stat {
            StatKind::Attack => &mut self.attack_level,
            StatKind::Defense => &mut self.defense_level,
        }
    }
}
