//! Profile configuration: starting economy, upgrade costs, recovery rules.
//!
//! All balancing values live here, externally supplied — nothing in the
//! store logic hardcodes a number.

use warchest_types::Stockpile;

/// Cost table and cap for attack/defense stat upgrades.
#[derive(Debug, Clone)]
pub struct UpgradeRules {
    /// Gold cost to reach level N, indexed by `cost_to_reach[N - 2]`
    /// (level 1 is free at creation). Length must be `max_level - 1`.
    pub cost_to_reach: Vec<u32>,
    /// Highest attainable level.
    pub max_level: u8,
}

impl Default for UpgradeRules {
    fn default() -> Self {
        Self {
            // Level 2 costs 50 gold, level 3 costs 120.
            cost_to_reach: vec![50, 120],
            max_level: 3,
        }
    }
}

impl UpgradeRules {
    /// Gold cost to move from `current` to `current + 1`, or `None` if
    /// `current` is already at (or beyond) the cap.
    pub fn cost_for_next(&self, current: u8) -> Option<u32> {
        if current >= self.max_level {
            return None;
        }
        // current = 1 → index 0 (cost of level 2), etc.
        self.cost_to_reach.get(current as usize - 1).copied()
    }
}

/// Recovery-mode progression: how many finished matches a player in
/// recovery must complete before the restriction lifts.
#[derive(Debug, Clone)]
pub struct RecoveryRules {
    pub matches_to_exit: u32,
}

impl Default for RecoveryRules {
    fn default() -> Self {
        Self { matches_to_exit: 3 }
    }
}

/// Full configuration for the profile store.
#[derive(Debug, Clone, Default)]
pub struct ProfileConfig {
    pub upgrade: UpgradeRules,
    pub recovery: RecoveryRules,
    /// Economy granted to a brand-new profile.
    pub starting: StartingEconomy,
}

/// Starting holdings and levels for a new profile.
#[derive(Debug, Clone)]
pub struct StartingEconomy {
    pub stockpile: Stockpile,
    pub attack_level: u8,
    pub defense_level: u8,
}

impl Default for StartingEconomy {
    fn default() -> Self {
        Self {
            stockpile: Stockpile::uniform(100),
            attack_level: 1,
            defense_level: 1,
        }
    }
}
