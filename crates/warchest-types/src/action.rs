//! The closed option sets a player chooses from each turn, and the risk
//! tier that scales what a successful attack transfers.
//!
//! All of these serialize as SCREAMING_SNAKE_CASE strings (`"RAID_CAMP"`,
//! `"IN_GAME"`-style), matching the stored document format. An unknown
//! string fails deserialization — there is no catch-all variant, so a
//! malformed action is rejected before it ever reaches the collector.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Resource categories
// ---------------------------------------------------------------------------

/// One of the three resource categories a player holds.
///
/// Every attack targets exactly one category and every defense protects
/// exactly one category; the pairing is fixed by [`AttackKind::target`]
/// and [`DefenseKind::protects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Gold,
    Military,
    Resources,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gold => write!(f, "gold"),
            Self::Military => write!(f, "military"),
            Self::Resources => write!(f, "resources"),
        }
    }
}

// ---------------------------------------------------------------------------
// Risk level
// ---------------------------------------------------------------------------

/// Configuration tier controlling the percentage of a resource transferred
/// on a successful attack. Chosen at room creation and frozen into the
/// match. The actual percentages live in the match rules, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

// ---------------------------------------------------------------------------
// Attack and defense kinds
// ---------------------------------------------------------------------------

/// The three attack options. Each targets one category of the opponent's
/// stockpile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackKind {
    /// Raids the opponent's camp — targets military.
    RaidCamp,
    /// Hijacks a supply line — targets resources.
    ResourceHijack,
    /// Breaks into the vault — targets gold.
    VaultBreak,
}

impl AttackKind {
    /// The opponent resource category this attack targets.
    pub fn target(self) -> ResourceKind {
        match self {
            Self::RaidCamp => ResourceKind::Military,
            Self::ResourceHijack => ResourceKind::Resources,
            Self::VaultBreak => ResourceKind::Gold,
        }
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RaidCamp => write!(f, "Raid Camp"),
            Self::ResourceHijack => write!(f, "Resource Hijack"),
            Self::VaultBreak => write!(f, "Vault Break"),
        }
    }
}

/// The three defense options. Each protects one category of the defender's
/// own stockpile for the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefenseKind {
    /// Barricades the troops — protects military.
    BarricadeTroops,
    /// Locks down storage — protects resources.
    SecureStorage,
    /// Posts a sentinel on the vault — protects gold.
    GoldSentinel,
}

impl DefenseKind {
    /// The own resource category this defense protects.
    pub fn protects(self) -> ResourceKind {
        match self {
            Self::BarricadeTroops => ResourceKind::Military,
            Self::SecureStorage => ResourceKind::Resources,
            Self::GoldSentinel => ResourceKind::Gold,
        }
    }
}

impl fmt::Display for DefenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BarricadeTroops => write!(f, "Barricade Troops"),
            Self::SecureStorage => write!(f, "Secure Storage"),
            Self::GoldSentinel => write!(f, "Gold Sentinel"),
        }
    }
}

// ---------------------------------------------------------------------------
// TurnAction
// ---------------------------------------------------------------------------

/// One player's sealed choice for a turn: one attack plus one defense.
///
/// Both fields are required by construction — there is no way to build a
/// half-submitted action. "Action absent" is modeled as
/// `Option<TurnAction>` on the player's match state, never as a partial
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnAction {
    pub attack: AttackKind,
    pub defense: DefenseKind,
}
