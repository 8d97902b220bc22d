//! Error types for the profile layer.

use warchest_types::PlayerId;

use crate::StatKind;

/// Errors that can occur during identity resolution or profile operations.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The identity provider rejected the token.
    #[error("identity resolution failed: {0}")]
    IdentityRejected(String),

    /// No profile exists for the given player.
    #[error("profile not found for player {0}")]
    NotFound(PlayerId),

    /// The stat is already at the configured maximum level.
    #[error("player {player} already has {stat} at max level {max}")]
    MaxLevel {
        player: PlayerId,
        stat: StatKind,
        max: u8,
    },

    /// The profile cannot afford the upgrade. The deduction did not happen.
    #[error("upgrade costs {needed} gold but player {player} has {available}")]
    InsufficientFunds {
        player: PlayerId,
        needed: u32,
        available: u32,
    },
}
