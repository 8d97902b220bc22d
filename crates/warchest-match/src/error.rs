//! Error types for the match layer.

use warchest_profile::ProfileError;
use warchest_store::StoreError;
use warchest_types::{MatchId, PlayerId};

/// Errors that can occur during match operations.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The match does not exist.
    #[error("match {0} not found")]
    NotFound(MatchId),

    /// The operation is not valid in the match's current phase — the
    /// user-facing "not now" case.
    #[error("invalid match state for this operation: {0}")]
    State(String),

    /// The caller is not seated in this match.
    #[error("player {player} is not a participant of match {match_id}")]
    NotParticipant {
        player: PlayerId,
        match_id: MatchId,
    },

    /// The player already has a sealed action for the open turn. The
    /// repeat submission is rejected, never overwritten — informational,
    /// not fatal, and nothing changed.
    #[error("player {player} already submitted for turn {turn}")]
    AlreadySubmitted { player: PlayerId, turn: u32 },

    /// The match document is internally inconsistent (missing seat,
    /// missing action in `ProcessingTurn`). Fatal to the turn: the match
    /// is left in `ProcessingTurn` rather than advanced with bad data.
    #[error("corrupt match state: {0}")]
    Corrupt(String),

    /// A profile writeback failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// An underlying store failure (conflicts on the guarded transition
    /// are handled internally and never surface here).
    #[error(transparent)]
    Store(#[from] StoreError),
}
