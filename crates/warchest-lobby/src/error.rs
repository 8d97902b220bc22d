//! Error types for the lobby layer.

use warchest_store::StoreError;
use warchest_types::RoomId;

/// Errors that can occur during room operations.
///
/// Every variant is a clean rejection — no lobby operation leaves a room
/// partially mutated, so callers may always retry.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// Malformed input (empty public room name, over-long name, …).
    #[error("invalid input: {0}")]
    Validation(String),

    /// The room does not exist (or no longer exists).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is in a state that doesn't allow this operation —
    /// the user-facing "not now" case (room full, already in game, …).
    #[error("invalid room state for this operation: {0}")]
    State(String),

    /// The caller lacks the rights for this operation (e.g. deleting a
    /// room they didn't create, joining a private room without the code).
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// An underlying store failure that isn't resolved by the lobby's
    /// own re-read-and-retry (conflicts are retried internally).
    #[error(transparent)]
    Store(#[from] StoreError),
}
