//! The pre-match lobby document and its status machine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{MatchId, PlayerId, RiskLevel, RoomId};

/// Fixed room capacity — the game shape is exactly two players.
pub const ROOM_CAPACITY: usize = 2;

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a room.
///
/// The set follows the live page logic (`WAITING`/`IN_GAME`/`CLOSED`/
/// `ABORTED`); the stale type-level `FULL` status is intentionally not
/// modeled. Permitted transitions:
///
/// ```text
/// Waiting → InGame → Closed
/// Waiting → Closed            (creator deletes before start)
/// Waiting → Aborted           (a player abandons the lobby)
/// ```
///
/// `Closed` and `Aborted` are terminal. Anything outside this table is
/// rejected by [`RoomStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Waiting,
    InGame,
    Closed,
    Aborted,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Aborted)
    }

    /// Returns `true` if transitioning to `target` is permitted.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::InGame)
                | (Self::Waiting, Self::Closed)
                | (Self::Waiting, Self::Aborted)
                | (Self::InGame, Self::Closed)
        )
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "WAITING"),
            Self::InGame => write!(f, "IN_GAME"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Aborted => write!(f, "ABORTED"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomDoc
// ---------------------------------------------------------------------------

/// The lobby document for one room.
///
/// Invariants maintained by the lobby service (all mutations go through
/// compare-and-swap, so these hold at every observable version):
/// - `players.len() <= ROOM_CAPACITY`
/// - the creator is always `players[0]`
/// - `status == InGame` implies `match_id.is_some()`
/// - membership is frozen once `InGame`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDoc {
    pub id: RoomId,
    /// Display name. May be empty for private rooms; required for public.
    pub name: String,
    pub risk: RiskLevel,
    pub is_public: bool,
    pub creator: PlayerId,
    /// Joined players in entry order. Creator first.
    pub players: Vec<PlayerId>,
    pub status: RoomStatus,
    /// Set when the room transitions to `InGame`.
    pub match_id: Option<MatchId>,
    /// Player id → display name, for rendering the lobby roster.
    pub display_names: BTreeMap<PlayerId, String>,
    /// Random hex code required to join a private room. `None` for public.
    pub invite_code: Option<String>,
    /// Unix milliseconds.
    pub created_at: u64,
}

impl RoomDoc {
    /// Returns `true` if the player has joined this room.
    pub fn is_member(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    /// Returns `true` if every seat is taken.
    pub fn is_full(&self) -> bool {
        self.players.len() >= ROOM_CAPACITY
    }

    /// Display name of a member, if known.
    pub fn display_name_of(&self, player: PlayerId) -> Option<&str> {
        self.display_names.get(&player).map(String::as_str)
    }
}
