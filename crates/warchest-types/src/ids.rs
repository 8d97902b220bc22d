//! Identity newtypes.
//!
//! Each entity gets its own wrapper around `u64` so a `RoomId` can never be
//! passed where a `PlayerId` is expected. `#[serde(transparent)]` keeps the
//! stored form a plain number (`PlayerId(42)` → `42`), which is what the
//! document store and any client SDK expect.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a player.
///
/// Issued by the identity provider; the core trusts it without further
/// verification. Ordered so it can key a `BTreeMap` (turn results store
/// per-player data in deterministic order).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a pre-match lobby room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// A unique identifier for an active match.
///
/// By convention the match allocated for a room reuses the room's numeric
/// id ([`MatchId::for_room`]), so a client holding a room id can navigate
/// straight to the match document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl MatchId {
    /// The match id conventionally linked to a room.
    pub fn for_room(room: RoomId) -> Self {
        Self(room.0)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_deserializes_from_plain_number() {
        let pid: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(pid, PlayerId(42));
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(RoomId(3).to_string(), "R-3");
        assert_eq!(MatchId(3).to_string(), "M-3");
    }

    #[test]
    fn test_match_id_for_room_reuses_numeric_id() {
        assert_eq!(MatchId::for_room(RoomId(99)), MatchId(99));
    }
}
