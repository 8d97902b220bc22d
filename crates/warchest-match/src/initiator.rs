//! Match initiation: turning a full room into a match document.
//!
//! The initiator snapshots each player's *current* profile stats into the
//! match — gold, military, resources, attack/defense level — so the match
//! economy is fully decoupled from the persistent one until the match-end
//! writeback.

use warchest_profile::PlayerProfile;
use warchest_types::{MatchDoc, MatchId, MatchStatus, PlayerMatchState, RoomDoc};

use crate::MatchRules;

/// Builds one player's in-match state from their profile.
///
/// `display_name` comes from the room roster when available (it is the
/// name the opponent saw in the lobby); the profile name is the fallback.
pub fn snapshot_seat(profile: &PlayerProfile, display_name: Option<&str>) -> PlayerMatchState {
    PlayerMatchState {
        player_id: profile.player_id,
        display_name: display_name
            .map(str::to_string)
            .unwrap_or_else(|| profile.display_name.clone()),
        stockpile: profile.stockpile,
        attack_level: profile.attack_level,
        defense_level: profile.defense_level,
        action: None,
    }
}

/// Assembles the initial match document for a room.
///
/// Two resolvable seats open the match at `ChoosingActions`; a single
/// seat leaves it `WaitingForPlayers` until the opponent's profile
/// resolves and they are seated.
pub fn assemble_match(
    room: &RoomDoc,
    seats: Vec<PlayerMatchState>,
    rules: &MatchRules,
    now: u64,
) -> MatchDoc {
    let status = if seats.len() == 2 {
        MatchStatus::ChoosingActions
    } else {
        MatchStatus::WaitingForPlayers
    };

    MatchDoc {
        id: MatchId::for_room(room.id),
        players: seats,
        status,
        current_turn: 1,
        max_turns: rules.max_turns,
        risk: room.risk,
        turn_history: Vec::new(),
        winner: None,
        created_at: now,
        updated_at: now,
    }
}
