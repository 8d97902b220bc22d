//! The active-match document: status machine, per-player state, and the
//! append-only turn history.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::{MatchId, PlayerId, RiskLevel, Stockpile, StockpileDelta, TurnAction};

// ---------------------------------------------------------------------------
// MatchStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a match.
///
/// The set follows the live logic (`CHOOSING_ACTIONS`/`GAME_OVER`); the
/// stale type-level `ACTIVE`/`FINISHED` pair is not modeled. Permitted
/// transitions form a strict table — anything else is rejected:
///
/// ```text
/// WaitingForPlayers → ChoosingActions → ProcessingTurn → ChoosingActions
///                                                      → GameOver
/// ```
///
/// `GameOver` is terminal. Exactly one `ChoosingActions` phase is open per
/// turn; the `ChoosingActions → ProcessingTurn` edge is the guarded
/// transition that makes turn resolution happen at most once (see the
/// collector in `warchest-match`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    WaitingForPlayers,
    ChoosingActions,
    ProcessingTurn,
    GameOver,
}

impl MatchStatus {
    /// Returns `true` if the match has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver)
    }

    /// Returns `true` if transitioning to `target` is permitted.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::WaitingForPlayers, Self::ChoosingActions)
                | (Self::ChoosingActions, Self::ProcessingTurn)
                | (Self::ProcessingTurn, Self::ChoosingActions)
                | (Self::ProcessingTurn, Self::GameOver)
        )
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WAITING_FOR_PLAYERS"),
            Self::ChoosingActions => write!(f, "CHOOSING_ACTIONS"),
            Self::ProcessingTurn => write!(f, "PROCESSING_TURN"),
            Self::GameOver => write!(f, "GAME_OVER"),
        }
    }
}

// ---------------------------------------------------------------------------
// Winner
// ---------------------------------------------------------------------------

/// Outcome of a finished match.
///
/// Stored as the winning player's id, or the sentinel string `"DRAW"` —
/// the same shape the page logic reads. The custom serde impls below pin
/// that representation (a plain number for a player, `"DRAW"` for a draw).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Player(PlayerId),
    Draw,
}

impl Serialize for Winner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Player(id) => serializer.serialize_u64(id.0),
            Self::Draw => serializer.serialize_str("DRAW"),
        }
    }
}

impl<'de> Deserialize<'de> for Winner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WinnerVisitor;

        impl<'de> Visitor<'de> for WinnerVisitor {
            type Value = Winner;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a player id or the string \"DRAW\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Winner, E> {
                Ok(Winner::Player(PlayerId(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Winner, E> {
                if v == "DRAW" {
                    Ok(Winner::Draw)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(WinnerVisitor)
    }
}

// ---------------------------------------------------------------------------
// PlayerMatchState
// ---------------------------------------------------------------------------

/// Per-player record embedded in the match document.
///
/// The stockpile is a snapshot taken from the profile at match start; the
/// profile's persistent economy is untouched until the match ends. Attack
/// and defense levels are likewise frozen for the match's duration.
///
/// The sealed action doubles as the "has submitted" flag: it is `Some`
/// exactly between a successful submission and the turn advancing, so the
/// two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMatchState {
    pub player_id: PlayerId,
    pub display_name: String,
    pub stockpile: Stockpile,
    pub attack_level: u8,
    pub defense_level: u8,
    /// The sealed choice for the currently open turn.
    pub action: Option<TurnAction>,
}

impl PlayerMatchState {
    /// Whether this player has submitted for the open turn.
    pub fn has_submitted(&self) -> bool {
        self.action.is_some()
    }

    /// Clears the sealed action when the turn advances.
    pub fn clear_action(&mut self) {
        self.action = None;
    }
}

// ---------------------------------------------------------------------------
// TurnResult
// ---------------------------------------------------------------------------

/// Immutable record of one resolved turn, appended to the match history.
///
/// `BTreeMap` keys keep the serialized form byte-deterministic, which is
/// what makes "same inputs ⇒ identical result" checkable at the byte
/// level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    /// 1-based turn number this result resolved.
    pub turn: u32,
    /// The sealed action pair, by player.
    pub actions: BTreeMap<PlayerId, TurnAction>,
    /// Human-readable outcome lines, one per attack resolution.
    pub outcomes: Vec<String>,
    /// Resource deltas applied to each player's stockpile.
    pub deltas: BTreeMap<PlayerId, StockpileDelta>,
}

// ---------------------------------------------------------------------------
// MatchDoc
// ---------------------------------------------------------------------------

/// The document for one active match.
///
/// Invariants maintained by the match service:
/// - `current_turn <= max_turns + 1`, and it never decreases
/// - `turn_history.len() == current_turn - 1` whenever the status is
///   `ChoosingActions` or `GameOver`
/// - `status == GameOver` implies `winner.is_some()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDoc {
    pub id: MatchId,
    /// Per-player state in seat order. One entry while the match is
    /// `WaitingForPlayers`, two once both profiles resolved.
    pub players: Vec<PlayerMatchState>,
    pub status: MatchStatus,
    /// 1-based number of the currently open (or just-resolved) turn.
    pub current_turn: u32,
    /// Fixed turn count after which the match terminates.
    pub max_turns: u32,
    pub risk: RiskLevel,
    /// Append-only log of resolved turns.
    pub turn_history: Vec<TurnResult>,
    pub winner: Option<Winner>,
    /// Unix milliseconds.
    pub created_at: u64,
    pub updated_at: u64,
}

impl MatchDoc {
    /// The state record for one participant.
    pub fn player(&self, id: PlayerId) -> Option<&PlayerMatchState> {
        self.players.iter().find(|p| p.player_id == id)
    }

    /// Mutable state record for one participant.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerMatchState> {
        self.players.iter_mut().find(|p| p.player_id == id)
    }

    /// The other participant's state record.
    pub fn opponent_of(&self, id: PlayerId) -> Option<&PlayerMatchState> {
        self.players.iter().find(|p| p.player_id != id)
    }

    /// Ids of all seated participants.
    pub fn participant_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.player_id).collect()
    }

    /// `true` once every seated participant has a sealed action.
    pub fn all_submitted(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|p| p.has_submitted())
    }
}
