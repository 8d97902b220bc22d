//! # Warchest
//!
//! Core of a turn-based two-player strategy game: lobby rooms, match
//! initiation, sealed simultaneous actions, deterministic turn
//! resolution, and profile progression.
//!
//! Warchest is a library, not a server — it is consumed through mutation
//! calls and observed through per-document change subscriptions, both
//! against a pluggable document store. The [`GameService`] facade wires
//! the layers together over in-memory implementations for development and
//! tests; a deployment swaps in its own store, profile registry, and
//! identity provider behind the same traits.
//!
//! ## Quick start
//!
//! ```rust
//! use warchest::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), WarchestError> {
//! let game = GameService::in_memory(DevIdentity);
//!
//! let alice = game.sign_in("1:alice").await?;
//! let bob = game.sign_in("2:bob").await?;
//!
//! let room = game.create_room(alice.player_id, "gold rush", RiskLevel::Low, true)?;
//! let joined = game.join_room(room.id, bob.player_id, None)?;
//! let match_id = joined.match_id.expect("second player fills the room");
//!
//! game.submit_action(match_id, alice.player_id, TurnAction {
//!     attack: AttackKind::RaidCamp,
//!     defense: DefenseKind::GoldSentinel,
//! })?;
//! game.submit_action(match_id, bob.player_id, TurnAction {
//!     attack: AttackKind::VaultBreak,
//!     defense: DefenseKind::BarricadeTroops,
//! })?;
//!
//! // Both attacks hit defended categories: turn resolved, nothing moved.
//! let doc = game.get_match(match_id)?.doc;
//! assert_eq!(doc.current_turn, 2);
//! # Ok(())
//! # }
//! ```

mod error;
mod service;

pub use error::WarchestError;
pub use service::{GameService, InMemoryGame, JoinedRoom};

/// Convenient glob import for consumers.
pub mod prelude {
    pub use crate::{GameService, InMemoryGame, JoinedRoom, WarchestError};
    pub use warchest_lobby::{JoinOutcome, LobbyConfig, LobbyError, RoomLobby};
    pub use warchest_match::{
        EliminationRule, MatchError, MatchRules, MatchService, RiskTable,
    };
    pub use warchest_profile::{
        DevIdentity, IdentityProvider, MemoryProfiles, PlayerIdentity, PlayerProfile,
        ProfileConfig, ProfileError, ProfileStore, StatKind,
    };
    pub use warchest_store::{DocumentStore, MemoryStore, StoreError, Versioned};
    pub use warchest_types::{
        AttackKind, DefenseKind, MatchDoc, MatchId, MatchStatus, PlayerId,
        PlayerMatchState, ResourceKind, RiskLevel, RoomDoc, RoomId, RoomStatus,
        Stockpile, StockpileDelta, TurnAction, TurnResult, Winner,
    };
}
