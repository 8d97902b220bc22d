//! The `GameService` facade: one object that ties identity, lobby, match,
//! and profile layers together the way a deployment consumes them.
//!
//! The cross-layer orchestration lives here — most visibly in
//! [`GameService::join_room`], where a join that fills the room hands off
//! to the match initiator and links the match back into the room, and in
//! [`GameService::submit_action`], where a finished match closes its
//! room. The sub-crates stay ignorant of each other; this crate is the
//! only place that knows the whole flow.

use std::sync::Arc;

use tokio::sync::watch;
use warchest_lobby::{LobbyConfig, LobbyError, RoomLobby};
use warchest_match::{MatchRules, MatchService};
use warchest_profile::{
    IdentityProvider, MemoryProfiles, PlayerProfile, ProfileConfig, ProfileStore, StatKind,
};
use warchest_store::{DocumentStore, MemoryStore, Versioned};
use warchest_types::{
    MatchDoc, MatchId, MatchStatus, PlayerId, RiskLevel, RoomDoc, RoomId, TurnAction,
};

use crate::WarchestError;

/// What a join gives the caller: the room as joined, and — when the join
/// filled the room — the id of the freshly started match to navigate to.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    pub room: RoomDoc,
    pub match_id: Option<MatchId>,
}

/// The assembled game backend.
///
/// Generic over the identity provider, both document stores, and the
/// profile registry; [`GameService::in_memory`] instantiates everything
/// with the in-memory implementations.
pub struct GameService<I, RS, MS, P> {
    identity: I,
    lobby: RoomLobby<RS>,
    matches: MatchService<MS, P>,
    profiles: Arc<P>,
}

/// The all-in-memory instantiation used by tests and development.
pub type InMemoryGame<I> = GameService<
    I,
    MemoryStore<RoomId, RoomDoc>,
    MemoryStore<MatchId, MatchDoc>,
    MemoryProfiles,
>;

impl<I: IdentityProvider> InMemoryGame<I> {
    /// Builds a fully in-memory game service with default configuration.
    pub fn in_memory(identity: I) -> Self {
        Self::in_memory_with(
            identity,
            LobbyConfig::default(),
            MatchRules::default(),
            ProfileConfig::default(),
        )
    }

    /// Builds a fully in-memory game service with explicit configuration.
    pub fn in_memory_with(
        identity: I,
        lobby_config: LobbyConfig,
        rules: MatchRules,
        profile_config: ProfileConfig,
    ) -> Self {
        let profiles = Arc::new(MemoryProfiles::new(profile_config));
        Self {
            identity,
            lobby: RoomLobby::new(Arc::new(MemoryStore::new()), lobby_config),
            matches: MatchService::new(
                Arc::new(MemoryStore::new()),
                Arc::clone(&profiles),
                rules,
            ),
            profiles,
        }
    }
}

impl<I, RS, MS, P> GameService<I, RS, MS, P>
where
    I: IdentityProvider,
    RS: DocumentStore<RoomId, RoomDoc>,
    MS: DocumentStore<MatchId, MatchDoc>,
    P: ProfileStore,
{
    /// Assembles a service from explicitly constructed layers.
    pub fn new(
        identity: I,
        lobby: RoomLobby<RS>,
        matches: MatchService<MS, P>,
        profiles: Arc<P>,
    ) -> Self {
        Self { identity, lobby, matches, profiles }
    }

    // -----------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------

    /// Resolves a client token and returns the (created-if-new) profile.
    pub async fn sign_in(&self, token: &str) -> Result<PlayerProfile, WarchestError> {
        let identity = self.identity.resolve(token).await?;
        let profile = self.profiles.ensure(&identity)?;
        tracing::info!(player_id = %profile.player_id, "player signed in");
        Ok(profile)
    }

    // -----------------------------------------------------------------
    // Lobby flow
    // -----------------------------------------------------------------

    /// Creates a room on behalf of a signed-in player.
    ///
    /// Players in recovery mode may only open private (training) rooms.
    pub fn create_room(
        &self,
        creator: PlayerId,
        room_name: &str,
        risk: RiskLevel,
        is_public: bool,
    ) -> Result<RoomDoc, WarchestError> {
        let profile = self.profiles.fetch(creator)?;
        self.check_recovery_gate(&profile, is_public)?;

        let room = self.lobby.create_room(
            creator,
            &profile.display_name,
            room_name,
            risk,
            is_public,
        )?;
        Ok(room)
    }

    /// Joins a room and — when this join fills it — starts the match and
    /// links it into the room, returning the match id for navigation.
    pub fn join_room(
        &self,
        room_id: RoomId,
        joiner: PlayerId,
        invite: Option<&str>,
    ) -> Result<JoinedRoom, WarchestError> {
        let profile = self.profiles.fetch(joiner)?;
        let current = self.lobby.get(room_id)?.doc;
        self.check_recovery_gate(&profile, current.is_public)?;

        let outcome =
            self.lobby
                .join_room(room_id, joiner, &profile.display_name, invite)?;

        if !outcome.filled {
            return Ok(JoinedRoom { room: outcome.room, match_id: None });
        }

        // The room just filled: allocate the match (idempotent under a
        // double-join race losing here is impossible — only one joiner
        // observes `filled`) and link it back into the room document.
        let match_id = self.matches.start_for_room(&outcome.room)?;
        self.lobby.mark_in_game(room_id, match_id)?;

        let room = self.lobby.get(room_id)?.doc;
        Ok(JoinedRoom { room, match_id: Some(match_id) })
    }

    /// Deletes a room (creator only, never while in game).
    pub fn delete_room(&self, room_id: RoomId, requester: PlayerId) -> Result<(), WarchestError> {
        self.lobby.delete_room(room_id, requester)?;
        Ok(())
    }

    /// Abandons a waiting lobby.
    pub fn abort_room(&self, room_id: RoomId, requester: PlayerId) -> Result<(), WarchestError> {
        self.lobby.abort_room(room_id, requester)?;
        Ok(())
    }

    /// Point read of a room.
    pub fn get_room(&self, room_id: RoomId) -> Result<Versioned<RoomDoc>, WarchestError> {
        Ok(self.lobby.get(room_id)?)
    }

    /// Subscribes to a room's changes.
    pub fn watch_room(
        &self,
        room_id: RoomId,
    ) -> Result<watch::Receiver<Option<Versioned<RoomDoc>>>, WarchestError> {
        Ok(self.lobby.watch(room_id)?)
    }

    /// Public rooms currently accepting a second player.
    pub fn list_open_rooms(&self) -> Vec<RoomDoc> {
        self.lobby.list_open_rooms()
    }

    /// The join URL for a room.
    pub fn share_link(&self, room_id: RoomId) -> Result<String, WarchestError> {
        let room = self.lobby.get(room_id)?.doc;
        Ok(self.lobby.share_link(&room))
    }

    // -----------------------------------------------------------------
    // Match flow
    // -----------------------------------------------------------------

    /// Seals one player's action for the open turn. When the pair
    /// completes, the turn resolves; when the match finishes, the room
    /// closes and profile writebacks run.
    pub fn submit_action(
        &self,
        match_id: MatchId,
        player: PlayerId,
        action: TurnAction,
    ) -> Result<(), WarchestError> {
        self.matches.submit_action(match_id, player, action)?;

        // Room closure is bookkeeping, not part of the submission — a
        // failure here is logged, not surfaced to the submitting player.
        if let Ok(m) = self.matches.get(match_id) {
            if m.doc.status == MatchStatus::GameOver {
                let room_id = RoomId(match_id.0);
                if let Err(e) = self.lobby.close_room(room_id) {
                    if !matches!(e, LobbyError::NotFound(_)) {
                        tracing::warn!(%room_id, error = %e, "failed to close finished room");
                    }
                }
            }
        }
        Ok(())
    }

    /// Redundancy-safe resolution trigger for store-side watchers.
    pub fn try_resolve_turn(&self, match_id: MatchId) -> Result<bool, WarchestError> {
        Ok(self.matches.try_resolve_turn(match_id)?)
    }

    /// Point read of a match.
    pub fn get_match(&self, match_id: MatchId) -> Result<Versioned<MatchDoc>, WarchestError> {
        Ok(self.matches.get(match_id)?)
    }

    /// Subscribes to a match's changes.
    pub fn watch_match(
        &self,
        match_id: MatchId,
    ) -> Result<watch::Receiver<Option<Versioned<MatchDoc>>>, WarchestError> {
        Ok(self.matches.watch(match_id)?)
    }

    // -----------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------

    /// Fetches a player's persistent profile.
    pub fn get_profile(&self, player: PlayerId) -> Result<PlayerProfile, WarchestError> {
        Ok(self.profiles.fetch(player)?)
    }

    /// Direct access to the profile registry (recovery-mode triggers and
    /// other product-side writes live outside this facade).
    pub fn profiles(&self) -> &Arc<P> {
        &self.profiles
    }

    /// Buys one stat level, deducting gold atomically. Returns the new
    /// level.
    pub fn upgrade_stat(&self, player: PlayerId, stat: StatKind) -> Result<u8, WarchestError> {
        Ok(self.profiles.upgrade_stat(player, stat)?)
    }

    /// Recovery-mode players are restricted to private (training) rooms.
    fn check_recovery_gate(
        &self,
        profile: &PlayerProfile,
        is_public: bool,
    ) -> Result<(), WarchestError> {
        if profile.recovery_mode && is_public {
            return Err(LobbyError::State(format!(
                "player {} is in recovery mode and limited to private rooms",
                profile.player_id
            ))
            .into());
        }
        Ok(())
    }
}
