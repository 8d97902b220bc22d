//! The room lobby manager.
//!
//! Rooms are documents in the shared store, mutated from independent
//! clients, so every operation here follows the same shape: point-read a
//! versioned snapshot, validate against it, build the successor document,
//! and compare-and-swap. A lost race re-reads and re-validates — the
//! operation either cleanly succeeds against fresh state or cleanly fails
//! with the error the fresh state implies (a join that lost the race to
//! the last seat comes back as "room full", not as a retry storm).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use warchest_store::{DocumentStore, StoreError, Versioned};
use warchest_types::{
    unix_millis, MatchId, PlayerId, RiskLevel, RoomDoc, RoomId, RoomStatus,
};

use crate::{LobbyConfig, LobbyError};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// What a successful join tells the caller.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// The room as written by this join.
    pub room: RoomDoc,
    /// The store version the written room landed at (the CAS token for a
    /// follow-up transition).
    pub version: u64,
    /// `true` if this join took the last seat — the caller should now
    /// hand the room to the match initiator.
    pub filled: bool,
}

/// Manages all lobby rooms over a [`DocumentStore`].
///
/// Cheap to share: hold it in an `Arc` and call from any task. The store
/// provides the synchronization; the lobby holds no room state of its own
/// beyond an index of the ids it created (for listings).
pub struct RoomLobby<S> {
    store: Arc<S>,
    config: LobbyConfig,
    /// Ids of rooms created through this lobby, for [`RoomLobby::list_open_rooms`].
    /// Stale ids (deleted rooms) are pruned on listing.
    index: Mutex<Vec<RoomId>>,
}

impl<S> RoomLobby<S>
where
    S: DocumentStore<RoomId, RoomDoc>,
{
    /// Creates a lobby over the given store.
    pub fn new(store: Arc<S>, config: LobbyConfig) -> Self {
        Self {
            store,
            config,
            index: Mutex::new(Vec::new()),
        }
    }

    /// Creates a new room with the creator as its first (and only) member.
    ///
    /// # Errors
    /// [`LobbyError::Validation`] if a public room's name is empty or any
    /// room name exceeds the configured length.
    pub fn create_room(
        &self,
        creator: PlayerId,
        creator_name: &str,
        room_name: &str,
        risk: RiskLevel,
        is_public: bool,
    ) -> Result<RoomDoc, LobbyError> {
        if is_public && room_name.trim().is_empty() {
            return Err(LobbyError::Validation(
                "a public room needs a display name".into(),
            ));
        }
        if room_name.chars().count() > self.config.max_name_len {
            return Err(LobbyError::Validation(format!(
                "room name exceeds {} characters",
                self.config.max_name_len
            )));
        }
        if creator_name.trim().is_empty() {
            return Err(LobbyError::Validation(
                "creator display name must not be empty".into(),
            ));
        }

        let id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let room = RoomDoc {
            id,
            name: room_name.to_string(),
            risk,
            is_public,
            creator,
            players: vec![creator],
            status: RoomStatus::Waiting,
            match_id: None,
            display_names: BTreeMap::from([(creator, creator_name.to_string())]),
            invite_code: (!is_public).then(generate_invite_code),
            created_at: unix_millis(),
        };

        self.store.insert(id, room.clone())?;
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);

        tracing::info!(room_id = %id, %creator, is_public, %risk, "room created");
        Ok(room)
    }

    /// Point read of a room.
    pub fn get(&self, room_id: RoomId) -> Result<Versioned<RoomDoc>, LobbyError> {
        self.store.get(&room_id).map_err(|e| not_found(room_id, e))
    }

    /// Adds a player to a waiting room.
    ///
    /// The membership append is a CAS — when two joiners race for the last
    /// seat, exactly one lands and the other observes the full room and
    /// gets a [`LobbyError::State`].
    ///
    /// # Errors
    /// - [`LobbyError::NotFound`] — room absent
    /// - [`LobbyError::State`] — not `Waiting`, already full, or the
    ///   joiner is already a member
    /// - [`LobbyError::Unauthorized`] — wrong invite code for a private room
    /// - [`LobbyError::Validation`] — empty joiner display name
    pub fn join_room(
        &self,
        room_id: RoomId,
        joiner: PlayerId,
        joiner_name: &str,
        invite: Option<&str>,
    ) -> Result<JoinOutcome, LobbyError> {
        if joiner_name.trim().is_empty() {
            return Err(LobbyError::Validation(
                "display name must not be empty".into(),
            ));
        }

        loop {
            let Versioned { version, doc: room } =
                self.store.get(&room_id).map_err(|e| not_found(room_id, e))?;

            if !room.status.is_joinable() {
                return Err(LobbyError::State(format!(
                    "room {room_id} is not accepting players (status {})",
                    room.status
                )));
            }
            if room.is_member(joiner) {
                return Err(LobbyError::State(format!(
                    "player {joiner} is already in room {room_id}"
                )));
            }
            if room.is_full() {
                return Err(LobbyError::State(format!("room {room_id} is full")));
            }
            if let Some(code) = &room.invite_code {
                if invite != Some(code.as_str()) {
                    return Err(LobbyError::Unauthorized(format!(
                        "room {room_id} is private; invite code required"
                    )));
                }
            }

            let mut next = room.clone();
            next.players.push(joiner);
            next.display_names.insert(joiner, joiner_name.to_string());
            let filled = next.is_full();

            match self.store.compare_and_swap(&room_id, version, next.clone()) {
                Ok(new_version) => {
                    tracing::info!(
                        room_id = %room_id,
                        %joiner,
                        players = next.players.len(),
                        "player joined"
                    );
                    return Ok(JoinOutcome {
                        room: next,
                        version: new_version,
                        filled,
                    });
                }
                // Someone else wrote first — re-read and re-validate.
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(not_found(room_id, e)),
            }
        }
    }

    /// Links a match and moves the room to `InGame`.
    ///
    /// Idempotent: a room already in game with the same match id is a
    /// no-op, so a lost start race resolves silently.
    pub fn mark_in_game(
        &self,
        room_id: RoomId,
        match_id: MatchId,
    ) -> Result<(), LobbyError> {
        loop {
            let Versioned { version, doc: room } =
                self.store.get(&room_id).map_err(|e| not_found(room_id, e))?;

            if room.status == RoomStatus::InGame && room.match_id == Some(match_id) {
                return Ok(());
            }
            if !room.status.can_transition_to(RoomStatus::InGame) {
                return Err(LobbyError::State(format!(
                    "room {room_id} cannot enter a game from status {}",
                    room.status
                )));
            }

            let mut next = room;
            next.status = RoomStatus::InGame;
            next.match_id = Some(match_id);

            match self.store.compare_and_swap(&room_id, version, next) {
                Ok(_) => {
                    tracing::info!(room_id = %room_id, %match_id, "room entered game");
                    return Ok(());
                }
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(not_found(room_id, e)),
            }
        }
    }

    /// Permanently deletes a room.
    ///
    /// # Errors
    /// - [`LobbyError::Unauthorized`] — requester is not the creator
    /// - [`LobbyError::State`] — the room is in game (regardless of caller)
    pub fn delete_room(
        &self,
        room_id: RoomId,
        requester: PlayerId,
    ) -> Result<(), LobbyError> {
        loop {
            let Versioned { version, doc: room } =
                self.store.get(&room_id).map_err(|e| not_found(room_id, e))?;

            if room.creator != requester {
                return Err(LobbyError::Unauthorized(format!(
                    "only the creator may delete room {room_id}"
                )));
            }
            if room.status == RoomStatus::InGame {
                return Err(LobbyError::State(format!(
                    "room {room_id} is in game and cannot be deleted"
                )));
            }

            match self.store.remove_if(&room_id, version) {
                Ok(()) => {
                    tracing::info!(room_id = %room_id, %requester, "room deleted");
                    return Ok(());
                }
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(not_found(room_id, e)),
            }
        }
    }

    /// Abandons a waiting lobby: any member may mark it `Aborted`, which
    /// removes it from listings and rejects further joins.
    pub fn abort_room(
        &self,
        room_id: RoomId,
        requester: PlayerId,
    ) -> Result<(), LobbyError> {
        loop {
            let Versioned { version, doc: room } =
                self.store.get(&room_id).map_err(|e| not_found(room_id, e))?;

            if !room.is_member(requester) {
                return Err(LobbyError::Unauthorized(format!(
                    "player {requester} is not in room {room_id}"
                )));
            }
            if !room.status.can_transition_to(RoomStatus::Aborted) {
                return Err(LobbyError::State(format!(
                    "room {room_id} cannot be abandoned from status {}",
                    room.status
                )));
            }

            let mut next = room;
            next.status = RoomStatus::Aborted;

            match self.store.compare_and_swap(&room_id, version, next) {
                Ok(_) => {
                    tracing::info!(room_id = %room_id, %requester, "room abandoned");
                    return Ok(());
                }
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(not_found(room_id, e)),
            }
        }
    }

    /// Closes a room whose match has ended.
    pub fn close_room(&self, room_id: RoomId) -> Result<(), LobbyError> {
        loop {
            let Versioned { version, doc: room } =
                self.store.get(&room_id).map_err(|e| not_found(room_id, e))?;

            if room.status == RoomStatus::Closed {
                return Ok(());
            }
            if !room.status.can_transition_to(RoomStatus::Closed) {
                return Err(LobbyError::State(format!(
                    "room {room_id} cannot close from status {}",
                    room.status
                )));
            }

            let mut next = room;
            next.status = RoomStatus::Closed;

            match self.store.compare_and_swap(&room_id, version, next) {
                Ok(_) => return Ok(()),
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(not_found(room_id, e)),
            }
        }
    }

    /// Lists public rooms that are currently joinable.
    ///
    /// Rooms that have been deleted since creation are pruned from the
    /// index as a side effect.
    pub fn list_open_rooms(&self) -> Vec<RoomDoc> {
        let ids: Vec<RoomId> = {
            let index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
            index.clone()
        };

        let mut open = Vec::new();
        let mut live = Vec::with_capacity(ids.len());
        for id in ids {
            match self.store.get(&id) {
                Ok(Versioned { doc, .. }) => {
                    live.push(id);
                    if doc.is_public && doc.status.is_joinable() {
                        open.push(doc);
                    }
                }
                Err(_) => {} // deleted — drop from index
            }
        }

        *self.index.lock().unwrap_or_else(PoisonError::into_inner) = live;
        open
    }

    /// Subscribes to a room's state changes (`None` = deleted).
    pub fn watch(
        &self,
        room_id: RoomId,
    ) -> Result<tokio::sync::watch::Receiver<Option<Versioned<RoomDoc>>>, LobbyError> {
        self.store.watch(&room_id).map_err(|e| not_found(room_id, e))
    }

    /// Derives the join URL for a room. Pure — no state change.
    ///
    /// Private rooms get their invite code appended so the link alone
    /// admits the recipient.
    pub fn share_link(&self, room: &RoomDoc) -> String {
        let base = self.config.share_base_url.trim_end_matches('/');
        match &room.invite_code {
            Some(code) => format!("{base}/{}/join?invite={code}", room.id.0),
            None => format!("{base}/{}/join", room.id.0),
        }
    }
}

/// Collapses a store-level miss into the lobby's own NotFound.
fn not_found(room_id: RoomId, err: StoreError) -> LobbyError {
    match err {
        StoreError::NotFound(_) => LobbyError::NotFound(room_id),
        other => LobbyError::Store(other),
    }
}

/// Generates a random 8-character hex invite code.
fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 4] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
