//! The match service: the mutation surface for everything match-shaped.
//!
//! All writes follow the lobby's discipline — read a versioned snapshot,
//! validate, compare-and-swap, re-read on conflict. The one place where
//! that discipline carries a game-correctness guarantee (not just a data
//! one) is [`MatchService::try_resolve_turn`]: the
//! `ChoosingActions → ProcessingTurn` CAS is what makes turn resolution
//! happen at most once no matter how many observers notice that both
//! actions are in.

use std::sync::Arc;

use tokio::sync::watch;
use warchest_profile::ProfileStore;
use warchest_store::{DocumentStore, StoreError, Versioned};
use warchest_types::{
    unix_millis, MatchDoc, MatchId, MatchStatus, PlayerId, RoomDoc, TurnAction, Winner,
};

use crate::initiator::{assemble_match, snapshot_seat};
use crate::lifecycle::apply_resolution;
use crate::resolver::resolve_turn;
use crate::{MatchError, MatchRules};

/// Orchestrates match documents over a [`DocumentStore`], with profile
/// writebacks on termination.
///
/// Cheap to share behind an `Arc`; the store provides all
/// synchronization.
pub struct MatchService<S, P> {
    store: Arc<S>,
    profiles: Arc<P>,
    rules: MatchRules,
}

impl<S, P> MatchService<S, P>
where
    S: DocumentStore<MatchId, MatchDoc>,
    P: ProfileStore,
{
    /// Creates a service over the given store and profile registry.
    pub fn new(store: Arc<S>, profiles: Arc<P>, rules: MatchRules) -> Self {
        Self { store, profiles, rules }
    }

    /// The rules this service runs with.
    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    // -----------------------------------------------------------------
    // Initiation
    // -----------------------------------------------------------------

    /// Allocates the match for a freshly filled room.
    ///
    /// Snapshots each resolvable profile into a seat. Idempotent: if the
    /// room's match already exists (double-start race, repeated call),
    /// the existing match id is returned and nothing is written.
    ///
    /// # Errors
    /// - [`MatchError::State`] if the room doesn't hold exactly two
    ///   players.
    /// - [`MatchError::Corrupt`] if not even one profile resolves.
    pub fn start_for_room(&self, room: &RoomDoc) -> Result<MatchId, MatchError> {
        if room.players.len() != 2 {
            return Err(MatchError::State(format!(
                "room {} has {} players; a match needs 2",
                room.id,
                room.players.len()
            )));
        }

        let match_id = MatchId::for_room(room.id);

        let mut seats = Vec::with_capacity(2);
        for player in &room.players {
            match self.profiles.fetch(*player) {
                Ok(profile) => {
                    seats.push(snapshot_seat(&profile, room.display_name_of(*player)));
                }
                Err(_) => {
                    tracing::warn!(
                        match_id = %match_id,
                        player_id = %player,
                        "profile unresolvable at match start; seating deferred"
                    );
                }
            }
        }
        if seats.is_empty() {
            return Err(MatchError::Corrupt(format!(
                "no resolvable profiles for room {}",
                room.id
            )));
        }

        let doc = assemble_match(room, seats, &self.rules, unix_millis());
        match self.store.insert(match_id, doc) {
            Ok(_) => {
                tracing::info!(%match_id, room_id = %room.id, "match started");
                Ok(match_id)
            }
            // Already linked — the earlier start won; this call is a no-op.
            Err(StoreError::AlreadyExists(_)) => Ok(match_id),
            Err(e) => Err(e.into()),
        }
    }

    /// Seats a late-resolving player into a `WaitingForPlayers` match and
    /// opens the first turn once both seats are filled.
    pub fn seat_player(&self, match_id: MatchId, player: PlayerId) -> Result<(), MatchError> {
        let profile = self.profiles.fetch(player)?;

        loop {
            let Versioned { version, doc } = self.read(match_id)?;

            if doc.player(player).is_some() {
                return Ok(()); // already seated
            }
            if doc.status != MatchStatus::WaitingForPlayers {
                return Err(MatchError::State(format!(
                    "match {match_id} is not waiting for players (status {})",
                    doc.status
                )));
            }

            let mut next = doc;
            next.players.push(snapshot_seat(&profile, None));
            if next.players.len() == 2 {
                next.status = MatchStatus::ChoosingActions;
            }
            next.updated_at = unix_millis();

            match self.store.compare_and_swap(&match_id, version, next) {
                Ok(_) => {
                    tracing::info!(%match_id, player_id = %player, "player seated");
                    return Ok(());
                }
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(self.not_found(match_id, e)),
            }
        }
    }

    // -----------------------------------------------------------------
    // Action collection
    // -----------------------------------------------------------------

    /// Records one player's sealed action for the open turn, then checks
    /// whether the pair is complete and — if so — triggers resolution.
    ///
    /// # Errors
    /// - [`MatchError::State`] outside `ChoosingActions` — "not now".
    /// - [`MatchError::NotParticipant`] for a player without a seat.
    /// - [`MatchError::AlreadySubmitted`] on re-submission: rejected, not
    ///   overwritten, nothing changed.
    pub fn submit_action(
        &self,
        match_id: MatchId,
        player: PlayerId,
        action: TurnAction,
    ) -> Result<(), MatchError> {
        loop {
            let Versioned { version, doc } = self.read(match_id)?;

            if doc.status != MatchStatus::ChoosingActions {
                return Err(MatchError::State(format!(
                    "match {match_id} is not accepting actions (status {})",
                    doc.status
                )));
            }
            let Some(seat) = doc.player(player) else {
                return Err(MatchError::NotParticipant { player, match_id });
            };
            if seat.has_submitted() {
                return Err(MatchError::AlreadySubmitted {
                    player,
                    turn: doc.current_turn,
                });
            }

            let mut next = doc;
            if let Some(seat) = next.player_mut(player) {
                seat.action = Some(action);
            }
            next.updated_at = unix_millis();

            match self.store.compare_and_swap(&match_id, version, next) {
                Ok(_) => {
                    tracing::info!(
                        %match_id,
                        player_id = %player,
                        "action sealed"
                    );
                    break;
                }
                // The opponent's submission landed first — re-validate.
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(self.not_found(match_id, e)),
            }
        }

        // Check-and-trigger. Redundant invocations are harmless: if the
        // opponent's client (or a store-side watcher) gets here first,
        // this call observes ProcessingTurn and does nothing.
        self.try_resolve_turn(match_id)?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Resolution trigger
    // -----------------------------------------------------------------

    /// Resolves the open turn if — and only if — both actions are sealed
    /// and this caller wins the `ChoosingActions → ProcessingTurn` CAS.
    ///
    /// Safe to call redundantly from any number of observers; at most one
    /// resolution happens per turn. Returns `true` if this call performed
    /// the resolution.
    ///
    /// # Errors
    /// [`MatchError::Corrupt`] if resolution fails — the match is left in
    /// `ProcessingTurn` for operational attention rather than advanced
    /// with incomplete data.
    pub fn try_resolve_turn(&self, match_id: MatchId) -> Result<bool, MatchError> {
        // Phase 1: win the right to resolve, or bow out.
        let (claimed, claimed_version) = loop {
            let Versioned { version, doc } = self.read(match_id)?;

            if doc.status != MatchStatus::ChoosingActions || !doc.all_submitted() {
                return Ok(false);
            }

            let mut processing = doc;
            processing.status = MatchStatus::ProcessingTurn;
            processing.updated_at = unix_millis();

            match self.store.compare_and_swap(&match_id, version, processing.clone()) {
                Ok(new_version) => break (processing, new_version),
                // Lost the race — whoever won either resolves the turn or
                // already advanced it. Loop to find out which.
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(self.not_found(match_id, e)),
            }
        };

        tracing::debug!(%match_id, turn = claimed.current_turn, "turn resolution claimed");

        // Phase 2: resolve and apply. Errors here deliberately leave the
        // document in ProcessingTurn.
        let resolution = resolve_turn(&claimed, &self.rules)?;
        let mut next = claimed;
        apply_resolution(&mut next, resolution, &self.rules)?;
        next.updated_at = unix_millis();

        let finished = next.status == MatchStatus::GameOver;
        let winner = next.winner;
        let participants = next.participant_ids();

        // Nobody else writes a ProcessingTurn document (submissions are
        // rejected by the status check), so this CAS only fails on
        // operational trouble — propagate, don't retry.
        self.store.compare_and_swap(&match_id, claimed_version, next)?;

        tracing::info!(
            %match_id,
            finished,
            "turn resolved"
        );

        if finished {
            self.write_back_outcome(match_id, winner, &participants)?;
        }
        Ok(true)
    }

    /// Propagates a finished match into the profile store: win/loss
    /// counters and recovery-mode progress.
    fn write_back_outcome(
        &self,
        match_id: MatchId,
        winner: Option<Winner>,
        participants: &[PlayerId],
    ) -> Result<(), MatchError> {
        let winner = winner.ok_or_else(|| {
            MatchError::Corrupt(format!("match {match_id} ended without a winner field"))
        })?;

        if let Winner::Player(winning_player) = winner {
            for player in participants {
                self.profiles.record_result(*player, *player == winning_player)?;
            }
        }
        // Draws move no counters, but every finished match counts toward
        // recovery progress.
        for player in participants {
            self.profiles.advance_recovery(*player)?;
        }

        tracing::info!(%match_id, ?winner, "match outcome written back");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------

    /// Point read of a match.
    pub fn get(&self, match_id: MatchId) -> Result<Versioned<MatchDoc>, MatchError> {
        self.read(match_id)
    }

    /// Subscribes to a match's state changes.
    pub fn watch(
        &self,
        match_id: MatchId,
    ) -> Result<watch::Receiver<Option<Versioned<MatchDoc>>>, MatchError> {
        self.store
            .watch(&match_id)
            .map_err(|e| self.not_found(match_id, e))
    }

    fn read(&self, match_id: MatchId) -> Result<Versioned<MatchDoc>, MatchError> {
        self.store
            .get(&match_id)
            .map_err(|e| self.not_found(match_id, e))
    }

    fn not_found(&self, match_id: MatchId, err: StoreError) -> MatchError {
        match err {
            StoreError::NotFound(_) => MatchError::NotFound(match_id),
            other => MatchError::Store(other),
        }
    }
}
