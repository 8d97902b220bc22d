//! Match lifecycle control: applying a resolved turn to the match
//! document and deciding when — and how — a match ends.
//!
//! Status changes go through the transition table on
//! [`MatchStatus::can_transition_to`]; any edge outside
//! `WaitingForPlayers → ChoosingActions → ProcessingTurn →
//! {ChoosingActions, GameOver}` is rejected here rather than silently
//! written.

use warchest_types::{MatchDoc, MatchStatus, PlayerMatchState, Winner};

use crate::resolver::TurnResolution;
use crate::{EliminationRule, MatchError, MatchRules};

/// Applies a turn resolution to the document.
///
/// Appends the result to the history, installs the post-turn stockpiles,
/// clears both sealed actions, advances the turn counter, and transitions
/// to `ChoosingActions` — or to `GameOver` with a winner when a
/// termination condition is met.
///
/// # Errors
/// - [`MatchError::State`] if the document isn't in `ProcessingTurn`.
/// - [`MatchError::Corrupt`] if the resolution references a player the
///   document doesn't hold.
pub fn apply_resolution(
    doc: &mut MatchDoc,
    resolution: TurnResolution,
    rules: &MatchRules,
) -> Result<(), MatchError> {
    if doc.status != MatchStatus::ProcessingTurn {
        return Err(MatchError::State(format!(
            "match {} is not processing a turn (status {})",
            doc.id, doc.status
        )));
    }

    for (player_id, stockpile) in &resolution.stockpiles {
        let seat = doc.player_mut(*player_id).ok_or_else(|| {
            MatchError::Corrupt(format!(
                "resolution references player {player_id} who is not seated"
            ))
        })?;
        seat.stockpile = *stockpile;
    }

    doc.turn_history.push(resolution.result);
    for seat in &mut doc.players {
        seat.clear_action();
    }
    doc.current_turn += 1;

    let next_status = if termination_due(doc, rules) {
        doc.winner = Some(decide_winner(&doc.players));
        MatchStatus::GameOver
    } else {
        MatchStatus::ChoosingActions
    };

    if !doc.status.can_transition_to(next_status) {
        return Err(MatchError::State(format!(
            "transition {} → {next_status} is not permitted",
            doc.status
        )));
    }
    doc.status = next_status;

    tracing::debug!(
        match_id = %doc.id,
        turn = doc.current_turn,
        status = %doc.status,
        "turn applied"
    );
    Ok(())
}

/// Whether the match should terminate now that a turn has been applied.
///
/// The turn limit is the baseline terminator; elimination on a depleted
/// stockpile category is the optional extension.
pub fn termination_due(doc: &MatchDoc, rules: &MatchRules) -> bool {
    if doc.current_turn > doc.max_turns {
        return true;
    }
    match rules.elimination {
        EliminationRule::None => false,
        EliminationRule::AnyResourceDepleted => {
            doc.players.iter().any(|p| p.stockpile.any_depleted())
        }
    }
}

/// Decides the winner at termination.
///
/// Superior aggregate (gold + military + resources) wins. Equal
/// aggregates tie-break by gold, then military, then resources; full
/// equality is a draw.
pub fn decide_winner(players: &[PlayerMatchState]) -> Winner {
    let [a, b] = players else {
        // A match terminating with a single seat (opponent never resolved)
        // has no contest to score.
        return players
            .first()
            .map(|p| Winner::Player(p.player_id))
            .unwrap_or(Winner::Draw);
    };

    let key = |p: &PlayerMatchState| {
        (
            p.stockpile.total(),
            p.stockpile.gold,
            p.stockpile.military,
            p.stockpile.resources,
        )
    };

    match key(a).cmp(&key(b)) {
        std::cmp::Ordering::Greater => Winner::Player(a.player_id),
        std::cmp::Ordering::Less => Winner::Player(b.player_id),
        std::cmp::Ordering::Equal => Winner::Draw,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use warchest_types::{
        AttackKind, DefenseKind, MatchId, PlayerId, RiskLevel, Stockpile, TurnAction,
        TurnResult,
    };

    use super::*;

    fn seat(id: u64, stockpile: Stockpile) -> PlayerMatchState {
        PlayerMatchState {
            player_id: PlayerId(id),
            display_name: format!("player-{id}"),
            stockpile,
            attack_level: 1,
            defense_level: 1,
            action: Some(TurnAction {
                attack: AttackKind::RaidCamp,
                defense: DefenseKind::GoldSentinel,
            }),
        }
    }

    fn processing_doc(turn: u32, max_turns: u32) -> MatchDoc {
        MatchDoc {
            id: MatchId(1),
            players: vec![seat(1, Stockpile::uniform(100)), seat(2, Stockpile::uniform(100))],
            status: MatchStatus::ProcessingTurn,
            current_turn: turn,
            max_turns,
            risk: RiskLevel::Low,
            turn_history: Vec::new(),
            winner: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn resolution_for(doc: &MatchDoc) -> TurnResolution {
        TurnResolution {
            result: TurnResult {
                turn: doc.current_turn,
                actions: doc
                    .players
                    .iter()
                    .map(|p| (p.player_id, p.action.unwrap()))
                    .collect(),
                outcomes: vec!["something happened".into()],
                deltas: BTreeMap::new(),
            },
            stockpiles: doc
                .players
                .iter()
                .map(|p| (p.player_id, p.stockpile))
                .collect(),
        }
    }

    #[test]
    fn test_apply_advances_turn_and_reopens_choices() {
        let mut doc = processing_doc(1, 10);
        let resolution = resolution_for(&doc);

        apply_resolution(&mut doc, resolution, &MatchRules::default()).unwrap();

        assert_eq!(doc.status, MatchStatus::ChoosingActions);
        assert_eq!(doc.current_turn, 2);
        assert_eq!(doc.turn_history.len(), 1);
        assert!(doc.players.iter().all(|p| !p.has_submitted()), "actions cleared");
        // The bookkeeping invariant: history length == current_turn - 1.
        assert_eq!(doc.turn_history.len() as u32, doc.current_turn - 1);
    }

    #[test]
    fn test_apply_final_turn_terminates_with_winner_set() {
        let mut doc = processing_doc(10, 10);
        doc.players[0].stockpile = Stockpile { gold: 120, military: 100, resources: 100 };
        let resolution = resolution_for(&doc);

        apply_resolution(&mut doc, resolution, &MatchRules::default()).unwrap();

        assert_eq!(doc.status, MatchStatus::GameOver);
        assert_eq!(doc.current_turn, 11, "max_turns + 1 is the ceiling");
        assert_eq!(doc.winner, Some(Winner::Player(PlayerId(1))));
        assert_eq!(doc.turn_history.len() as u32, doc.current_turn - 1);
    }

    #[test]
    fn test_apply_outside_processing_rejected() {
        let mut doc = processing_doc(1, 10);
        doc.status = MatchStatus::ChoosingActions;
        let resolution = resolution_for(&doc);

        let result = apply_resolution(&mut doc, resolution, &MatchRules::default());
        assert!(matches!(result, Err(MatchError::State(_))));
        assert!(doc.turn_history.is_empty(), "nothing applied on rejection");
    }

    #[test]
    fn test_elimination_rule_ends_match_early() {
        let rules = MatchRules {
            elimination: EliminationRule::AnyResourceDepleted,
            ..MatchRules::default()
        };
        let mut doc = processing_doc(3, 10);
        let mut resolution = resolution_for(&doc);
        // The resolved turn leaves player 2 with an emptied gold vault.
        resolution.stockpiles[1].1 = Stockpile { gold: 0, military: 80, resources: 80 };

        apply_resolution(&mut doc, resolution, &rules).unwrap();

        assert_eq!(doc.status, MatchStatus::GameOver);
        assert_eq!(doc.winner, Some(Winner::Player(PlayerId(1))));
    }

    #[test]
    fn test_elimination_off_by_default_keeps_playing() {
        let mut doc = processing_doc(3, 10);
        let mut resolution = resolution_for(&doc);
        resolution.stockpiles[1].1 = Stockpile { gold: 0, military: 80, resources: 80 };

        apply_resolution(&mut doc, resolution, &MatchRules::default()).unwrap();

        assert_eq!(doc.status, MatchStatus::ChoosingActions);
        assert!(doc.winner.is_none());
    }

    // =====================================================================
    // decide_winner()
    // =====================================================================

    #[test]
    fn test_winner_by_aggregate() {
        let players = vec![
            seat(1, Stockpile { gold: 50, military: 50, resources: 50 }),
            seat(2, Stockpile { gold: 100, military: 100, resources: 100 }),
        ];
        assert_eq!(decide_winner(&players), Winner::Player(PlayerId(2)));
    }

    #[test]
    fn test_equal_aggregate_tie_breaks_on_gold() {
        let players = vec![
            seat(1, Stockpile { gold: 120, military: 90, resources: 90 }),
            seat(2, Stockpile { gold: 100, military: 100, resources: 100 }),
        ];
        // Equal totals (300 each): richer vault wins.
        assert_eq!(decide_winner(&players), Winner::Player(PlayerId(1)));
    }

    #[test]
    fn test_full_equality_is_a_draw() {
        let players = vec![
            seat(1, Stockpile::uniform(100)),
            seat(2, Stockpile::uniform(100)),
        ];
        assert_eq!(decide_winner(&players), Winner::Draw);
    }
}
