//! Turn resolution: a pure function from the sealed action pair and the
//! pre-turn player state to a [`TurnResult`].
//!
//! Both players attack and defend simultaneously — this is two
//! one-directional resolutions computed from the *same* pre-turn
//! snapshots, not a move and a counter-move. The function touches no
//! clock and no randomness: identical inputs produce byte-identical
//! results.

use std::collections::BTreeMap;

use warchest_types::{
    MatchDoc, PlayerId, PlayerMatchState, ResourceKind, Stockpile, StockpileDelta,
    TurnAction, TurnResult,
};

use crate::{MatchError, MatchRules};

/// The outcome of resolving one turn: the immutable history record plus
/// the post-turn stockpiles, keyed by seat order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResolution {
    pub result: TurnResult,
    /// Post-turn holdings per player, in the match's seat order.
    pub stockpiles: Vec<(PlayerId, Stockpile)>,
}

/// One attack seen from the attacker's side.
struct AttackContext<'a> {
    attacker: &'a PlayerMatchState,
    defender: &'a PlayerMatchState,
    action: TurnAction,
    defense: TurnAction,
}

/// Resolves the open turn of `doc`.
///
/// # Errors
/// [`MatchError::Corrupt`] if the document doesn't hold exactly two
/// seated players with sealed actions — resolution with incomplete data
/// would silently desynchronize the two players' views, so it is refused
/// outright.
pub fn resolve_turn(doc: &MatchDoc, rules: &MatchRules) -> Result<TurnResolution, MatchError> {
    let [a, b] = doc.players.as_slice() else {
        return Err(MatchError::Corrupt(format!(
            "match {} has {} seated players, expected 2",
            doc.id,
            doc.players.len()
        )));
    };
    let action_of = |p: &PlayerMatchState| {
        p.action.ok_or_else(|| {
            MatchError::Corrupt(format!(
                "player {} has no sealed action for turn {}",
                p.player_id, doc.current_turn
            ))
        })
    };
    let (action_a, action_b) = (action_of(a)?, action_of(b)?);

    let pct = rules.risk_table.percent(doc.risk);

    let mut outcomes = Vec::with_capacity(2);
    let mut deltas: BTreeMap<PlayerId, StockpileDelta> = BTreeMap::new();
    deltas.insert(a.player_id, StockpileDelta::default());
    deltas.insert(b.player_id, StockpileDelta::default());

    // Both directions read the same pre-turn snapshots.
    let directions = [
        AttackContext { attacker: a, defender: b, action: action_a, defense: action_b },
        AttackContext { attacker: b, defender: a, action: action_b, defense: action_a },
    ];

    for ctx in directions {
        let target = ctx.action.attack.target();
        if ctx.defense.defense.protects() == target {
            outcomes.push(format!(
                "{}'s {} was blocked by {}'s {}",
                ctx.attacker.display_name,
                ctx.action.attack,
                ctx.defender.display_name,
                ctx.defense.defense,
            ));
            continue;
        }

        // Percentage of the defender's *pre-turn* value, floored. The
        // transfer can never exceed what the defender holds, so nothing
        // goes negative.
        let amount = ctx.defender.stockpile.amount(target) * pct / 100;
        outcomes.push(format!(
            "{}'s {} seized {} {} from {}",
            ctx.attacker.display_name,
            ctx.action.attack,
            amount,
            target,
            ctx.defender.display_name,
        ));

        if let Some(delta) = deltas.get_mut(&ctx.attacker.player_id) {
            delta.record(target, amount as i64);
        }
        if let Some(delta) = deltas.get_mut(&ctx.defender.player_id) {
            delta.record(target, -(amount as i64));
        }
    }

    // Apply the combined deltas to copies of the pre-turn stockpiles.
    let stockpiles = [a, b]
        .into_iter()
        .map(|p| {
            let mut holdings = p.stockpile;
            if let Some(delta) = deltas.get(&p.player_id) {
                for kind in [ResourceKind::Gold, ResourceKind::Military, ResourceKind::Resources] {
                    let change = delta.get(kind);
                    if change >= 0 {
                        holdings.credit(kind, change as u32);
                    } else {
                        holdings.debit(kind, (-change) as u32);
                    }
                }
            }
            (p.player_id, holdings)
        })
        .collect();

    let result = TurnResult {
        turn: doc.current_turn,
        actions: BTreeMap::from([(a.player_id, action_a), (b.player_id, action_b)]),
        outcomes,
        deltas,
    };

    Ok(TurnResolution { result, stockpiles })
}
