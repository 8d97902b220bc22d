//! Match configuration: risk-tier transfer percentages, turn limit, and
//! the optional elimination rule.
//!
//! These are the constants the resolver is *parameterized* by — nothing
//! in `resolver.rs` hardcodes a number.

use warchest_types::RiskLevel;

/// Transfer percentage per risk tier.
///
/// A successful attack moves `floor(pct × value / 100)` of the targeted
/// resource. Defaults sit inside the observed bands (LOW 6–8, MEDIUM
/// 10–12, HIGH 13–16).
#[derive(Debug, Clone)]
pub struct RiskTable {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl Default for RiskTable {
    fn default() -> Self {
        Self { low: 7, medium: 11, high: 15 }
    }
}

impl RiskTable {
    /// The transfer percentage for one tier.
    pub fn percent(&self, risk: RiskLevel) -> u32 {
        match risk {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }
}

/// When a match ends before the turn limit.
///
/// Turn-limit termination is the baseline; elimination is an optional
/// extension pending a product rule, so it defaults to off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EliminationRule {
    /// Only the turn limit terminates a match.
    #[default]
    None,
    /// The match also ends as soon as any player's stockpile category
    /// reaches zero.
    AnyResourceDepleted,
}

/// Full configuration for the match engine.
#[derive(Debug, Clone)]
pub struct MatchRules {
    pub risk_table: RiskTable,
    /// Fixed turn count after which every match terminates.
    pub max_turns: u32,
    pub elimination: EliminationRule,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            risk_table: RiskTable::default(),
            max_turns: 10,
            elimination: EliminationRule::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_percentages_sit_in_observed_bands() {
        let table = RiskTable::default();
        assert!((6..=8).contains(&table.percent(RiskLevel::Low)));
        assert!((10..=12).contains(&table.percent(RiskLevel::Medium)));
        assert!((13..=16).contains(&table.percent(RiskLevel::High)));
    }

    #[test]
    fn test_percentages_increase_with_risk() {
        let table = RiskTable::default();
        assert!(table.percent(RiskLevel::Low) < table.percent(RiskLevel::Medium));
        assert!(table.percent(RiskLevel::Medium) < table.percent(RiskLevel::High));
    }

    #[test]
    fn test_elimination_defaults_off() {
        assert_eq!(MatchRules::default().elimination, EliminationRule::None);
    }
}
