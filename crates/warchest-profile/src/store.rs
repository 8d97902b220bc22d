//! The profile store: the registry of every known player's persistent
//! state, and the atomic operations the match layer runs against it.
//!
//! # Concurrency note
//!
//! `MemoryProfiles` keeps a plain `HashMap` behind a mutex and performs
//! each operation — including the check-then-deduct of a stat upgrade —
//! inside a single critical section. That is the "atomic conditional
//! decrement" the upgrade economy needs: two concurrent upgrade calls
//! against the same profile serialize on the lock, and the second sees
//! the already-deducted balance.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use warchest_types::{PlayerId, ResourceKind};

use crate::{PlayerIdentity, PlayerProfile, ProfileConfig, ProfileError, StatKind};

/// Persistent profile operations required by the rest of the workspace.
///
/// The match layer only ever calls these; it never mutates a profile
/// directly. Every method either completes fully or changes nothing.
pub trait ProfileStore: Send + Sync + 'static {
    /// Fetches an existing profile.
    ///
    /// # Errors
    /// [`ProfileError::NotFound`] if the player has no profile.
    fn fetch(&self, player: PlayerId) -> Result<PlayerProfile, ProfileError>;

    /// Fetches the profile for an identity, creating it with the
    /// configured starting economy on first sight. Keeps the stored
    /// display name in sync with the identity provider's.
    fn ensure(&self, identity: &PlayerIdentity) -> Result<PlayerProfile, ProfileError>;

    /// Applies a match outcome: increments the win or loss counter.
    /// Draws increment neither and should not be reported here.
    fn record_result(&self, player: PlayerId, won: bool) -> Result<(), ProfileError>;

    /// Advances recovery-mode progress by one finished match. No-op for
    /// players not in recovery. Returns `true` if the player just crossed
    /// the threshold and exited recovery mode.
    fn advance_recovery(&self, player: PlayerId) -> Result<bool, ProfileError>;

    /// Puts a player into recovery mode (product-side trigger; the core
    /// only advances and exits it).
    fn enter_recovery(&self, player: PlayerId) -> Result<(), ProfileError>;

    /// Upgrades one stat by a level, deducting the configured gold cost
    /// atomically. Returns the new level.
    ///
    /// # Errors
    /// - [`ProfileError::MaxLevel`] at the cap — nothing deducted.
    /// - [`ProfileError::InsufficientFunds`] — nothing deducted.
    fn upgrade_stat(&self, player: PlayerId, stat: StatKind) -> Result<u8, ProfileError>;
}

/// In-memory reference implementation of [`ProfileStore`].
pub struct MemoryProfiles {
    config: ProfileConfig,
    profiles: Mutex<HashMap<PlayerId, PlayerProfile>>,
}

impl MemoryProfiles {
    /// Creates an empty registry with the given config.
    pub fn new(config: ProfileConfig) -> Self {
        Self {
            config,
            profiles: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PlayerId, PlayerProfile>> {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryProfiles {
    fn default() -> Self {
        Self::new(ProfileConfig::default())
    }
}

impl ProfileStore for MemoryProfiles {
    fn fetch(&self, player: PlayerId) -> Result<PlayerProfile, ProfileError> {
        self.lock()
            .get(&player)
            .cloned()
            .ok_or(ProfileError::NotFound(player))
    }

    fn ensure(&self, identity: &PlayerIdentity) -> Result<PlayerProfile, ProfileError> {
        let mut profiles = self.lock();
        let profile = profiles
            .entry(identity.player_id)
            .or_insert_with(|| {
                tracing::info!(player_id = %identity.player_id, "profile created");
                PlayerProfile {
                    player_id: identity.player_id,
                    display_name: identity.display_name.clone(),
                    stockpile: self.config.starting.stockpile,
                    attack_level: self.config.starting.attack_level,
                    defense_level: self.config.starting.defense_level,
                    wins: 0,
                    losses: 0,
                    recovery_mode: false,
                    recovery_progress: 0,
                }
            });

        if profile.display_name != identity.display_name {
            profile.display_name = identity.display_name.clone();
        }
        Ok(profile.clone())
    }

    fn record_result(&self, player: PlayerId, won: bool) -> Result<(), ProfileError> {
        let mut profiles = self.lock();
        let profile = profiles
            .get_mut(&player)
            .ok_or(ProfileError::NotFound(player))?;

        if won {
            profile.wins += 1;
        } else {
            profile.losses += 1;
        }
        tracing::info!(
            player_id = %player,
            won,
            wins = profile.wins,
            losses = profile.losses,
            "match result recorded"
        );
        Ok(())
    }

    fn advance_recovery(&self, player: PlayerId) -> Result<bool, ProfileError> {
        let mut profiles = self.lock();
        let profile = profiles
            .get_mut(&player)
            .ok_or(ProfileError::NotFound(player))?;

        if !profile.recovery_mode {
            return Ok(false);
        }

        profile.recovery_progress += 1;
        if profile.recovery_progress >= self.config.recovery.matches_to_exit {
            profile.recovery_mode = false;
            profile.recovery_progress = 0;
            tracing::info!(player_id = %player, "recovery mode completed");
            return Ok(true);
        }

        tracing::debug!(
            player_id = %player,
            progress = profile.recovery_progress,
            needed = self.config.recovery.matches_to_exit,
            "recovery progress advanced"
        );
        Ok(false)
    }

    fn enter_recovery(&self, player: PlayerId) -> Result<(), ProfileError> {
        let mut profiles = self.lock();
        let profile = profiles
            .get_mut(&player)
            .ok_or(ProfileError::NotFound(player))?;
        profile.recovery_mode = true;
        profile.recovery_progress = 0;
        Ok(())
    }

    fn upgrade_stat(&self, player: PlayerId, stat: StatKind) -> Result<u8, ProfileError> {
        let mut profiles = self.lock();
        let profile = profiles
            .get_mut(&player)
            .ok_or(ProfileError::NotFound(player))?;

        let current = profile.level(stat);
        let cost = self
            .config
            .upgrade
            .cost_for_next(current)
            .ok_or(ProfileError::MaxLevel {
                player,
                stat,
                max: self.config.upgrade.max_level,
            })?;

        let available = profile.stockpile.amount(ResourceKind::Gold);
        if available < cost {
            return Err(ProfileError::InsufficientFunds {
                player,
                needed: cost,
                available,
            });
        }

        // Deduct and bump under the same lock — no interleaving between
        // the balance check and the spend.
        profile.stockpile.debit(ResourceKind::Gold, cost);
        let level = profile.level_mut(stat);
        *level += 1;
        let new_level = *level;

        tracing::info!(player_id = %player, %stat, new_level, cost, "stat upgraded");
        Ok(new_level)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use warchest_types::Stockpile;

    use super::*;
    use crate::{RecoveryRules, StartingEconomy};

    fn identity(id: u64, name: &str) -> PlayerIdentity {
        PlayerIdentity {
            player_id: PlayerId(id),
            display_name: name.into(),
        }
    }

    fn store() -> MemoryProfiles {
        MemoryProfiles::default()
    }

    // =====================================================================
    // ensure() / fetch()
    // =====================================================================

    #[test]
    fn test_ensure_new_player_gets_starting_economy() {
        let s = store();
        let profile = s.ensure(&identity(1, "alice")).unwrap();

        assert_eq!(profile.stockpile, Stockpile::uniform(100));
        assert_eq!(profile.attack_level, 1);
        assert_eq!(profile.defense_level, 1);
        assert_eq!(profile.wins, 0);
        assert!(!profile.recovery_mode);
    }

    #[test]
    fn test_ensure_existing_player_preserves_state() {
        let s = store();
        s.ensure(&identity(1, "alice")).unwrap();
        s.record_result(PlayerId(1), true).unwrap();

        let again = s.ensure(&identity(1, "alice")).unwrap();
        assert_eq!(again.wins, 1, "ensure must not reset an existing profile");
    }

    #[test]
    fn test_ensure_refreshes_display_name() {
        let s = store();
        s.ensure(&identity(1, "alice")).unwrap();
        let renamed = s.ensure(&identity(1, "alicia")).unwrap();
        assert_eq!(renamed.display_name, "alicia");
    }

    #[test]
    fn test_fetch_unknown_player_returns_not_found() {
        let s = store();
        assert!(matches!(
            s.fetch(PlayerId(9)),
            Err(ProfileError::NotFound(p)) if p == PlayerId(9)
        ));
    }

    // =====================================================================
    // record_result()
    // =====================================================================

    #[test]
    fn test_record_result_increments_correct_counter() {
        let s = store();
        s.ensure(&identity(1, "alice")).unwrap();

        s.record_result(PlayerId(1), true).unwrap();
        s.record_result(PlayerId(1), false).unwrap();
        s.record_result(PlayerId(1), false).unwrap();

        let profile = s.fetch(PlayerId(1)).unwrap();
        assert_eq!(profile.wins, 1);
        assert_eq!(profile.losses, 2);
    }

    // =====================================================================
    // recovery mode
    // =====================================================================

    #[test]
    fn test_advance_recovery_noop_when_not_in_recovery() {
        let s = store();
        s.ensure(&identity(1, "alice")).unwrap();

        let exited = s.advance_recovery(PlayerId(1)).unwrap();
        assert!(!exited);
        assert_eq!(s.fetch(PlayerId(1)).unwrap().recovery_progress, 0);
    }

    #[test]
    fn test_recovery_exits_at_threshold() {
        let s = MemoryProfiles::new(ProfileConfig {
            recovery: RecoveryRules { matches_to_exit: 2 },
            ..ProfileConfig::default()
        });
        s.ensure(&identity(1, "alice")).unwrap();
        s.enter_recovery(PlayerId(1)).unwrap();

        assert!(!s.advance_recovery(PlayerId(1)).unwrap());
        assert!(s.advance_recovery(PlayerId(1)).unwrap(), "second match crosses threshold");

        let profile = s.fetch(PlayerId(1)).unwrap();
        assert!(!profile.recovery_mode);
        assert_eq!(profile.recovery_progress, 0);
    }

    // =====================================================================
    // upgrade_stat()
    // =====================================================================

    #[test]
    fn test_upgrade_deducts_gold_and_bumps_level() {
        let s = store();
        s.ensure(&identity(1, "alice")).unwrap();

        let level = s.upgrade_stat(PlayerId(1), StatKind::Attack).unwrap();
        assert_eq!(level, 2);

        let profile = s.fetch(PlayerId(1)).unwrap();
        assert_eq!(profile.attack_level, 2);
        assert_eq!(profile.stockpile.gold, 50, "level-2 cost is 50 by default");
        assert_eq!(profile.defense_level, 1, "other stat untouched");
    }

    #[test]
    fn test_upgrade_at_max_level_rejected_without_deduction() {
        // 100 starting gold covers level 2 (50) but not also level 3 (120),
        // so grant a richer starting economy for this test.
        let s = MemoryProfiles::new(ProfileConfig {
            starting: StartingEconomy {
                stockpile: Stockpile::uniform(1000),
                ..StartingEconomy::default()
            },
            ..ProfileConfig::default()
        });
        s.ensure(&identity(1, "alice")).unwrap();
        s.upgrade_stat(PlayerId(1), StatKind::Defense).unwrap();
        s.upgrade_stat(PlayerId(1), StatKind::Defense).unwrap();

        let before = s.fetch(PlayerId(1)).unwrap().stockpile.gold;
        let result = s.upgrade_stat(PlayerId(1), StatKind::Defense);
        assert!(matches!(result, Err(ProfileError::MaxLevel { max: 3, .. })));
        assert_eq!(s.fetch(PlayerId(1)).unwrap().stockpile.gold, before);
    }

    #[test]
    fn test_upgrade_insufficient_funds_rejected_without_deduction() {
        let s = MemoryProfiles::new(ProfileConfig {
            starting: StartingEconomy {
                stockpile: Stockpile::uniform(10),
                ..StartingEconomy::default()
            },
            ..ProfileConfig::default()
        });
        s.ensure(&identity(1, "alice")).unwrap();

        let result = s.upgrade_stat(PlayerId(1), StatKind::Attack);
        assert!(matches!(
            result,
            Err(ProfileError::InsufficientFunds { needed: 50, available: 10, .. })
        ));
        let profile = s.fetch(PlayerId(1)).unwrap();
        assert_eq!(profile.attack_level, 1);
        assert_eq!(profile.stockpile.gold, 10);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_upgrades_cannot_double_spend() {
        // Exactly enough gold for ONE level-2 upgrade. Two concurrent
        // calls must spend it at most once.
        let s = Arc::new(MemoryProfiles::new(ProfileConfig {
            starting: StartingEconomy {
                stockpile: Stockpile { gold: 50, military: 100, resources: 100 },
                ..StartingEconomy::default()
            },
            ..ProfileConfig::default()
        }));
        s.ensure(&identity(1, "alice")).unwrap();

        let a = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.upgrade_stat(PlayerId(1), StatKind::Attack) })
        };
        let b = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.upgrade_stat(PlayerId(1), StatKind::Attack) })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "only one upgrade can afford the cost");

        let profile = s.fetch(PlayerId(1)).unwrap();
        assert_eq!(profile.attack_level, 2);
        assert_eq!(profile.stockpile.gold, 0, "cost deducted exactly once");
    }
}
