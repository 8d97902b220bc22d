//! Player identity and persistent profiles for Warchest.
//!
//! This crate handles everything that outlives a single match:
//!
//! 1. **Identity** — who a player is ([`IdentityProvider`] trait: opaque
//!    token in, stable player id + display name out)
//! 2. **Economy and levels** — persistent gold/military/resources and
//!    attack/defense levels ([`PlayerProfile`])
//! 3. **Progression** — win/loss counters and recovery-mode progress,
//!    written back when a match ends ([`ProfileStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Match layer (above)  ← snapshots profile stats at match start,
//!     ↕                  writes win/loss + recovery progress at the end
//! Profile layer (this crate)
//!     ↕
//! Types layer (below)  ← PlayerId, Stockpile
//! ```

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod identity;
mod profile;
mod store;

pub use config::{ProfileConfig, RecoveryRules, StartingEconomy, UpgradeRules};
pub use error::ProfileError;
pub use identity::{DevIdentity, IdentityProvider, PlayerIdentity};
pub use profile::{PlayerProfile, StatKind};
pub use store::{MemoryProfiles, ProfileStore};
