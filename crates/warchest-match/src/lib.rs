//! Match engine for Warchest: everything between "two players are seated"
//! and "the profiles have their win/loss counters updated".
//!
//! # Components
//!
//! - **Initiator** ([`initiator`]) — promotes a full room into a match
//!   document, snapshotting profile stats into per-player state.
//! - **Collector** ([`MatchService::submit_action`]) — accepts one sealed
//!   action per player per turn and triggers resolution when the pair is
//!   complete.
//! - **Resolver** ([`resolver::resolve_turn`]) — a pure, deterministic
//!   function from the sealed pair + pre-turn state to a turn result.
//!   No randomness, ever — "no random chances" is a product invariant,
//!   not marketing.
//! - **Lifecycle** ([`lifecycle`]) — applies a resolution to the match
//!   document, advances or terminates, and decides the winner.
//!
//! # At-most-once resolution
//!
//! Both clients race to observe "both submitted". The
//! `ChoosingActions → ProcessingTurn` edge is taken with a single
//! compare-and-swap keyed on the status and version the observer read, so
//! however many callers notice the completed pair, exactly one resolves
//! the turn. [`MatchService::try_resolve_turn`] is public and safe to
//! invoke redundantly — a store-side watcher can drive it just as well as
//! the submitting client.

mod error;
pub mod initiator;
pub mod lifecycle;
pub mod resolver;
mod rules;
mod service;

pub use error::MatchError;
pub use rules::{EliminationRule, MatchRules, RiskTable};
pub use service::MatchService;
