//! Shared data model for Warchest.
//!
//! This crate defines every type that lives in the document store and
//! crosses crate boundaries:
//!
//! - **Identity** ([`PlayerId`], [`RoomId`], [`MatchId`]) — newtype ids.
//! - **Actions** ([`TurnAction`], [`AttackKind`], [`DefenseKind`]) — the
//!   closed option sets players pick from each turn.
//! - **Documents** ([`RoomDoc`], [`MatchDoc`]) — the two mutable documents
//!   and their embedded records ([`PlayerMatchState`], [`TurnResult`]).
//!
//! # Architecture
//!
//! The types layer sits below everything else. It doesn't know about the
//! store, the lobby, or the resolver — it only knows the shapes that get
//! persisted and the invariants those shapes carry (status transition
//! tables, capacity limits).
//!
//! ```text
//! Store (documents) → Types (this crate) ← Services (lobby, match)
//! ```

mod action;
mod ids;
mod matches;
mod resources;
mod room;
mod time;

pub use action::{AttackKind, DefenseKind, ResourceKind, RiskLevel, TurnAction};
pub use ids::{MatchId, PlayerId, RoomId};
pub use matches::{MatchDoc, MatchStatus, PlayerMatchState, TurnResult, Winner};
pub use resources::{Stockpile, StockpileDelta};
pub use room::{RoomDoc, RoomStatus, ROOM_CAPACITY};
pub use time::unix_millis;
