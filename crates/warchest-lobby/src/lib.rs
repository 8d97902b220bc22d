//! Room lobby management for Warchest.
//!
//! The lobby owns every pre-match mutation of a room document: creation,
//! join admission, deletion, abandonment, and the `Waiting → InGame`
//! hand-off once a second player arrives. Every mutation is a
//! compare-and-swap against the version the operation read, so two
//! clients racing the same room resolve to exactly one winner — a room
//! can never hold a third player, and a match can never be linked twice.
//!
//! # Key types
//!
//! - [`RoomLobby`] — the manager; one per deployment, shared behind `Arc`
//! - [`JoinOutcome`] — what a successful join tells the caller (in
//!   particular: "you filled the room, go start the match")
//! - [`LobbyConfig`] — name limits and the share-link base URL
//! - [`LobbyError`] — the error taxonomy for lobby operations

mod config;
mod error;
mod lobby;

pub use config::LobbyConfig;
pub use error::LobbyError;
pub use lobby::{JoinOutcome, RoomLobby};
