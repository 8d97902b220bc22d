//! Document store contract for Warchest.
//!
//! Room and match documents are shared mutable state reached from two
//! untrusted clients at once, so every mutation in this workspace goes
//! through a conditional write: read a [`Versioned`] snapshot, build the
//! successor document, then [`DocumentStore::compare_and_swap`] against the
//! version you read. A stale write loses with
//! [`StoreError::VersionConflict`] and the caller re-reads — there are no
//! blind overwrites anywhere.
//!
//! Observation is reactive: [`DocumentStore::watch`] hands out a
//! `tokio::sync::watch` receiver per document id. Nothing blocks a caller
//! waiting for a phase change; they await the channel.
//!
//! # Key types
//!
//! - [`DocumentStore`] — the contract (point read, CAS, conditional
//!   remove, subscribe)
//! - [`MemoryStore`] — the in-memory reference implementation
//! - [`Versioned`] — a document plus the version that read observed

mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{DocumentStore, Versioned};
