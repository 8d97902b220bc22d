//! Unified error type for the Warchest facade.

use warchest_lobby::LobbyError;
use warchest_match::MatchError;
use warchest_profile::ProfileError;
use warchest_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `warchest` facade crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WarchestError {
    /// A lobby-level error (room validation, admission, deletion).
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// A match-level error (submission, resolution, lifecycle).
    #[error(transparent)]
    Match(#[from] MatchError),

    /// An identity or profile error (sign-in, writebacks, upgrades).
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// A store-level error that surfaced directly.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WarchestError {
    /// `true` for the informational double-submission case — clients show
    /// a notice, not a failure.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Match(MatchError::AlreadySubmitted { .. })
        )
    }
}
