//! Identity hook: opaque token → stable player identity.
//!
//! Warchest doesn't implement authentication itself — that belongs to
//! whatever provider the deployment uses. This module defines the
//! [`IdentityProvider`] trait: a single async method that takes a token
//! string and returns the player's id and display name. The core trusts
//! the result without further verification.

use warchest_types::PlayerId;

use crate::ProfileError;

/// What the identity provider knows about a signed-in player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub player_id: PlayerId,
    pub display_name: String,
}

/// Resolves a client's opaque token into a stable identity.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` — the provider is shared across async tasks
/// and lives as long as the service.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Resolves the given token.
    ///
    /// # Errors
    /// [`ProfileError::IdentityRejected`] if the token is invalid.
    fn resolve(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerIdentity, ProfileError>> + Send;
}

/// Development/test provider: accepts `"<id>:<name>"` or a bare numeric
/// id (display name defaults to `player-<id>`). Never use in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevIdentity;

impl IdentityProvider for DevIdentity {
    async fn resolve(&self, token: &str) -> Result<PlayerIdentity, ProfileError> {
        let (id_part, name) = match token.split_once(':') {
            Some((id, name)) if !name.is_empty() => (id, name.to_string()),
            Some((_, _)) => {
                return Err(ProfileError::IdentityRejected(
                    "display name must not be empty".into(),
                ));
            }
            None => (token, String::new()),
        };

        let id: u64 = id_part.parse().map_err(|_| {
            ProfileError::IdentityRejected("token must start with a numeric id".into())
        })?;

        let display_name = if name.is_empty() {
            format!("player-{id}")
        } else {
            name
        };

        Ok(PlayerIdentity {
            player_id: PlayerId(id),
            display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_bare_numeric_token() {
        let identity = DevIdentity.resolve("42").await.unwrap();
        assert_eq!(identity.player_id, PlayerId(42));
        assert_eq!(identity.display_name, "player-42");
    }

    #[tokio::test]
    async fn test_resolve_token_with_name() {
        let identity = DevIdentity.resolve("7:alice").await.unwrap();
        assert_eq!(identity.player_id, PlayerId(7));
        assert_eq!(identity.display_name, "alice");
    }

    #[tokio::test]
    async fn test_resolve_rejects_non_numeric_id() {
        let result = DevIdentity.resolve("not-a-number").await;
        assert!(matches!(result, Err(ProfileError::IdentityRejected(_))));
    }

    #[tokio::test]
    async fn test_resolve_rejects_empty_name() {
        let result = DevIdentity.resolve("7:").await;
        assert!(matches!(result, Err(ProfileError::IdentityRejected(_))));
    }
}
