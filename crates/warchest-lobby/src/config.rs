//! Lobby configuration.

use serde::{Deserialize, Serialize};

/// Settings for the room lobby.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Maximum length of a room display name, in characters.
    pub max_name_len: usize,

    /// Base URL that share links are derived from.
    pub share_base_url: String,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            max_name_len: 50,
            share_base_url: "https://warchest.example/rooms".to_string(),
        }
    }
}
