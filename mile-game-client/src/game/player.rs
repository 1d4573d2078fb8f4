//! Player Model
//!
//! Players as the remote endpoints describe them.

use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

// =============================================================================
// PLAYER ID
// =============================================================================

/// Server-assigned player identifier.
///
/// Opaque to the client: compared and echoed back, never parsed.
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// PLAYER
// =============================================================================

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Identifier assigned at registration. Immutable.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Avatar symbol (usually an emoji).
    #[serde(default)]
    pub avatar: String,
    /// Current score.
    #[serde(default)]
    pub score: u32,
    /// Registration time, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Player {
    /// Create a player with no registration timestamp.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, avatar: impl Into<String>, score: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: avatar.into(),
            score,
            created_at: None,
        }
    }
}
