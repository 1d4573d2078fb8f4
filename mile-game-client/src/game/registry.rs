//! Player Registry
//!
//! Holds the local player and the identifier the registration endpoint
//! assigned to it. The registry is the only writer of the
//! "current player" marker on the ranking store.

use thiserror::Error;
use tracing::{info, instrument};

use crate::game::player::{Player, PlayerId};
use crate::game::ranking::RankingStore;
use crate::network::api::{GameApi, RemoteError};

/// Invalid local input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name was empty after trimming.
    #[error("player name must not be empty")]
    EmptyName,
}

/// Registration failures.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Rejected locally before any remote call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The registration endpoint failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Local player state for one session.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    current: Option<Player>,
}

impl PlayerRegistry {
    /// Create an empty registry (no player).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new player through `api`.
    ///
    /// The name is validated before the endpoint is contacted. On success the
    /// returned id becomes the current player until [`PlayerRegistry::reset`].
    #[instrument(skip(self, api))]
    pub async fn register<A: GameApi>(
        &mut self,
        api: &A,
        name: &str,
        avatar: &str,
    ) -> Result<Player, RegistrationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let player = api.create_player(name, avatar).await?;
        info!("Registered player {} ({})", player.name, player.id);

        self.current = Some(player.clone());
        Ok(player)
    }

    /// Adopt a previously registered player (e.g. restored from storage).
    pub fn restore(&mut self, player: Player) {
        self.current = Some(player);
    }

    /// Identifier of the current player.
    pub fn current_player_id(&self) -> Option<&PlayerId> {
        self.current.as_ref().map(|p| &p.id)
    }

    /// The current player, including cached name and score.
    pub fn current_player(&self) -> Option<&Player> {
        self.current.as_ref()
    }

    /// Cache a score for the current player. Ignored without a player.
    pub fn record_score(&mut self, score: u32) {
        if let Some(player) = self.current.as_mut() {
            player.score = score;
        }
    }

    /// Push the current-player marker into `store`.
    pub fn mark_current(&self, store: &mut RankingStore) {
        store.set_current_player(self.current_player_id().cloned());
    }

    /// Return to the initial, unregistered state. Idempotent.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::api::testing::MockApi;

    #[tokio::test]
    async fn test_register_assigns_current_player() {
        let api = MockApi::new();
        let mut registry = PlayerRegistry::new();

        let player = registry.register(&api, "  Ana ", "👩").await.unwrap();
        assert_eq!(player.id.as_str(), "p1");
        assert_eq!(player.name, "Ana");
        assert_eq!(registry.current_player_id(), Some(&PlayerId::from("p1")));
    }

    #[tokio::test]
    async fn test_empty_name_rejected_before_remote_call() {
        let api = MockApi::new();
        let mut registry = PlayerRegistry::new();

        let result = registry.register(&api, "   ", "👩").await;
        assert!(matches!(
            result,
            Err(RegistrationError::Validation(ValidationError::EmptyName))
        ));
        assert_eq!(api.calls(), 0);
        assert!(registry.current_player_id().is_none());
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_registry_empty() {
        let api = MockApi::new().failing();
        let mut registry = PlayerRegistry::new();

        let result = registry.register(&api, "Ana", "").await;
        assert!(matches!(result, Err(RegistrationError::Remote(_))));
        assert!(registry.current_player().is_none());
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let api = MockApi::new();
        let mut registry = PlayerRegistry::new();
        registry.register(&api, "Ana", "").await.unwrap();
        registry.record_score(9);
        assert_eq!(registry.current_player().unwrap().score, 9);

        registry.reset();
        registry.reset();
        assert!(registry.current_player().is_none());

        // Scores are dropped without a player.
        registry.record_score(3);
        assert!(registry.current_player().is_none());
    }

    #[test]
    fn test_mark_current_on_store() {
        let mut registry = PlayerRegistry::new();
        let mut store = RankingStore::new();
        registry.restore(Player::new("p7", "Eva", "", 0));

        registry.mark_current(&mut store);
        assert!(store.is_current(&PlayerId::from("p7")));

        registry.reset();
        registry.mark_current(&mut store);
        assert!(store.current_player().is_none());
    }
}
