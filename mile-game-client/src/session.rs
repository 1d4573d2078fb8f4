//! Game Session
//!
//! Wires the registry, ranking store, scoring and persistence together for
//! one player session. Every collaborator is owned here or passed in; there
//! is no global state.

use thiserror::Error;
use tracing::{info, warn, instrument};

use crate::game::answers::{AnswerKey, AnswerSet};
use crate::game::player::Player;
use crate::game::ranking::RankingStore;
use crate::game::registry::{PlayerRegistry, RegistrationError, ValidationError};
use crate::game::score::compute_score;
use crate::network::api::{GameApi, RemoteError};
use crate::storage::{KeyValueStore, Progress, StorageError};

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Operation needs a registered player.
    #[error("No player registered")]
    NotRegistered,

    /// Invalid local input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Remote endpoint failed. Safe to retry.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Persisting progress failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<RegistrationError> for SessionError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(e) => Self::Validation(e),
            RegistrationError::Remote(e) => Self::Remote(e),
        }
    }
}

/// Outcome of a quiz submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    /// Score computed locally, shown while the request was in flight.
    pub local_score: u32,
    /// Authoritative score returned by the server.
    pub score: u32,
}

/// One player's session.
pub struct GameSession<A: GameApi, S: KeyValueStore> {
    api: A,
    storage: S,
    key: AnswerKey,
    registry: PlayerRegistry,
    ranking: RankingStore,
    progress: Progress,
}

impl<A: GameApi, S: KeyValueStore> GameSession<A, S> {
    /// Create a session scored against `key`.
    pub fn new(api: A, storage: S, key: AnswerKey) -> Self {
        Self {
            api,
            storage,
            key,
            registry: PlayerRegistry::new(),
            ranking: RankingStore::new(),
            progress: Progress::default(),
        }
    }

    /// Resume from saved progress. Returns the restored player, if any.
    pub fn restore(&mut self) -> Option<&Player> {
        self.progress = Progress::load(&self.storage);

        if let Some(id) = self.progress.player_id.clone() {
            let player = Player::new(
                id,
                self.progress.player_name.clone(),
                self.progress.avatar.clone(),
                self.progress.score,
            );
            info!("Restored player {} ({})", player.name, player.id);
            self.registry.restore(player);
        }

        self.registry.mark_current(&mut self.ranking);
        self.registry.current_player()
    }

    /// Register a new player.
    pub async fn register(&mut self, name: &str, avatar: &str) -> Result<Player, SessionError> {
        let player = self.registry.register(&self.api, name, avatar).await?;
        self.registry.mark_current(&mut self.ranking);

        self.progress = Progress {
            player_name: player.name.clone(),
            player_id: Some(player.id.clone()),
            avatar: player.avatar.clone(),
            ..Progress::default()
        };
        self.persist();
        Ok(player)
    }

    /// Score `answers` locally, then submit them for the authoritative score.
    ///
    /// Fails with [`SessionError::NotRegistered`] before contacting the
    /// server when no player is registered.
    #[instrument(skip(self, answers))]
    pub async fn submit_answers(&mut self, answers: &AnswerSet) -> Result<Submission, SessionError> {
        let player_id = self
            .registry
            .current_player_id()
            .cloned()
            .ok_or(SessionError::NotRegistered)?;

        let local_score = compute_score(answers, &self.key);
        self.registry.record_score(local_score);
        self.progress.answers = answers.clone();
        self.progress.score = local_score;
        self.persist();

        let response = self
            .api
            .submit_quiz(&player_id, &answers.for_submission())
            .await?;

        if response.score != local_score {
            info!("Server score {} differs from local {}", response.score, local_score);
        }
        self.registry.record_score(response.score);
        self.progress.score = response.score;
        self.progress.has_completed = true;
        self.persist();

        Ok(Submission {
            local_score,
            score: response.score,
        })
    }

    /// Seed the ranking store from the ranking endpoint.
    pub async fn seed_ranking(&mut self) -> Result<usize, SessionError> {
        let mut entries = self.api.get_ranking().await?;
        entries.sort_by_key(|e| e.position);

        self.ranking
            .apply_full_snapshot(entries.into_iter().map(|e| e.player));
        info!("Ranking seeded with {} players", self.ranking.len());
        Ok(self.ranking.len())
    }

    /// Forget the player and saved progress. Idempotent.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.registry.reset();
        self.registry.mark_current(&mut self.ranking);
        self.progress = Progress::default();
        Progress::clear(&mut self.storage)?;
        Ok(())
    }

    /// The player registry.
    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    /// The ranking store.
    pub fn ranking(&self) -> &RankingStore {
        &self.ranking
    }

    /// Mutable ranking store, for the realtime channel to apply updates.
    pub fn ranking_mut(&mut self) -> &mut RankingStore {
        &mut self.ranking
    }

    /// Saved progress as last loaded or written.
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// The answer key in use.
    pub fn answer_key(&self) -> &AnswerKey {
        &self.key
    }

    /// The remote API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Persistence failures never fail the operation that triggered them.
    fn persist(&mut self) {
        if let Err(e) = self.progress.save(&mut self.storage) {
            warn!("Could not save progress: {}", e);
        }
    }
}
