//! Remote API Client
//!
//! One-shot requests to the game's REST endpoints: registration, quiz
//! submission and ranking fetch. Failures are returned to the caller;
//! nothing here retries.

use std::time::Duration;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn, instrument};

use crate::game::answers::AnswerSet;
use crate::game::player::{Player, PlayerId};
use crate::game::ranking::RankingEntry;

/// Header carrying the player id on quiz submission.
pub const PLAYER_ID_HEADER: &str = "X-Player-ID";

/// Remote endpoint failures.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Could not build the HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request never got a response (connect failure, timeout, ...).
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Response body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Body of `POST /players`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlayerRequest {
    /// Display name.
    pub name: String,
    /// Avatar, sent as-is. An empty one gets the server's default.
    #[serde(default)]
    pub avatar: String,
}

/// Response of `POST /quiz/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    /// Authoritative score.
    pub score: u32,
    /// Human-readable confirmation.
    #[serde(default)]
    pub message: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Reported status, `"ok"` when healthy.
    pub status: String,
}

// =============================================================================
// API TRAIT
// =============================================================================

/// The remote collaborators the core depends on.
#[allow(async_fn_in_trait)]
pub trait GameApi {
    /// Register a player; the server assigns the id.
    async fn create_player(&self, name: &str, avatar: &str) -> Result<Player, RemoteError>;

    /// Submit answers for `player_id`; returns the authoritative score.
    async fn submit_quiz(
        &self,
        player_id: &PlayerId,
        answers: &AnswerSet,
    ) -> Result<SubmitQuizResponse, RemoteError>;

    /// Fetch the full current ranking.
    async fn get_ranking(&self) -> Result<Vec<RankingEntry>, RemoteError>;

    /// Fetch one player.
    async fn get_player(&self, id: &PlayerId) -> Result<Player, RemoteError>;

    /// Fetch all players.
    async fn list_players(&self) -> Result<Vec<Player>, RemoteError>;

    /// Server liveness probe.
    async fn health(&self) -> Result<HealthStatus, RemoteError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// [`GameApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for `base_url` (e.g. `http://localhost:8080/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Configured API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Server root: the health check lives outside the `/api` prefix.
    fn root_url(&self, path: &str) -> String {
        let root = self.base_url.strip_suffix("/api").unwrap_or(&self.base_url);
        format!("{}{}", root, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = request.send().await.map_err(RemoteError::Network)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("API request failed with {}: {}", status, body);
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(RemoteError::Decode)
    }
}

impl GameApi for HttpApi {
    #[instrument(skip(self))]
    async fn create_player(&self, name: &str, avatar: &str) -> Result<Player, RemoteError> {
        let body = CreatePlayerRequest {
            name: name.to_string(),
            avatar: avatar.to_string(),
        };
        let request = self.http.post(self.url("/players")).json(&body);
        self.send_json(request).await
    }

    #[instrument(skip(self, answers))]
    async fn submit_quiz(
        &self,
        player_id: &PlayerId,
        answers: &AnswerSet,
    ) -> Result<SubmitQuizResponse, RemoteError> {
        let request = self
            .http
            .post(self.url("/quiz/submit"))
            .header(PLAYER_ID_HEADER, player_id.as_str())
            .json(answers);
        let response: SubmitQuizResponse = self.send_json(request).await?;
        debug!("Quiz accepted: score {} ({})", response.score, response.message);
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn get_ranking(&self) -> Result<Vec<RankingEntry>, RemoteError> {
        let request = self.http.get(self.url("/ranking"));
        self.send_json(request).await
    }

    #[instrument(skip(self))]
    async fn get_player(&self, id: &PlayerId) -> Result<Player, RemoteError> {
        let request = self.http.get(self.url(&format!("/players/{}", id)));
        self.send_json(request).await
    }

    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<Player>, RemoteError> {
        let request = self.http.get(self.url("/players"));
        self.send_json(request).await
    }

    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthStatus, RemoteError> {
        let request = self.http.get(self.root_url("/health"));
        self.send_json(request).await
    }
}

// =============================================================================
// TEST DOUBLE
// =============================================================================
