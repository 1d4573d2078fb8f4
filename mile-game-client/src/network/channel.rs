//! Realtime Ranking Channel
//!
//! One logical persistent connection to the ranking feed, with bounded
//! reconnection.
//!
//! ```text
//!            connect()                 open ok
//!   Idle ─────────────────▶ Connecting ─────────▶ Open
//!    ▲                        ▲    │                │
//!    │                        │    │ open failed    │ transport closed
//!    │          backoff timer │    ▼                ▼
//!    │          (retries > 0) └─ Closed { retry } ◀─┘
//!    │                                │
//!    └──── stays Closed when retries are exhausted, after disconnect()
//!          or after dispose(), until an explicit connect()
//! ```
//!
//! The pending reconnect lives inside the `Closed` phase, so the scheduled
//! retry and the connection state cannot drift apart. The channel is driven
//! one step at a time by [`RealtimeChannel::next_event`], which the caller
//! runs on a single task; inbound frames are therefore applied to the
//! [`RankingStore`] strictly in arrival order.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn, instrument};

use crate::game::ranking::RankingStore;
use crate::network::protocol::{FeedMessage, RankingUpdate};
use crate::network::transport::{
    Connector, FeedConnection, TransportError, TransportEvent, NORMAL_CLOSURE,
};

/// Default delay before a reconnection attempt.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(3000);

/// Default number of reconnection attempts.
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 5;

/// Public connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected.
    Idle,
    /// Opening the transport.
    Connecting,
    /// Transport open, receiving frames.
    Open,
    /// Transport gone (a reconnect may be pending).
    Closed,
}

/// Reconnection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Fixed backoff before each reconnection attempt.
    pub reconnect_interval: Duration,
    /// Attempts allowed between two successful opens.
    pub max_attempts: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_attempts: DEFAULT_RECONNECT_ATTEMPTS,
        }
    }
}

// =============================================================================
// LISTENER
// =============================================================================

/// Callbacks fired by the channel. All default to no-ops.
pub trait ChannelListener {
    /// Transport opened.
    fn on_open(&mut self) {}

    /// A ranking update was applied to the store.
    fn on_message(&mut self, _update: &RankingUpdate) {}

    /// Transport closed (for any reason).
    fn on_close(&mut self) {}

    /// Transport error. Never closes the channel by itself.
    fn on_error(&mut self, _error: &TransportError) {}
}

impl ChannelListener for () {}

/// Listener that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl ChannelListener for TracingListener {
    fn on_open(&mut self) {
        info!("Ranking feed online");
    }

    fn on_message(&mut self, update: &RankingUpdate) {
        debug!("Ranking update with {} entries", update.ranking.len());
    }

    fn on_close(&mut self) {
        warn!("Ranking feed offline");
    }

    fn on_error(&mut self, error: &TransportError) {
        warn!("Ranking feed error: {}", error);
    }
}

// =============================================================================
// LIFECYCLE (no I/O)
// =============================================================================

/// A scheduled reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Retry {
    attempt: u32,
    at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Connecting,
    Open,
    Closed { retry: Option<Retry> },
}

/// Connection state machine and reconnection bookkeeping.
#[derive(Debug)]
struct Lifecycle {
    phase: Phase,
    attempts: u32,
    config: ChannelConfig,
    alive: bool,
}

impl Lifecycle {
    fn new(config: ChannelConfig) -> Self {
        Self {
            phase: Phase::Idle,
            attempts: 0,
            config,
            alive: true,
        }
    }

    fn state(&self) -> ConnectionState {
        match self.phase {
            Phase::Idle => ConnectionState::Idle,
            Phase::Connecting => ConnectionState::Connecting,
            Phase::Open => ConnectionState::Open,
            Phase::Closed { .. } => ConnectionState::Closed,
        }
    }

    /// `Idle/Closed -> Connecting`. Refused while connecting, open or disposed.
    fn begin_connect(&mut self) -> bool {
        if !self.alive || matches!(self.phase, Phase::Connecting | Phase::Open) {
            return false;
        }
        self.phase = Phase::Connecting;
        true
    }

    /// `Closed { retry } -> Connecting` once the backoff elapsed.
    fn fire_retry(&mut self) -> bool {
        if !self.alive || !matches!(self.phase, Phase::Closed { retry: Some(_) }) {
            return false;
        }
        self.phase = Phase::Connecting;
        true
    }

    /// `Connecting -> Open`.
    fn opened(&mut self) {
        self.phase = Phase::Open;
        self.attempts = 0;
    }

    /// `Open/Connecting -> Closed`, scheduling a retry if any remain.
    fn closed(&mut self, now: Instant) -> Option<Retry> {
        let retry = if self.alive && self.attempts < self.config.max_attempts {
            self.attempts += 1;
            Some(Retry {
                attempt: self.attempts,
                at: now + self.config.reconnect_interval,
            })
        } else {
            None
        };
        self.phase = Phase::Closed { retry };
        retry
    }

    /// Exhaust the retry budget and drop any pending retry.
    fn suppress_reconnect(&mut self) {
        self.attempts = self.config.max_attempts;
        if matches!(self.phase, Phase::Closed { .. } | Phase::Connecting) {
            self.phase = Phase::Closed { retry: None };
        }
    }

    fn dispose(&mut self) {
        self.alive = false;
        self.phase = Phase::Closed { retry: None };
    }
}

// =============================================================================
// CHANNEL
// =============================================================================

/// Result of one driver step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Transport opened.
    Opened,
    /// A ranking update was applied.
    Ranking {
        /// Players in the update.
        players: usize,
    },
    /// Keepalive or undecodable frame, ignored.
    Keepalive,
    /// Transport error reported to the listener.
    Error,
    /// Transport closed.
    Closed {
        /// Delay before the next attempt, if one is scheduled.
        reconnect_in: Option<Duration>,
    },
    /// Nothing to drive: idle, closed for good, or disposed.
    Idle,
}

/// Realtime ranking feed client.
pub struct RealtimeChannel<C: Connector, L: ChannelListener> {
    connector: C,
    listener: L,
    lifecycle: Lifecycle,
    url: Option<String>,
    /// The one live transport, if any.
    connection: Option<C::Connection>,
}

impl<C: Connector, L: ChannelListener> RealtimeChannel<C, L> {
    /// Create an idle channel.
    pub fn new(connector: C, listener: L, config: ChannelConfig) -> Self {
        Self {
            connector,
            listener,
            lifecycle: Lifecycle::new(config),
            url: None,
            connection: None,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.lifecycle.state()
    }

    /// Reconnection attempts since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.lifecycle.attempts
    }

    /// When the pending reconnect fires, if one is scheduled.
    pub fn pending_reconnect(&self) -> Option<Instant> {
        match self.lifecycle.phase {
            Phase::Closed { retry: Some(retry) } => Some(retry.at),
            _ => None,
        }
    }

    /// False once [`RealtimeChannel::dispose`] has run.
    pub fn is_alive(&self) -> bool {
        self.lifecycle.alive
    }

    /// Feed URL of the last `connect`.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The registered listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Open the feed at `url`.
    ///
    /// Returns `None` (and opens nothing) while already connecting or open,
    /// or after disposal. While connecting, `url` still replaces the target
    /// so that the attempt resumed by [`RealtimeChannel::next_event`] uses it.
    #[instrument(skip(self))]
    pub async fn connect(&mut self, url: &str) -> Option<ChannelEvent> {
        if !self.lifecycle.begin_connect() {
            if self.lifecycle.alive && self.state() == ConnectionState::Connecting {
                self.url = Some(url.to_string());
            }
            debug!("Connect ignored in state {:?}", self.state());
            return None;
        }
        self.url = Some(url.to_string());
        Some(self.open_transport().await)
    }

    /// Drive the channel one step: read a frame, or wait out the backoff and
    /// reconnect. Frames are applied to `store` before `on_message` fires.
    ///
    /// Returns [`ChannelEvent::Idle`] immediately when there is nothing to
    /// drive. Cancel-safe: dropping the future mid-backoff keeps the
    /// scheduled deadline.
    pub async fn next_event(&mut self, store: &mut RankingStore) -> ChannelEvent {
        if !self.lifecycle.alive {
            return ChannelEvent::Idle;
        }

        let phase = self.lifecycle.phase;
        match phase {
            Phase::Open => self.read_frame(store).await,
            // An open attempt whose future was dropped; start it again.
            Phase::Connecting => self.open_transport().await,
            Phase::Closed { retry: Some(retry) } => {
                tokio::time::sleep_until(retry.at).await;
                if !self.lifecycle.fire_retry() {
                    return ChannelEvent::Idle;
                }
                info!(
                    "Reconnect attempt {}/{}",
                    retry.attempt, self.lifecycle.config.max_attempts
                );
                self.open_transport().await
            }
            Phase::Idle | Phase::Closed { retry: None } => ChannelEvent::Idle,
        }
    }

    /// Close the feed and suppress any reconnection.
    ///
    /// The only way to stop auto-reconnect short of disposal.
    #[instrument(skip(self))]
    pub async fn disconnect(&mut self) {
        self.lifecycle.suppress_reconnect();

        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.close(NORMAL_CLOSURE, "Manual disconnect").await {
                warn!("Error closing ranking feed: {}", e);
            }
            self.handle_close();
        }
    }

    /// Tear the channel down for good.
    ///
    /// No callback fires and no reconnect is scheduled afterwards, even if
    /// one was pending.
    pub async fn dispose(&mut self) {
        self.lifecycle.dispose();

        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.close(NORMAL_CLOSURE, "Client disposed").await {
                debug!("Error closing ranking feed on dispose: {}", e);
            }
        }
        debug!("Ranking channel disposed");
    }

    async fn open_transport(&mut self) -> ChannelEvent {
        let Some(url) = self.url.clone() else {
            self.lifecycle.phase = Phase::Idle;
            return ChannelEvent::Idle;
        };

        info!("Connecting to ranking feed at {}", url);
        match self.connector.open(&url).await {
            Ok(connection) => {
                self.lifecycle.opened();
                info!("Ranking feed connected");
                self.connection = Some(connection);
                self.notify(|l| l.on_open());
                ChannelEvent::Opened
            }
            Err(e) => {
                warn!("Ranking feed connection failed: {}", e);
                self.notify(|l| l.on_error(&e));
                self.handle_close()
            }
        }
    }

    async fn read_frame(&mut self, store: &mut RankingStore) -> ChannelEvent {
        let Some(connection) = self.connection.as_mut() else {
            return self.handle_close();
        };

        match connection.next_event().await {
            TransportEvent::Text(text) => match FeedMessage::decode(&text) {
                Some(FeedMessage::RankingUpdate(update)) => {
                    let players = update.players();
                    let count = players.len();
                    store.apply_full_snapshot(players);
                    self.notify(|l| l.on_message(&update));
                    ChannelEvent::Ranking { players: count }
                }
                None => {
                    debug!("Ignoring keepalive frame ({} bytes)", text.len());
                    ChannelEvent::Keepalive
                }
            },
            TransportEvent::Keepalive => ChannelEvent::Keepalive,
            TransportEvent::Error(e) => {
                warn!("Ranking feed transport error: {}", e);
                self.notify(|l| l.on_error(&e));
                ChannelEvent::Error
            }
            TransportEvent::Closed { code } => {
                info!("Ranking feed closed (code {:?})", code);
                self.handle_close()
            }
        }
    }

    fn handle_close(&mut self) -> ChannelEvent {
        self.connection = None;
        let retry = self.lifecycle.closed(Instant::now());
        self.notify(|l| l.on_close());

        match retry {
            Some(retry) => {
                info!(
                    "Reconnecting in {:?} ({}/{})",
                    self.lifecycle.config.reconnect_interval,
                    retry.attempt,
                    self.lifecycle.config.max_attempts
                );
                ChannelEvent::Closed {
                    reconnect_in: Some(self.lifecycle.config.reconnect_interval),
                }
            }
            None => {
                if self.lifecycle.alive && self.lifecycle.attempts >= self.lifecycle.config.max_attempts {
                    info!("Ranking feed stays closed (no reconnection attempts left)");
                }
                ChannelEvent::Closed { reconnect_in: None }
            }
        }
    }

    /// Invoke a listener callback unless disposed.
    fn notify(&mut self, callback: impl FnOnce(&mut L)) {
        if self.lifecycle.alive {
            callback(&mut self.listener);
        }
    }
}
