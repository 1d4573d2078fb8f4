//! # Mile Game Client
//!
//! Client core for the party quiz: registration, scoring, saved progress and
//! the realtime ranking feed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MILE GAME CLIENT                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/           - Domain logic (no I/O)                     │
//! │  ├── player.rs   - Player identity                           │
//! │  ├── answers.rs  - Answer sets and answer key                │
//! │  ├── score.rs    - Score engine                              │
//! │  ├── registry.rs - Current-player registration               │
//! │  └── ranking.rs  - Ranking store and ordering                │
//! │                                                              │
//! │  network/        - Networking                                │
//! │  ├── api.rs      - REST client                               │
//! │  ├── protocol.rs - Feed message types                        │
//! │  ├── transport.rs- WebSocket transport                       │
//! │  └── channel.rs  - Reconnecting ranking channel              │
//! │                                                              │
//! │  storage.rs      - Saved progress                            │
//! │  session.rs      - Session wiring                            │
//! │  config.rs       - Environment configuration                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Guarantee
//!
//! The ranking is always sorted by score descending. Equal scores keep the
//! order in which players were first seen, so ties never reshuffle between
//! updates. Feed frames are applied on one task in arrival order.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod game;
pub mod network;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::ClientConfig;
pub use game::{AnswerKey, AnswerSet, Player, PlayerId, RankingEntry, RankingStore, compute_score};
pub use network::{ChannelConfig, ChannelEvent, ConnectionState, RealtimeChannel};
pub use session::{GameSession, SessionError, Submission};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Progress};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
