//! Game Logic Module
//!
//! Player identity, quiz answers, scoring and the live ranking. No I/O
//! happens here apart from the registry's call into [`GameApi`].
//!
//! ## Module Structure
//!
//! - `player`: Player identity and profile
//! - `answers`: Answer sets and the answer key
//! - `score`: Score engine
//! - `registry`: Current-player registration
//! - `ranking`: Ranking store, ordering and tie-breaking
//!
//! [`GameApi`]: crate::network::api::GameApi

pub mod player;
pub mod answers;
pub mod score;
pub mod registry;
pub mod ranking;

// Re-export key types
pub use player::{Player, PlayerId};
pub use answers::{AnswerSet, AnswerKey, sanitize_description};
pub use score::{compute_score, normalize};
pub use registry::{PlayerRegistry, RegistrationError, ValidationError};
pub use ranking::{RankingEntry, RankingStore};
