//! Feed Protocol
//!
//! Wire format of the realtime ranking feed. Frames are JSON text:
//!
//! ```json
//! {"type": "ranking_update", "ranking": [{"position": 1, "player": {...}}]}
//! ```
//!
//! Anything that does not decode to a known message (empty strings, pings,
//! unknown types, malformed JSON) is a keepalive.

use serde::{Serialize, Deserialize};

use crate::game::player::Player;
use crate::game::ranking::RankingEntry;

/// Messages pushed by the server on the ranking feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    /// Complete current ranking.
    RankingUpdate(RankingUpdate),
}

/// Payload of a `ranking_update` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingUpdate {
    /// Every ranked player, in server order.
    pub ranking: Vec<RankingEntry>,
}

impl RankingUpdate {
    /// Players in server position order.
    pub fn players(&self) -> Vec<Player> {
        let mut entries: Vec<&RankingEntry> = self.ranking.iter().collect();
        entries.sort_by_key(|e| e.position);
        entries.into_iter().map(|e| e.player.clone()).collect()
    }
}

impl FeedMessage {
    /// Decode a text frame. `None` means keepalive.
    pub fn decode(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        serde_json::from_str(text).ok()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPDATE: &str = r#"{
        "type": "ranking_update",
        "ranking": [
            {"position": 2, "player": {"id": "p2", "name": "Eva", "avatar": "👧", "score": 4}},
            {"position": 1, "player": {"id": "p1", "name": "Ana", "avatar": "👩", "score": 9}}
        ]
    }"#;

    #[test]
    fn test_decode_ranking_update() {
        let Some(FeedMessage::RankingUpdate(update)) = FeedMessage::decode(UPDATE) else {
            panic!("expected ranking update");
        };
        assert_eq!(update.ranking.len(), 2);

        let ids: Vec<String> = update.players().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_keepalives() {
        assert!(FeedMessage::decode("").is_none());
        assert!(FeedMessage::decode("   ").is_none());
        assert!(FeedMessage::decode("ping").is_none());
        assert!(FeedMessage::decode("{not json").is_none());
        assert!(FeedMessage::decode(r#"{"type":"heartbeat"}"#).is_none());
        assert!(FeedMessage::decode(r#"{"type":"ranking_update"}"#).is_none());
    }

    #[test]
    fn test_encode_matches_wire_tag() {
        let msg = FeedMessage::RankingUpdate(RankingUpdate { ranking: vec![] });
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"ranking_update\""));
        assert_eq!(FeedMessage::decode(&json), Some(msg));
    }
}
