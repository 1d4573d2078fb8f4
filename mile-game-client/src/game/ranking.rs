//! Ranking Store
//!
//! Ordered view of every known player. Mutated only through
//! [`RankingStore::apply_full_snapshot`] and [`RankingStore::apply_delta`];
//! the sorted ranking is derived fresh on each read.
//!
//! Ties on score keep the order in which players were first observed,
//! so equal scores never swap places between updates.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::player::{Player, PlayerId};

/// A player paired with its 1-based rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// Rank, starting at 1.
    pub position: u32,
    /// The ranked player.
    pub player: Player,
}

/// Player plus the sequence number of its first observation.
#[derive(Debug, Clone)]
struct TrackedPlayer {
    seen_seq: u64,
    player: Player,
}

/// Live set of ranked players.
#[derive(Debug, Default)]
pub struct RankingStore {
    /// Players by id (ids are unique by construction).
    players: BTreeMap<PlayerId, TrackedPlayer>,
    /// Next observation sequence number.
    next_seq: u64,
    /// Local player, supplied by the registry for highlighting.
    current_player: Option<PlayerId>,
}

impl RankingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole player set.
    ///
    /// Players already known keep their first-seen order;
    /// players absent from `players` are dropped.
    pub fn apply_full_snapshot(&mut self, players: impl IntoIterator<Item = Player>) {
        let mut previous = std::mem::take(&mut self.players);

        for player in players {
            let seen_seq = match self.players.get(&player.id) {
                Some(tracked) => tracked.seen_seq,
                None => match previous.remove(&player.id) {
                    Some(tracked) => tracked.seen_seq,
                    None => self.bump_seq(),
                },
            };
            self.players.insert(player.id.clone(), TrackedPlayer { seen_seq, player });
        }

        debug!("Applied ranking snapshot: {} players ({} dropped)", self.players.len(), previous.len());
    }

    /// Upsert a single player by id.
    ///
    /// Known ids have their fields replaced in place; unknown ids are appended.
    pub fn apply_delta(&mut self, update: Player) {
        if let Some(tracked) = self.players.get_mut(&update.id) {
            tracked.player = update;
            return;
        }

        let seen_seq = self.bump_seq();
        self.players.insert(update.id.clone(), TrackedPlayer { seen_seq, player: update });
    }

    /// Players sorted by score (descending), ties by first observation.
    pub fn sorted_ranking(&self) -> Vec<RankingEntry> {
        let mut tracked: Vec<&TrackedPlayer> = self.players.values().collect();
        tracked.sort_by(|a, b| {
            b.player.score
                .cmp(&a.player.score)
                .then(a.seen_seq.cmp(&b.seen_seq))
        });

        tracked
            .into_iter()
            .enumerate()
            .map(|(i, t)| RankingEntry {
                position: i as u32 + 1,
                player: t.player.clone(),
            })
            .collect()
    }

    /// Mark which player is the local user. Not validated against the set.
    pub fn set_current_player(&mut self, id: Option<PlayerId>) {
        self.current_player = id;
    }

    /// Local player id, if any.
    pub fn current_player(&self) -> Option<&PlayerId> {
        self.current_player.as_ref()
    }

    /// Whether `id` is the local user.
    pub fn is_current(&self, id: &PlayerId) -> bool {
        self.current_player.as_ref() == Some(id)
    }

    /// The local user's ranking entry, if they are in the set.
    pub fn current_entry(&self) -> Option<RankingEntry> {
        let current = self.current_player.as_ref()?;
        self.sorted_ranking()
            .into_iter()
            .find(|entry| &entry.player.id == current)
    }

    /// Look up a player by id.
    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id).map(|t| &t.player)
    }

    /// Number of known players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no players are known.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Forget every player. The current-player marker is kept.
    pub fn clear(&mut self) {
        self.players.clear();
        self.next_seq = 0;
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, score: u32) -> Player {
        Player::new(id, id.to_uppercase(), "👤", score)
    }

    fn order(store: &RankingStore) -> Vec<(u32, String)> {
        store
            .sorted_ranking()
            .into_iter()
            .map(|e| (e.position, e.player.id.to_string()))
            .collect()
    }

    #[test]
    fn test_snapshot_tie_keeps_observation_order() {
        let mut store = RankingStore::new();
        store.apply_full_snapshot(vec![player("p1", 10), player("p2", 10)]);

        assert_eq!(order(&store), vec![(1, "p1".into()), (2, "p2".into())]);
    }

    #[test]
    fn test_sorted_descending() {
        let mut store = RankingStore::new();
        store.apply_full_snapshot(vec![player("a", 3), player("b", 9), player("c", 5)]);

        assert_eq!(
            order(&store),
            vec![(1, "b".into()), (2, "c".into()), (3, "a".into())]
        );
    }

    #[test]
    fn test_delta_unknown_appends() {
        let mut store = RankingStore::new();
        store.apply_full_snapshot(vec![player("a", 5)]);
        store.apply_delta(player("b", 5));

        assert_eq!(store.len(), 2);
        assert_eq!(order(&store), vec![(1, "a".into()), (2, "b".into())]);
    }

    #[test]
    fn test_delta_known_updates_in_place() {
        let mut store = RankingStore::new();
        store.apply_full_snapshot(vec![player("a", 5), player("b", 2)]);

        let mut updated = player("b", 8);
        updated.avatar = "🦊".to_string();
        store.apply_delta(updated);

        assert_eq!(store.len(), 2);
        let b = store.get(&PlayerId::from("b")).unwrap();
        assert_eq!(b.score, 8);
        assert_eq!(b.avatar, "🦊");
        assert_eq!(store.get(&PlayerId::from("a")).unwrap().score, 5);
        assert_eq!(order(&store)[0].1, "b");
    }

    #[test]
    fn test_tie_order_survives_later_snapshots() {
        let mut store = RankingStore::new();
        store.apply_delta(player("a", 1));
        store.apply_delta(player("b", 1));

        // Server lists b first this time; a was observed first and stays ahead.
        store.apply_full_snapshot(vec![player("b", 4), player("a", 4), player("c", 4)]);
        assert_eq!(
            order(&store),
            vec![(1, "a".into()), (2, "b".into()), (3, "c".into())]
        );
    }

    #[test]
    fn test_snapshot_drops_missing_players() {
        let mut store = RankingStore::new();
        store.apply_full_snapshot(vec![player("a", 1), player("b", 2)]);
        store.apply_full_snapshot(vec![player("b", 2)]);

        assert_eq!(store.len(), 1);
        assert!(store.get(&PlayerId::from("a")).is_none());
    }

    #[test]
    fn test_snapshot_duplicate_ids_collapse() {
        let mut store = RankingStore::new();
        store.apply_full_snapshot(vec![player("a", 1), player("b", 2), player("a", 7)]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&PlayerId::from("a")).unwrap().score, 7);
        assert_eq!(order(&store), vec![(1, "a".into()), (2, "b".into())]);
    }

    #[test]
    fn test_current_player_highlight() {
        let mut store = RankingStore::new();
        store.apply_full_snapshot(vec![player("a", 1), player("b", 2)]);
        assert!(store.current_entry().is_none());

        store.set_current_player(Some(PlayerId::from("a")));
        assert!(store.is_current(&PlayerId::from("a")));
        assert!(!store.is_current(&PlayerId::from("b")));
        assert_eq!(store.current_entry().unwrap().position, 2);

        // Marker is not validated against the set.
        store.set_current_player(Some(PlayerId::from("ghost")));
        assert!(store.current_entry().is_none());
    }

    #[test]
    fn test_ranking_entry_wire_shape() {
        let json = r#"{"position":1,"player":{"id":"p1","name":"Ana","avatar":"👩","score":3}}"#;
        let entry: RankingEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.position, 1);
        assert_eq!(entry.player.id.as_str(), "p1");
    }
}
