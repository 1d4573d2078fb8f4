//! Score Computation
//!
//! Pure, deterministic scoring of an [`AnswerSet`] against an [`AnswerKey`].
//!
//! - Favorites: 1 point when the trimmed, lowercased texts are equal.
//! - Preferences: 1 point on exact string equality.
//! - Description: never scored.

use crate::game::answers::{AnswerKey, AnswerSet};

/// Normalize free text for comparison (trim + lowercase).
#[inline]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Compute the score of `answers` against `key`.
///
/// Unknown question ids and unanswered questions award 0.
/// The result is always in `0..=key.max_score()`.
pub fn compute_score(answers: &AnswerSet, key: &AnswerKey) -> u32 {
    let favorites = answers
        .favorites
        .iter()
        .filter(|(question, given)| {
            key.favorites
                .get(*question)
                .is_some_and(|correct| normalize(correct) == normalize(given))
        })
        .count();

    let preferences = answers
        .preferences
        .iter()
        .filter(|(question, given)| {
            key.preferences.get(*question).is_some_and(|correct| correct == *given)
        })
        .count();

    (favorites + preferences) as u32
}
