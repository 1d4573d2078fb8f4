//! Quiz Answers
//!
//! Candidate answer sets and the canonical answer key they are scored against.
//! Uses BTreeMap so serialized payloads have a stable field order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

/// Maximum description length (characters) kept after sanitizing.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

// =============================================================================
// ANSWER SET
// =============================================================================

/// A candidate's answers to the quiz.
///
/// Built up by the quiz front-end and consumed once at submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    /// Free-text answers keyed by question id.
    #[serde(default)]
    pub favorites: BTreeMap<String, String>,
    /// Fixed-option answers keyed by question id.
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
    /// Free-form description. Never scored.
    #[serde(default)]
    pub description: String,
}

impl AnswerSet {
    /// Create an empty answer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) a free-text answer.
    pub fn set_favorite(&mut self, question_id: impl Into<String>, value: impl Into<String>) {
        self.favorites.insert(question_id.into(), value.into());
    }

    /// Record (or overwrite) a fixed-option answer.
    pub fn set_preference(&mut self, question_id: impl Into<String>, value: impl Into<String>) {
        self.preferences.insert(question_id.into(), value.into());
    }

    /// Replace the description.
    pub fn set_description(&mut self, value: impl Into<String>) {
        self.description = value.into();
    }

    /// Copy of this set with the description sanitized for submission.
    pub fn for_submission(&self) -> Self {
        Self {
            favorites: self.favorites.clone(),
            preferences: self.preferences.clone(),
            description: sanitize_description(&self.description),
        }
    }
}

/// Trim, collapse whitespace runs and cap the description length.
pub fn sanitize_description(input: &str) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_DESCRIPTION_CHARS).collect::<String>().trim_end().to_string()
}

// =============================================================================
// ANSWER KEY
// =============================================================================

/// Canonical correct answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey {
    /// Correct free-text answers, compared case-insensitively.
    pub favorites: BTreeMap<String, String>,
    /// Correct options, compared exactly.
    pub preferences: BTreeMap<String, String>,
}

impl AnswerKey {
    /// Build a key from `(question, answer)` pairs.
    pub fn from_pairs<'a>(
        favorites: impl IntoIterator<Item = (&'a str, &'a str)>,
        preferences: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let owned = |(k, v): (&str, &str)| (k.to_string(), v.to_string());
        Self {
            favorites: favorites.into_iter().map(owned).collect(),
            preferences: preferences.into_iter().map(owned).collect(),
        }
    }

    /// Highest attainable score against this key.
    pub fn max_score(&self) -> u32 {
        (self.favorites.len() + self.preferences.len()) as u32
    }
}

impl Default for AnswerKey {
    /// The game's built-in key: 7 favorites and 6 preferences.
    fn default() -> Self {
        Self::from_pairs(
            [
                ("singer", "Taylor Swift"),
                ("flower", "Rosa"),
                ("drink", "Café"),
                ("disney", "La Sirenita"),
                ("season", "Primavera"),
                ("color", "Rosa"),
                ("dislike", "El desorden"),
            ],
            [
                ("coffee", "Café"),
                ("place", "Playa"),
                ("weather", "Calor"),
                ("time", "Noche"),
                ("food", "Sushi"),
                ("drink", "Vino"),
            ],
        )
    }
}
