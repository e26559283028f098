//! Score board
//!
//! In-memory top-10 table kept by the controller across restarts.

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u64,
    /// Level reached (1-based)
    pub level: u32,
    pub difficulty: Difficulty,
    /// True if the run cleared the final level
    pub won: bool,
}

/// High score table, sorted descending by score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    entries: Vec<ScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Check if a score would make the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run. Returns the rank achieved, if any.
    ///
    /// Ties keep the earlier run ahead.
    pub fn record(&mut self, entry: ScoreEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.score)?;
        log::info!(
            "High score #{}: {} (level {}, {})",
            rank,
            format_score(entry.score),
            entry.level,
            entry.difficulty.as_str()
        );
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Six-digit zero padded score, as shown on the HUD
pub fn format_score(score: u64) -> String {
    format!("{:06}", score)
}
