//! High score leaderboard
//!
//! In-memory top 10, fed from the session's game-over report. Hosts that want
//! persistence can serialize the table themselves.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    pub kills: u32,
    /// Difficulty level reached
    pub difficulty: u32,
    /// Host-supplied timestamp in milliseconds
    pub timestamp: u64,
}

/// High score leaderboard, sorted by descending score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run. Returns the rank achieved (1-indexed), if any.
    pub fn record(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.score)?;
        // Ties keep the earlier run ahead
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("New high score #{} ({} points)", rank, self.entries[rank - 1].score);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let mut table: HighScores = serde_json::from_str(json)
            .map_err(|source| SimError::Parse { what: "high scores", source })?;
        table.entries.sort_by(|a, b| b.score.cmp(&a.score));
        table.entries.truncate(MAX_HIGH_SCORES);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u64) -> HighScoreEntry {
        HighScoreEntry {
            score,
            kills: 1,
            difficulty: 1,
            timestamp: 0,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut table = HighScores::new();
        assert!(!table.qualifies(0));
        assert_eq!(table.record(entry(0)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_sorted_and_capped() {
        let mut table = HighScores::new();
        for score in 1..=12 {
            table.record(entry(score * 100));
        }
        assert_eq!(table.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(table.top_score(), Some(1200));
        assert_eq!(table.entries.last().map(|e| e.score), Some(300));
        assert!(!table.qualifies(300));
        assert_eq!(table.potential_rank(650), Some(7));
    }

    #[test]
    fn test_tie_ranks_below_existing() {
        let mut table = HighScores::new();
        table.record(entry(500));
        let mut later = entry(500);
        later.timestamp = 9;
        assert_eq!(table.record(later), Some(2));
        assert_eq!(table.entries[0].timestamp, 0);
    }

    #[test]
    fn test_json_restores_order() {
        let json = r#"{"entries":[
            {"score":10,"kills":1,"difficulty":1,"timestamp":0},
            {"score":90,"kills":4,"difficulty":2,"timestamp":5}
        ]}"#;
        let table = HighScores::from_json(json).unwrap();
        assert_eq!(table.top_score(), Some(90));
        assert!(HighScores::from_json("[").is_err());
    }
}
