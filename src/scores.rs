//! Session leaderboard
//!
//! Tracks the best rounds of the current session, best first. Nothing is
//! persisted across process launches; `max_score` in the round state carries
//! the running best, this board keeps the history behind it.

use serde::{Deserialize, Serialize};

use crate::sim::TimeOfDay;

/// Maximum number of rounds to keep
pub const MAX_ENTRIES: usize = 10;

/// One finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEntry {
    /// Crossings completed
    pub score: u32,
    /// Backdrop phase when the round ended
    pub ended_at: TimeOfDay,
    /// Which round of the session this was (1-indexed)
    pub round: u32,
}

/// Best rounds of the session, sorted descending by score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub entries: Vec<RoundEntry>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score makes the board
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a finished round. Returns the rank achieved (1-indexed) or
    /// None if it didn't make the board.
    pub fn add_round(&mut self, score: u32, ended_at: TimeOfDay, round: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = RoundEntry {
            score,
            ended_at,
            round,
        };

        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score of the session (if any)
    pub fn best(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}
