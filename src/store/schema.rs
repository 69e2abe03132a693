use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Session;
use crate::config::Difficulty;
use crate::session::result::RunResult;

pub const SCHEMA_VERSION: u32 = 1;

/// Unlock table keyed by session key, then difficulty key.
pub type UnlockTable = BTreeMap<String, BTreeMap<String, usize>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default, alias = "total_exp")]
    pub total_experience: u64,
    #[serde(default)]
    pub sessions: UnlockTable,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Progress {
    fn default() -> Self {
        let mut sessions = UnlockTable::new();
        for &session in Session::all() {
            let per_difficulty = Difficulty::all()
                .iter()
                .map(|d| (d.to_key().to_string(), 0))
                .collect();
            sessions.insert(session.to_key().to_string(), per_difficulty);
        }
        Self {
            schema_version: SCHEMA_VERSION,
            total_experience: 0,
            sessions,
            last_played: None,
        }
    }
}

impl Progress {
    /// Backfill sessions and difficulties missing from `loaded` with the
    /// entries of `defaults`. Entries present in `loaded` win.
    pub fn merge(loaded: Progress, defaults: Progress) -> Progress {
        let mut merged = loaded;
        for (session, per_difficulty) in defaults.sessions {
            let entry = merged.sessions.entry(session).or_default();
            for (difficulty, index) in per_difficulty {
                entry.entry(difficulty).or_insert(index);
            }
        }
        merged.schema_version = SCHEMA_VERSION;
        merged
    }

    pub fn highest_unlocked(&self, session: Session, difficulty: Difficulty) -> usize {
        self.sessions
            .get(session.to_key())
            .and_then(|d| d.get(difficulty.to_key()))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_unlocked(&self, session: Session, difficulty: Difficulty, course_index: usize) -> bool {
        course_index <= self.highest_unlocked(session, difficulty)
    }

    /// Apply a finished run. Experience always grows by the score; the next
    /// course unlocks only when the run cleared. Returns true if the unlock
    /// table changed.
    pub fn record_run(&mut self, result: &RunResult) -> bool {
        self.total_experience = self.total_experience.saturating_add(result.score);
        self.last_played = Some(result.timestamp);

        if !result.cleared() {
            return false;
        }

        let slot = self
            .sessions
            .entry(result.session.to_key().to_string())
            .or_default()
            .entry(result.difficulty.to_key().to_string())
            .or_insert(0);
        let unlocked = result.course_index + 1;
        if unlocked > *slot {
            *slot = unlocked;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunHistoryData {
    pub schema_version: u32,
    pub runs: Vec<RunResult>,
}

impl Default for RunHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            runs: Vec::new(),
        }
    }
}
