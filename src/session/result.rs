use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Session;
use crate::config::Difficulty;
use crate::engine::scoring;
use crate::session::run::Run;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEnd {
    /// Score reached the clear threshold.
    Cleared,
    /// Every drawn problem was played.
    Exhausted,
    /// The run timer ran out.
    TimeUp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub session: Session,
    pub difficulty: Difficulty,
    pub course_index: usize,
    #[serde(default)]
    pub course_name: String,
    pub score: u64,
    pub clear_threshold: u64,
    pub end: RunEnd,
    pub misses: u32,
    pub typed: usize,
    #[serde(default)]
    pub perfect_problems: usize,
    pub problems_completed: usize,
    pub problems_total: usize,
    pub timestamp: DateTime<Utc>,
}

impl RunResult {
    pub fn from_run(run: &Run, end: RunEnd) -> Self {
        Self {
            session: run.session,
            difficulty: run.difficulty,
            course_index: run.course_index,
            course_name: run.course_name.clone(),
            score: run.score,
            clear_threshold: run.clear_threshold,
            end,
            misses: run.miss_count,
            typed: run.total_typed,
            perfect_problems: run.perfect_problems,
            problems_completed: run.problems_completed,
            problems_total: run.problems.len(),
            timestamp: Utc::now(),
        }
    }

    pub fn cleared(&self) -> bool {
        self.score >= self.clear_threshold
    }

    pub fn accuracy(&self) -> f64 {
        scoring::accuracy(self.typed, self.misses)
    }
}
