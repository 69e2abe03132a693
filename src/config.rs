use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::rank::RankThreshold;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn to_key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Normal, Difficulty::Hard]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    pub points_per_char: u32,
    /// Seconds allowed per problem.
    pub problem_secs: u32,
    /// Seconds allowed for the whole run when the run timer is enabled.
    pub run_secs: u32,
    /// Clear threshold under the fixed policy.
    pub clear_score: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTable {
    #[serde(default = "default_easy")]
    pub easy: DifficultySettings,
    #[serde(default = "default_normal")]
    pub normal: DifficultySettings,
    #[serde(default = "default_hard")]
    pub hard: DifficultySettings,
}

impl DifficultyTable {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultySettings {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }

    fn get_mut(&mut self, difficulty: Difficulty) -> &mut DifficultySettings {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Normal => &mut self.normal,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: default_easy(),
            normal: default_normal(),
            hard: default_hard(),
        }
    }
}

fn default_easy() -> DifficultySettings {
    DifficultySettings {
        points_per_char: 10,
        problem_secs: 15,
        run_secs: 120,
        clear_score: 600,
    }
}
fn default_normal() -> DifficultySettings {
    DifficultySettings {
        points_per_char: 20,
        problem_secs: 10,
        run_secs: 90,
        clear_score: 1200,
    }
}
fn default_hard() -> DifficultySettings {
    DifficultySettings {
        points_per_char: 30,
        problem_secs: 7,
        run_secs: 60,
        clear_score: 1800,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearThresholdPolicy {
    /// Per-difficulty constant (`clear_score`).
    Fixed,
    /// Fraction of the maximum base score of the drawn problems.
    DynamicFraction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPolicy {
    Full,
    RandomFraction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerDiscipline {
    /// One single-shot deadline per problem.
    Deadline,
    /// One tick per second with a visible countdown.
    Countdown,
}

/// The knobs on which the game variants differ.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunPolicy {
    pub clear_threshold: ClearThresholdPolicy,
    pub clear_fraction: f64,
    pub run_timer: bool,
    pub sampling: SamplingPolicy,
    pub sample_fraction: f64,
    pub shuffle: bool,
    pub problem_timer: TimerDiscipline,
    pub miss_penalty_secs: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_difficulty")]
    pub default_difficulty: Difficulty,
    #[serde(default)]
    pub problems_dir: Option<String>,
    #[serde(default = "default_clear_threshold")]
    pub clear_threshold: ClearThresholdPolicy,
    #[serde(default = "default_clear_fraction")]
    pub clear_fraction: f64,
    #[serde(default = "default_run_timer")]
    pub run_timer: bool,
    #[serde(default = "default_sampling")]
    pub sampling: SamplingPolicy,
    #[serde(default = "default_sample_fraction")]
    pub sample_fraction: f64,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    #[serde(default = "default_problem_timer")]
    pub problem_timer: TimerDiscipline,
    #[serde(default = "default_miss_penalty_secs")]
    pub miss_penalty_secs: u32,
    #[serde(default)]
    pub difficulty: DifficultyTable,
    #[serde(default = "default_ranks")]
    pub ranks: Vec<RankThreshold>,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_difficulty() -> Difficulty {
    Difficulty::Normal
}
fn default_clear_threshold() -> ClearThresholdPolicy {
    ClearThresholdPolicy::DynamicFraction
}
fn default_clear_fraction() -> f64 {
    0.6
}
fn default_run_timer() -> bool {
    false
}
fn default_sampling() -> SamplingPolicy {
    SamplingPolicy::RandomFraction
}
fn default_sample_fraction() -> f64 {
    0.8
}
fn default_shuffle() -> bool {
    true
}
fn default_problem_timer() -> TimerDiscipline {
    TimerDiscipline::Countdown
}
fn default_miss_penalty_secs() -> u32 {
    1
}
fn default_ranks() -> Vec<RankThreshold> {
    [
        ("Novice", 0),
        ("Apprentice", 500),
        ("Adept", 2_000),
        ("Expert", 6_000),
        ("Master", 15_000),
        ("Legend", 40_000),
    ]
    .into_iter()
    .map(|(label, min)| RankThreshold::new(label, min))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_difficulty: default_difficulty(),
            problems_dir: None,
            clear_threshold: default_clear_threshold(),
            clear_fraction: default_clear_fraction(),
            run_timer: default_run_timer(),
            sampling: default_sampling(),
            sample_fraction: default_sample_fraction(),
            shuffle: default_shuffle(),
            problem_timer: default_problem_timer(),
            miss_penalty_secs: default_miss_penalty_secs(),
            difficulty: DifficultyTable::default(),
            ranks: default_ranks(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typequiz")
            .join("config.toml")
    }

    pub fn settings(&self, difficulty: Difficulty) -> &DifficultySettings {
        self.difficulty.get(difficulty)
    }

    pub fn problem_duration(&self, difficulty: Difficulty) -> Duration {
        Duration::from_secs(self.settings(difficulty).problem_secs.into())
    }

    pub fn policy(&self) -> RunPolicy {
        RunPolicy {
            clear_threshold: self.clear_threshold,
            clear_fraction: self.clear_fraction,
            run_timer: self.run_timer,
            sampling: self.sampling,
            sample_fraction: self.sample_fraction,
            shuffle: self.shuffle,
            problem_timer: self.problem_timer,
            miss_penalty_secs: self.miss_penalty_secs,
        }
    }

    /// Clamp values loaded from disk into usable ranges.
    pub fn validate(&mut self) {
        if !(self.clear_fraction > 0.0 && self.clear_fraction <= 1.0) {
            self.clear_fraction = default_clear_fraction();
        }
        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            self.sample_fraction = default_sample_fraction();
        }
        self.miss_penalty_secs = self.miss_penalty_secs.min(10);

        for &difficulty in Difficulty::all() {
            let settings = self.difficulty.get_mut(difficulty);
            settings.points_per_char = settings.points_per_char.clamp(1, 1000);
            settings.problem_secs = settings.problem_secs.clamp(1, 600);
            settings.run_secs = settings.run_secs.clamp(10, 3600);
            settings.clear_score = settings.clear_score.max(1);
        }

        // Rank lookup needs an ascending table starting at zero.
        self.ranks.sort_by_key(|r| r.min_experience);
        self.ranks.dedup_by_key(|r| r.min_experience);
        match self.ranks.first_mut() {
            Some(first) => first.min_experience = 0,
            None => self.ranks = default_ranks(),
        }
    }
}
