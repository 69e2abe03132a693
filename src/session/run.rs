use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::{Course, Problem, Session};
use crate::config::{ClearThresholdPolicy, Difficulty, DifficultySettings, RunPolicy, SamplingPolicy};
use crate::engine::scoring;

/// Typing state for the problem currently on screen.
#[derive(Clone, Debug)]
pub struct ProblemAttempt {
    pub problem: Problem,
    pub confirmed_len: usize,
    /// Highest prefix length that has earned points.
    pub scored_len: usize,
    pub perfect: bool,
    pub base_value: u64,
}

impl ProblemAttempt {
    pub fn new(problem: Problem, points_per_char: u32) -> Self {
        let base_value = scoring::problem_value(&problem.target, points_per_char);
        Self {
            problem,
            confirmed_len: 0,
            scored_len: 0,
            perfect: true,
            base_value,
        }
    }

    pub fn target(&self) -> &str {
        &self.problem.target
    }

    pub fn is_complete(&self) -> bool {
        self.confirmed_len >= self.problem.target.chars().count()
    }
}

pub struct Run {
    pub session: Session,
    pub difficulty: Difficulty,
    pub course_index: usize,
    pub course_name: String,
    pub monster: Option<String>,
    pub problems: Vec<Problem>,
    /// Index of the next problem to load.
    pub next_problem: usize,
    pub attempt: Option<ProblemAttempt>,
    pub score: u64,
    pub total_typed: usize,
    pub miss_count: u32,
    pub perfect_problems: usize,
    pub problems_completed: usize,
    pub clear_threshold: u64,
    pub monster_max_hp: u64,
    pub points_per_char: u32,
    /// Policy the run was started under.
    pub policy: RunPolicy,
    pub committed: bool,
}

impl Run {
    pub fn new<R: Rng>(
        session: Session,
        difficulty: Difficulty,
        course_index: usize,
        course: &Course,
        settings: &DifficultySettings,
        policy: &RunPolicy,
        rng: &mut R,
    ) -> Self {
        let problems = draw_problems(&course.problems, policy, rng);
        let clear_threshold = clear_threshold(&problems, settings, policy);
        Self {
            session,
            difficulty,
            course_index,
            course_name: course.name.clone(),
            monster: course.monster.clone(),
            problems,
            next_problem: 0,
            attempt: None,
            score: 0,
            total_typed: 0,
            miss_count: 0,
            perfect_problems: 0,
            problems_completed: 0,
            clear_threshold,
            monster_max_hp: clear_threshold,
            points_per_char: settings.points_per_char,
            policy: *policy,
            committed: false,
        }
    }

    pub fn monster_hp(&self) -> u64 {
        self.monster_max_hp.saturating_sub(self.score)
    }

    pub fn is_cleared(&self) -> bool {
        self.score >= self.clear_threshold
    }

    /// Load the next problem into a fresh attempt. Returns false when none
    /// remain.
    pub fn load_next_problem(&mut self) -> bool {
        let Some(problem) = self.problems.get(self.next_problem).cloned() else {
            self.attempt = None;
            return false;
        };
        self.next_problem += 1;
        self.attempt = Some(ProblemAttempt::new(problem, self.points_per_char));
        true
    }

    /// Settle the current attempt and award the perfect bonus if it was
    /// earned. Returns None when no attempt was active.
    pub fn settle_attempt(&mut self) -> Option<Settlement> {
        let attempt = self.attempt.take()?;
        let completed = attempt.is_complete();
        let mut bonus = 0;
        if completed {
            self.problems_completed += 1;
            if attempt.perfect {
                bonus = attempt.base_value;
                self.score += bonus;
                self.perfect_problems += 1;
            }
        }
        Some(Settlement { completed, bonus })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub completed: bool,
    pub bonus: u64,
}

/// Problems played in a run: the whole course, or a random subset sized at
/// `sample_fraction` of it (at least one problem). Optionally shuffled.
pub fn draw_problems<R: Rng>(course: &[Problem], policy: &RunPolicy, rng: &mut R) -> Vec<Problem> {
    let mut problems = match policy.sampling {
        SamplingPolicy::Full => course.to_vec(),
        SamplingPolicy::RandomFraction => {
            let wanted = (fraction_of(course.len() as u64, policy.sample_fraction) as usize)
                .clamp(1, course.len().max(1))
                .min(course.len());
            let mut picked: Vec<usize> =
                rand::seq::index::sample(rng, course.len(), wanted).into_vec();
            if !policy.shuffle {
                picked.sort_unstable();
            }
            picked.into_iter().map(|i| course[i].clone()).collect()
        }
    };
    if policy.shuffle {
        problems.shuffle(rng);
    }
    problems
}

pub fn clear_threshold(problems: &[Problem], settings: &DifficultySettings, policy: &RunPolicy) -> u64 {
    match policy.clear_threshold {
        ClearThresholdPolicy::Fixed => settings.clear_score,
        ClearThresholdPolicy::DynamicFraction => {
            let max_base: u64 = problems
                .iter()
                .map(|p| scoring::problem_value(&p.target, settings.points_per_char))
                .sum();
            fraction_of(max_base, policy.clear_fraction).max(1)
        }
    }
}

/// `ceil(base * fraction)` with the fraction taken in whole per-mille, so
/// products like `100 * 0.07` land on 7 rather than 8.
pub fn fraction_of(base: u64, fraction: f64) -> u64 {
    let permille = (fraction.clamp(0.0, 1.0) * 1000.0).round() as u64;
    (base * permille).div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, TimerDiscipline};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn problems(targets: &[&str]) -> Vec<Problem> {
        targets
            .iter()
            .map(|t| Problem {
                category: "c".to_string(),
                prompt: String::new(),
                target: t.to_string(),
            })
            .collect()
    }

    fn policy(sampling: SamplingPolicy, shuffle: bool) -> RunPolicy {
        RunPolicy {
            clear_threshold: ClearThresholdPolicy::DynamicFraction,
            clear_fraction: 0.5,
            run_timer: false,
            sampling,
            sample_fraction: 0.5,
            shuffle,
            problem_timer: TimerDiscipline::Countdown,
            miss_penalty_secs: 1,
        }
    }

    #[test]
    fn test_full_sampling_keeps_order() {
        let course = problems(&["a", "b", "c"]);
        let mut rng = SmallRng::seed_from_u64(7);
        let drawn = draw_problems(&course, &policy(SamplingPolicy::Full, false), &mut rng);
        assert_eq!(drawn, course);
    }

    #[test]
    fn test_random_fraction_draws_subset() {
        let course = problems(&["a", "b", "c", "d", "e"]);
        let mut rng = SmallRng::seed_from_u64(7);
        let drawn = draw_problems(&course, &policy(SamplingPolicy::RandomFraction, true), &mut rng);
        assert_eq!(drawn.len(), 3);
        for p in &drawn {
            assert!(course.contains(p));
        }
        let mut targets: Vec<&str> = drawn.iter().map(|p| p.target.as_str()).collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), 3);
    }

    #[test]
    fn test_random_fraction_without_shuffle_keeps_course_order() {
        let course = problems(&["a", "b", "c", "d", "e", "f"]);
        let mut rng = SmallRng::seed_from_u64(11);
        let drawn = draw_problems(&course, &policy(SamplingPolicy::RandomFraction, false), &mut rng);
        let positions: Vec<usize> = drawn
            .iter()
            .map(|p| course.iter().position(|c| c == p).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_sampling_empty_course() {
        let mut rng = SmallRng::seed_from_u64(1);
        let drawn = draw_problems(&[], &policy(SamplingPolicy::RandomFraction, true), &mut rng);
        assert!(drawn.is_empty());
    }

    #[test]
    fn test_dynamic_threshold_is_fraction_of_max_base() {
        let settings = Config::default().settings(Difficulty::Easy).clone();
        // 3 + 5 non-space chars at 10 points, half of 80
        let drawn = problems(&["cat", "a bcde"]);
        let threshold = clear_threshold(&drawn, &settings, &policy(SamplingPolicy::Full, false));
        assert_eq!(threshold, 40);
    }

    #[test]
    fn test_fraction_of_is_exact_for_decimal_fractions() {
        assert_eq!(fraction_of(100, 0.07), 7);
        assert_eq!(fraction_of(100, 0.55), 55);
        assert_eq!(fraction_of(100, 0.35), 35);
        assert_eq!(fraction_of(80, 0.6), 48);
        assert_eq!(fraction_of(101, 0.07), 8);
        assert_eq!(fraction_of(5, 0.8), 4);
        assert_eq!(fraction_of(0, 0.6), 0);
        for base in 1..2000u64 {
            assert_eq!(fraction_of(base, 0.07), (base * 70).div_ceil(1000));
            assert_eq!(fraction_of(base, 0.6), (base * 600).div_ceil(1000));
        }
    }

    #[test]
    fn test_dynamic_threshold_small_fraction() {
        let settings = Config::default().settings(Difficulty::Easy).clone();
        let mut p = policy(SamplingPolicy::Full, false);
        p.clear_fraction = 0.07;
        // 10 chars at 10 points
        let threshold = clear_threshold(&problems(&["abcdefghij"]), &settings, &p);
        assert_eq!(threshold, 7);
    }

    #[test]
    fn test_fixed_threshold() {
        let settings = Config::default().settings(Difficulty::Hard).clone();
        let mut p = policy(SamplingPolicy::Full, false);
        p.clear_threshold = ClearThresholdPolicy::Fixed;
        assert_eq!(clear_threshold(&problems(&["x"]), &settings, &p), settings.clear_score);
    }

    #[test]
    fn test_monster_hp_floors_at_zero() {
        let course = Course {
            name: "c".to_string(),
            problems: problems(&["cat"]),
            monster: Some("slime".to_string()),
        };
        let settings = Config::default().settings(Difficulty::Easy).clone();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut run = Run::new(
            Session::Vocabulary,
            Difficulty::Easy,
            0,
            &course,
            &settings,
            &policy(SamplingPolicy::Full, false),
            &mut rng,
        );
        assert_eq!(run.monster_max_hp, 15);
        assert_eq!(run.policy, policy(SamplingPolicy::Full, false));
        run.score = 10;
        assert_eq!(run.monster_hp(), 5);
        run.score = 60;
        assert_eq!(run.monster_hp(), 0);
    }
}
