use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::catalog::{Catalog, Session};
use crate::config::{Config, Difficulty, TimerDiscipline};
use crate::engine::rank;
use crate::engine::scoring::{self, Validation};
use crate::engine::timer::{CountdownTimer, ProblemTimer, TimerMode, TimerSignal};
use crate::session::result::{RunEnd, RunResult};
use crate::session::run::{ProblemAttempt, Run};
use crate::store::schema::Progress;
use crate::store::{self, ProgressStore};

const MESSAGE_TTL: Duration = Duration::from_millis(800);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    ModeSelect,
    SessionSelect,
    CourseSelect,
    InRun,
    Result,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("course {index} is locked (highest unlocked is {highest})")]
    CourseLocked { index: usize, highest: usize },
    #[error("session {session} has no playable course {index}")]
    NoSuchCourse { session: &'static str, index: usize },
    #[error("not available on the {0:?} screen")]
    WrongScreen(Screen),
}

/// Things the front end may want to react to, e.g. with sound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    RunStarted,
    ProblemLoaded { number: usize, total: usize },
    CorrectKeystroke,
    Miss,
    ProblemComplete { perfect: bool, bonus: u64 },
    ProblemTimedOut,
    TimeRemaining(u32),
    RunEnded { end: RunEnd, cleared: bool },
    CourseUnlocked { index: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Good,
    Perfect,
    Miss,
    TimeUp,
}

impl Feedback {
    pub fn label(self) -> &'static str {
        match self {
            Feedback::Good => "GOOD!",
            Feedback::Perfect => "PERFECT!",
            Feedback::Miss => "MISS",
            Feedback::TimeUp => "TIME UP",
        }
    }
}

/// What the input buffer owner has to do after a change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputOutcome {
    /// Replace the buffer with this text.
    pub reset_buffer: Option<String>,
    pub delta: u64,
    pub missed: bool,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseEntry {
    pub index: usize,
    pub name: String,
    pub problems: usize,
    pub unlocked: bool,
}

pub struct SessionController<T: ProblemTimer = CountdownTimer> {
    config: Config,
    catalog: Catalog,
    progress: Progress,
    store: Option<Box<dyn ProgressStore>>,
    screen: Screen,
    difficulty: Option<Difficulty>,
    session: Option<Session>,
    run: Option<Run>,
    last_result: Option<RunResult>,
    problem_timer: T,
    run_timer: T,
    events: Vec<GameEvent>,
    message: Option<(Feedback, Duration)>,
    rng: SmallRng,
}

impl SessionController<CountdownTimer> {
    pub fn new(config: Config, catalog: Catalog, store: Option<Box<dyn ProgressStore>>) -> Self {
        Self::with_timers(
            config,
            catalog,
            store,
            CountdownTimer::new(),
            CountdownTimer::new(),
        )
    }
}

impl<T: ProblemTimer> SessionController<T> {
    pub fn with_timers(
        config: Config,
        catalog: Catalog,
        store: Option<Box<dyn ProgressStore>>,
        problem_timer: T,
        run_timer: T,
    ) -> Self {
        let progress = match store {
            Some(ref s) => s.load_progress(),
            None => Progress::default(),
        };
        Self {
            config,
            catalog,
            progress,
            store,
            screen: Screen::ModeSelect,
            difficulty: None,
            session: None,
            run: None,
            last_result: None,
            problem_timer,
            run_timer,
            events: Vec::new(),
            message: None,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Fix the RNG used for sampling and shuffling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    // --- Accessors ---

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn session(&self) -> Option<Session> {
        self.session
    }

    pub fn run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    pub fn problem_time_left(&self) -> Option<u32> {
        self.problem_timer.remaining_units()
    }

    pub fn run_time_left(&self) -> Option<u32> {
        self.run_timer.remaining_units()
    }

    pub fn message(&self) -> Option<Feedback> {
        self.message.map(|(feedback, _)| feedback)
    }

    pub fn rank(&self) -> &str {
        rank::rank_for(self.progress.total_experience, &self.config.ranks)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Courses of the selected session with their lock state for the
    /// selected difficulty.
    pub fn course_entries(&self) -> Vec<CourseEntry> {
        let (Some(session), Some(difficulty)) = (self.session, self.difficulty) else {
            return Vec::new();
        };
        self.catalog
            .courses(session)
            .iter()
            .enumerate()
            .map(|(index, course)| CourseEntry {
                index,
                name: course.name.clone(),
                problems: course.problems.len(),
                unlocked: self.progress.is_unlocked(session, difficulty, index),
            })
            .collect()
    }

    // --- Home navigation ---

    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Result<(), ControllerError> {
        self.expect_screen(Screen::ModeSelect)?;
        self.difficulty = Some(difficulty);
        self.screen = Screen::SessionSelect;
        Ok(())
    }

    pub fn select_session(&mut self, session: Session) -> Result<(), ControllerError> {
        self.expect_screen(Screen::SessionSelect)?;
        self.session = Some(session);
        self.screen = Screen::CourseSelect;
        Ok(())
    }

    /// Go one home screen up.
    pub fn back(&mut self) {
        self.screen = match self.screen {
            Screen::CourseSelect => Screen::SessionSelect,
            Screen::SessionSelect => Screen::ModeSelect,
            other => other,
        };
    }

    pub fn select_course(&mut self, index: usize) -> Result<(), ControllerError> {
        self.expect_screen(Screen::CourseSelect)?;
        let (Some(session), Some(difficulty)) = (self.session, self.difficulty) else {
            return Err(ControllerError::WrongScreen(self.screen));
        };

        let course = match self.catalog.course(session, index) {
            Some(course) if !course.problems.is_empty() => course,
            _ => {
                return Err(ControllerError::NoSuchCourse {
                    session: session.to_key(),
                    index,
                });
            }
        };

        let highest = self.progress.highest_unlocked(session, difficulty);
        if index > highest {
            return Err(ControllerError::CourseLocked { index, highest });
        }

        let policy = self.config.policy();
        let settings = self.config.settings(difficulty);
        let run = Run::new(
            session,
            difficulty,
            index,
            course,
            settings,
            &policy,
            &mut self.rng,
        );
        info!(
            "Run started: {} / {} / course {} ({} problems, clear at {})",
            session.to_key(),
            difficulty.to_key(),
            index,
            run.problems.len(),
            run.clear_threshold
        );

        self.run = Some(run);
        self.last_result = None;
        self.message = None;
        self.screen = Screen::InRun;
        self.events.push(GameEvent::RunStarted);

        if policy.run_timer {
            self.run_timer
                .arm(TimerMode::Deadline(Duration::from_secs(settings.run_secs.into())));
        }

        self.advance_problem();
        Ok(())
    }

    // --- Run cycle ---

    /// Settle the finished problem, then either end the run or load the next
    /// problem and re-arm the problem timer.
    pub fn advance_problem(&mut self) {
        if self.screen != Screen::InRun {
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };

        self.problem_timer.cancel();
        if let Some(settlement) = run.settle_attempt()
            && settlement.completed
        {
            self.events.push(GameEvent::ProblemComplete {
                perfect: settlement.bonus > 0,
                bonus: settlement.bonus,
            });
        }

        if run.is_cleared() {
            self.finish_run(RunEnd::Cleared);
            return;
        }
        if !run.load_next_problem() {
            self.finish_run(RunEnd::Exhausted);
            return;
        }

        let number = run.next_problem;
        let total = run.problems.len();
        debug!("Problem {number}/{total} loaded");
        self.events.push(GameEvent::ProblemLoaded { number, total });
        self.arm_problem_timer();
    }

    fn arm_problem_timer(&mut self) {
        let Some((difficulty, discipline)) =
            self.run.as_ref().map(|r| (r.difficulty, r.policy.problem_timer))
        else {
            return;
        };
        let secs = self.config.settings(difficulty).problem_secs;
        let mode = match discipline {
            TimerDiscipline::Deadline => TimerMode::Deadline(self.config.problem_duration(difficulty)),
            TimerDiscipline::Countdown => TimerMode::Countdown {
                interval: Duration::from_secs(1),
                units: secs,
            },
        };
        self.problem_timer.arm(mode);
    }

    /// Feed the current content of the input buffer.
    pub fn on_input(&mut self, value: &str) -> InputOutcome {
        let mut outcome = InputOutcome::default();
        if self.screen != Screen::InRun {
            return outcome;
        }
        let Some(run) = self.run.as_mut() else {
            return outcome;
        };
        let Some(attempt) = run.attempt.as_mut() else {
            return outcome;
        };

        let validation = scoring::validate(
            attempt.target(),
            attempt.confirmed_len,
            attempt.scored_len,
            value,
            run.points_per_char,
        );
        match validation {
            Validation::Miss { reset_to } => {
                run.miss_count += 1;
                attempt.perfect = false;
                outcome.missed = true;
                outcome.reset_buffer = Some(scoring::confirmed_prefix(attempt.target(), reset_to));
                let penalty = run.policy.miss_penalty_secs;
                if penalty > 0 {
                    self.problem_timer.penalize(penalty);
                }
                self.events.push(GameEvent::Miss);
                self.message = Some((Feedback::Miss, MESSAGE_TTL));
            }
            Validation::Accepted {
                delta,
                typed,
                confirmed_len,
                complete,
            } => {
                run.score += delta;
                run.total_typed += typed;
                attempt.confirmed_len = confirmed_len;
                attempt.scored_len = attempt.scored_len.max(confirmed_len);
                outcome.delta = delta;
                if typed > 0 {
                    self.events.push(GameEvent::CorrectKeystroke);
                }
                if complete {
                    outcome.completed = true;
                    outcome.reset_buffer = Some(String::new());
                    let feedback = if attempt.perfect {
                        Feedback::Perfect
                    } else {
                        Feedback::Good
                    };
                    self.message = Some((feedback, MESSAGE_TTL));
                    self.advance_problem();
                }
            }
        }
        outcome
    }

    /// Advance both timers by `elapsed` and dispatch what they fired.
    pub fn tick(&mut self, elapsed: Duration) {
        if let Some((_, ttl)) = self.message.as_mut() {
            *ttl = ttl.saturating_sub(elapsed);
            if ttl.is_zero() {
                self.message = None;
            }
        }
        if self.screen != Screen::InRun {
            return;
        }

        for signal in self.problem_timer.advance(elapsed) {
            if self.screen != Screen::InRun {
                break;
            }
            match signal {
                TimerSignal::Tick { remaining } => {
                    self.events.push(GameEvent::TimeRemaining(remaining));
                }
                TimerSignal::Expired => self.on_problem_timeout(),
            }
        }

        if self.screen != Screen::InRun {
            return;
        }
        if self
            .run_timer
            .advance(elapsed)
            .contains(&TimerSignal::Expired)
        {
            self.on_run_timeout();
        }
    }

    /// The current problem ran out of time. Forfeits its bonus but is not
    /// counted as a miss.
    pub fn on_problem_timeout(&mut self) {
        if self.screen != Screen::InRun {
            return;
        }
        let Some(attempt) = self.run.as_mut().and_then(|r| r.attempt.as_mut()) else {
            return;
        };
        attempt.perfect = false;
        debug!("Problem timed out: {}", attempt.target());
        self.events.push(GameEvent::ProblemTimedOut);
        self.message = Some((Feedback::TimeUp, MESSAGE_TTL));
        self.advance_problem();
    }

    pub fn on_run_timeout(&mut self) {
        if self.screen != Screen::InRun {
            return;
        }
        self.finish_run(RunEnd::TimeUp);
    }

    /// End the current run. A forced end abandons it without touching the
    /// saved progress.
    pub fn end_run(&mut self, forced: bool) {
        if self.screen != Screen::InRun {
            return;
        }
        if forced {
            self.problem_timer.cancel();
            self.run_timer.cancel();
            if let Some(run) = self.run.take() {
                info!("Run abandoned at score {}", run.score);
            }
            self.screen = Screen::ModeSelect;
            return;
        }
        let end = match self.run.as_ref() {
            Some(run) if run.is_cleared() => RunEnd::Cleared,
            _ => RunEnd::Exhausted,
        };
        self.finish_run(end);
    }

    pub fn return_home(&mut self) {
        if self.screen == Screen::Result {
            self.screen = Screen::ModeSelect;
        }
    }

    fn finish_run(&mut self, end: RunEnd) {
        self.problem_timer.cancel();
        self.run_timer.cancel();
        let Some(mut run) = self.run.take() else {
            return;
        };
        run.attempt = None;

        let result = RunResult::from_run(&run, end);
        if !run.committed {
            run.committed = true;
            let before = self.progress.highest_unlocked(run.session, run.difficulty);
            match store::commit(&mut self.progress, self.store.as_deref(), &result) {
                Ok(true) => {
                    let index = self.progress.highest_unlocked(run.session, run.difficulty);
                    info!("Unlocked course {index} (was {before})");
                    self.events.push(GameEvent::CourseUnlocked { index });
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to save progress: {e}");
                    if self.progress.highest_unlocked(run.session, run.difficulty) > before {
                        let index = self.progress.highest_unlocked(run.session, run.difficulty);
                        self.events.push(GameEvent::CourseUnlocked { index });
                    }
                }
            }
        }

        info!(
            "Run ended ({:?}): score {} / {}, {} misses",
            end, result.score, result.clear_threshold, result.misses
        );
        self.events.push(GameEvent::RunEnded {
            end,
            cleared: result.cleared(),
        });
        self.last_result = Some(result);
        self.screen = Screen::Result;
    }

    fn expect_screen(&self, screen: Screen) -> Result<(), ControllerError> {
        if self.screen == screen {
            Ok(())
        } else {
            Err(ControllerError::WrongScreen(self.screen))
        }
    }

    pub fn current_attempt(&self) -> Option<&ProblemAttempt> {
        self.run.as_ref().and_then(|r| r.attempt.as_ref())
    }
}
