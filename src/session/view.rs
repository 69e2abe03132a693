use crate::engine::rank;
use crate::engine::timer::ProblemTimer;
use crate::session::controller::{CourseEntry, Screen, SessionController};
use crate::session::result::RunResult;

/// Everything the front end needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub screen: Screen,
    pub difficulty: Option<&'static str>,
    pub session: Option<&'static str>,
    pub rank: String,
    pub experience: u64,
    /// Next rank label and the experience still missing.
    pub next_rank: Option<(String, u64)>,
    pub courses: Vec<CourseEntry>,
    pub run: Option<RunView>,
    pub result: Option<RunResult>,
    pub message: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunView {
    pub course_name: String,
    pub monster: Option<String>,
    pub category: String,
    pub prompt: String,
    pub target: String,
    /// Characters of `target` typed correctly so far.
    pub confirmed_len: usize,
    pub score: u64,
    pub clear_threshold: u64,
    pub monster_hp: u64,
    pub monster_max_hp: u64,
    pub problem_time_left: Option<u32>,
    pub run_time_left: Option<u32>,
    pub problem_number: usize,
    pub problem_total: usize,
    pub misses: u32,
}

impl RunView {
    pub fn hp_ratio(&self) -> f64 {
        if self.monster_max_hp == 0 {
            return 0.0;
        }
        self.monster_hp as f64 / self.monster_max_hp as f64
    }
}

/// Pure projection of the controller state.
pub fn render_state<T: ProblemTimer>(controller: &SessionController<T>) -> ViewModel {
    let progress = controller.progress();
    let ranks = &controller.config().ranks;

    let run = controller.run().map(|run| {
        let attempt = run.attempt.as_ref();
        RunView {
            course_name: run.course_name.clone(),
            monster: run.monster.clone(),
            category: attempt
                .map(|a| a.problem.category.clone())
                .unwrap_or_default(),
            prompt: attempt.map(|a| a.problem.prompt.clone()).unwrap_or_default(),
            target: attempt.map(|a| a.problem.target.clone()).unwrap_or_default(),
            confirmed_len: attempt.map_or(0, |a| a.confirmed_len),
            score: run.score,
            clear_threshold: run.clear_threshold,
            monster_hp: run.monster_hp(),
            monster_max_hp: run.monster_max_hp,
            problem_time_left: controller.problem_time_left(),
            run_time_left: controller.run_time_left(),
            problem_number: run.next_problem,
            problem_total: run.problems.len(),
            misses: run.miss_count,
        }
    });

    ViewModel {
        screen: controller.screen(),
        difficulty: controller.difficulty().map(|d| d.label()),
        session: controller.session().map(|s| s.label()),
        rank: controller.rank().to_string(),
        experience: progress.total_experience,
        next_rank: rank::next_rank(progress.total_experience, ranks)
            .map(|(label, missing)| (label.to_string(), missing)),
        courses: controller.course_entries(),
        run,
        result: controller.last_result().cloned(),
        message: controller.message().map(|m| m.label()),
    }
}
