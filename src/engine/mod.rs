pub mod rank;
pub mod scoring;
pub mod timer;

pub use timer::{CountdownTimer, ProblemTimer, TimerMode, TimerSignal};
