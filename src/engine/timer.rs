use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerMode {
    /// Fire once after the duration.
    Deadline(Duration),
    /// Tick every `interval`, counting `units` down to zero.
    Countdown { interval: Duration, units: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerSignal {
    Tick { remaining: u32 },
    Expired,
}

/// Timer port driven by explicit time deltas. Cancellation takes effect
/// immediately: a canceled timer never produces another signal.
pub trait ProblemTimer {
    /// Arm the timer, dropping any previous arming.
    fn arm(&mut self, mode: TimerMode);
    fn cancel(&mut self);
    fn is_armed(&self) -> bool;
    /// Remaining whole units for countdowns, remaining whole seconds
    /// (rounded up) for deadlines.
    fn remaining_units(&self) -> Option<u32>;
    /// Take `units` off the remaining time without rearming.
    fn penalize(&mut self, units: u32);
    fn advance(&mut self, elapsed: Duration) -> Vec<TimerSignal>;
}

#[derive(Clone, Copy, Debug)]
enum Armed {
    Deadline {
        remaining: Duration,
    },
    Countdown {
        interval: Duration,
        until_tick: Duration,
        units: u32,
    },
}

#[derive(Clone, Debug, Default)]
pub struct CountdownTimer {
    armed: Option<Armed>,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProblemTimer for CountdownTimer {
    fn arm(&mut self, mode: TimerMode) {
        self.cancel();
        self.armed = Some(match mode {
            TimerMode::Deadline(remaining) => Armed::Deadline { remaining },
            TimerMode::Countdown { interval, units } => Armed::Countdown {
                // A zero interval would never make progress.
                interval: interval.max(Duration::from_millis(1)),
                until_tick: interval.max(Duration::from_millis(1)),
                units,
            },
        });
    }

    fn cancel(&mut self) {
        self.armed = None;
    }

    fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    fn remaining_units(&self) -> Option<u32> {
        match self.armed? {
            Armed::Deadline { remaining } => {
                let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                Some(u32::try_from(secs).unwrap_or(u32::MAX))
            }
            Armed::Countdown { units, .. } => Some(units),
        }
    }

    fn penalize(&mut self, units: u32) {
        match self.armed.as_mut() {
            Some(Armed::Deadline { remaining }) => {
                *remaining = remaining.saturating_sub(Duration::from_secs(units.into()));
            }
            Some(Armed::Countdown { units: left, .. }) => {
                *left = left.saturating_sub(units);
            }
            None => {}
        }
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<TimerSignal> {
        let mut signals = Vec::new();
        let Some(armed) = self.armed.as_mut() else {
            return signals;
        };

        match armed {
            Armed::Deadline { remaining } => {
                if elapsed >= *remaining {
                    self.armed = None;
                    signals.push(TimerSignal::Expired);
                } else {
                    *remaining -= elapsed;
                }
            }
            Armed::Countdown {
                interval,
                until_tick,
                units,
            } => {
                let mut budget = elapsed;
                while budget >= *until_tick {
                    budget -= *until_tick;
                    *until_tick = *interval;
                    *units = units.saturating_sub(1);
                    signals.push(TimerSignal::Tick { remaining: *units });
                    if *units == 0 {
                        signals.push(TimerSignal::Expired);
                        self.armed = None;
                        return signals;
                    }
                }
                *until_tick -= budget;
            }
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    fn countdown(units: u32) -> TimerMode {
        TimerMode::Countdown {
            interval: SEC,
            units,
        }
    }

    #[test]
    fn test_deadline_fires_once() {
        let mut timer = CountdownTimer::new();
        timer.arm(TimerMode::Deadline(Duration::from_secs(3)));
        assert!(timer.advance(Duration::from_secs(2)).is_empty());
        assert_eq!(timer.remaining_units(), Some(1));
        assert_eq!(timer.advance(SEC), vec![TimerSignal::Expired]);
        assert!(!timer.is_armed());
        assert!(timer.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_countdown_ticks_then_expires() {
        let mut timer = CountdownTimer::new();
        timer.arm(countdown(3));
        assert_eq!(timer.advance(SEC), vec![TimerSignal::Tick { remaining: 2 }]);
        assert_eq!(timer.advance(SEC), vec![TimerSignal::Tick { remaining: 1 }]);
        assert_eq!(
            timer.advance(SEC),
            vec![TimerSignal::Tick { remaining: 0 }, TimerSignal::Expired]
        );
        assert!(timer.advance(SEC).is_empty());
    }

    #[test]
    fn test_countdown_accumulates_partial_intervals() {
        let mut timer = CountdownTimer::new();
        timer.arm(countdown(5));
        assert!(timer.advance(Duration::from_millis(600)).is_empty());
        assert_eq!(
            timer.advance(Duration::from_millis(600)),
            vec![TimerSignal::Tick { remaining: 4 }]
        );
    }

    #[test]
    fn test_large_step_stops_at_expiry() {
        let mut timer = CountdownTimer::new();
        timer.arm(countdown(2));
        let signals = timer.advance(Duration::from_secs(30));
        assert_eq!(
            signals,
            vec![
                TimerSignal::Tick { remaining: 1 },
                TimerSignal::Tick { remaining: 0 },
                TimerSignal::Expired,
            ]
        );
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timer = CountdownTimer::new();
        timer.cancel();
        timer.arm(countdown(2));
        timer.cancel();
        timer.cancel();
        assert!(timer.advance(Duration::from_secs(5)).is_empty());
        assert_eq!(timer.remaining_units(), None);
    }

    #[test]
    fn test_rearm_replaces_previous() {
        let mut timer = CountdownTimer::new();
        timer.arm(countdown(1));
        timer.arm(countdown(10));
        assert_eq!(timer.advance(SEC), vec![TimerSignal::Tick { remaining: 9 }]);
    }

    #[test]
    fn test_penalty_observed_on_next_tick() {
        let mut timer = CountdownTimer::new();
        timer.arm(countdown(5));
        timer.penalize(2);
        assert_eq!(timer.remaining_units(), Some(3));
        assert_eq!(timer.advance(SEC), vec![TimerSignal::Tick { remaining: 2 }]);
    }

    #[test]
    fn test_penalty_clamps_at_zero() {
        let mut timer = CountdownTimer::new();
        timer.arm(countdown(1));
        timer.penalize(5);
        assert_eq!(timer.remaining_units(), Some(0));
        assert!(timer.is_armed());
        assert_eq!(
            timer.advance(SEC),
            vec![TimerSignal::Tick { remaining: 0 }, TimerSignal::Expired]
        );
    }

    #[test]
    fn test_penalty_shortens_deadline() {
        let mut timer = CountdownTimer::new();
        timer.arm(TimerMode::Deadline(Duration::from_secs(3)));
        timer.penalize(2);
        assert_eq!(timer.advance(SEC), vec![TimerSignal::Expired]);
    }
}
