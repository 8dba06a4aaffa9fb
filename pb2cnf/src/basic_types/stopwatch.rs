use std::time::Duration;
use std::time::Instant;

/// Measures the time since construction against an optional budget.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    time_budget: Option<Duration>,
    time_start: Instant,
}

impl Stopwatch {
    pub fn new(time_budget: Option<Duration>) -> Stopwatch {
        Stopwatch {
            time_budget,
            time_start: Instant::now(),
        }
    }

    pub fn starting_now() -> Stopwatch {
        Stopwatch::new(None)
    }

    pub fn elapsed(&self) -> Duration {
        self.time_start.elapsed()
    }

    /// The time left in the budget; `None` when there is no budget.
    pub fn remaining(&self) -> Option<Duration> {
        self.time_budget
            .map(|budget| budget.saturating_sub(self.elapsed()))
    }
}
