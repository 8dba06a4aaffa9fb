use std::time::Duration;

use super::TerminationCondition;
use crate::basic_types::Stopwatch;

/// Triggers when the time budget has been used up.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    stopwatch: Stopwatch,
}

impl TimeBudget {
    pub fn starting_now(budget: Duration) -> TimeBudget {
        TimeBudget {
            stopwatch: Stopwatch::new(Some(budget)),
        }
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&mut self) -> bool {
        self.stopwatch
            .remaining()
            .is_some_and(|remaining| remaining.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_stops_immediately() {
        let mut budget = TimeBudget::starting_now(Duration::ZERO);
        assert!(budget.should_stop());
    }

    #[test]
    fn large_budget_does_not_stop() {
        let mut budget = TimeBudget::starting_now(Duration::from_secs(3600));
        assert!(!budget.should_stop());
    }
}
