use super::TerminationCondition;

/// Triggers once the solver has made the given number of decisions.
#[derive(Clone, Copy, Debug)]
pub struct DecisionBudget {
    decisions_left: u64,
}

impl DecisionBudget {
    pub fn new(max_decisions: u64) -> DecisionBudget {
        DecisionBudget {
            decisions_left: max_decisions,
        }
    }
}

impl TerminationCondition for DecisionBudget {
    fn should_stop(&mut self) -> bool {
        self.decisions_left == 0
    }

    fn decision_has_been_made(&mut self) {
        self.decisions_left = self.decisions_left.saturating_sub(1);
    }
}
