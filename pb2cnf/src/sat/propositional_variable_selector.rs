use rand::Rng;

use super::AssignmentsPropositional;
use crate::basic_types::KeyValueHeap;
use crate::basic_types::PropositionalVariable;

/// VSIDS: picks the unassigned variable with the highest activity.
///
/// Assigned variables are removed from the heap lazily, when they surface at the top.
#[derive(Debug)]
pub struct PropositionalVariableSelector {
    heap: KeyValueHeap,
    increment: f64,
    max_threshold: f64,
    decay_factor: f64,
}

impl Default for PropositionalVariableSelector {
    fn default() -> Self {
        PropositionalVariableSelector {
            heap: KeyValueHeap::new(),
            increment: 1.0,
            max_threshold: 1e100,
            decay_factor: 0.95,
        }
    }
}

impl PropositionalVariableSelector {
    pub fn bump_activity(&mut self, variable: PropositionalVariable) {
        let activity = self.heap.get_value(variable.index());
        if activity + self.increment >= self.max_threshold {
            self.heap.divide_values(self.max_threshold);
            self.increment /= self.max_threshold;
        }
        self.heap.increment(variable.index(), self.increment);
    }

    pub fn restore(&mut self, variable: PropositionalVariable) {
        self.heap.restore_key(variable.index());
    }

    pub fn remove(&mut self, variable: PropositionalVariable) {
        self.heap.delete_key(variable.index());
    }

    /// Increasing the bump is equivalent to decaying all activities, and much cheaper.
    pub fn decay_activities(&mut self) {
        self.increment *= 1.0 / self.decay_factor;
    }

    /// Registers a new variable with a small random activity so that ties are broken randomly.
    pub fn grow(&mut self, rng: &mut impl Rng) {
        let initial_activity = rng.gen_range(0.0..0.00001);
        self.heap.grow(initial_activity);
    }

    pub fn peek_next_variable(
        &mut self,
        assignments: &AssignmentsPropositional,
    ) -> Option<PropositionalVariable> {
        while let Some(candidate) = self.heap.peek_max().map(PropositionalVariable::new) {
            if assignments.is_variable_assigned(candidate) {
                let _ = self.heap.pop_max();
            } else {
                return Some(candidate);
            }
        }
        None
    }
}
