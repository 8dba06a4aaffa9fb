use crate::basic_types::PropositionalVariable;

/// Phase saving: a variable is decided on the value it had when it was last unassigned, unless its
/// value has been frozen.
#[derive(Default, Debug)]
pub struct PropositionalValueSelector {
    truth_values: Vec<CandidateTruthAssignment>,
}

#[derive(Debug, Clone, Copy, Default)]
struct CandidateTruthAssignment {
    value: bool,
    frozen: bool,
}

impl PropositionalValueSelector {
    pub fn grow(&mut self) {
        self.truth_values.push(CandidateTruthAssignment::default());
    }

    pub fn select_value(&self, variable: PropositionalVariable) -> bool {
        self.truth_values[variable].value
    }

    pub fn update_if_not_frozen(&mut self, variable: PropositionalVariable, new_truth_value: bool) {
        let candidate = &mut self.truth_values[variable];
        if !candidate.frozen {
            candidate.value = new_truth_value;
        }
    }

    pub fn update_and_freeze(&mut self, variable: PropositionalVariable, new_truth_value: bool) {
        self.truth_values[variable] = CandidateTruthAssignment {
            value: new_truth_value,
            frozen: true,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_values_are_not_overwritten() {
        let mut selector = PropositionalValueSelector::default();
        selector.grow();
        selector.grow();
        let variable = PropositionalVariable::new(1);

        selector.update_if_not_frozen(variable, true);
        assert!(selector.select_value(variable));

        selector.update_and_freeze(variable, false);
        selector.update_if_not_frozen(variable, true);
        assert!(!selector.select_value(variable));
    }
}
