use super::Literal;
use super::PropositionalVariable;

/// A complete truth assignment over the variables `0..num_propositional_variables`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    truth_values: Vec<bool>,
}

impl Solution {
    pub fn new(truth_values: Vec<bool>) -> Solution {
        Solution { truth_values }
    }

    pub fn num_propositional_variables(&self) -> usize {
        self.truth_values.len()
    }

    pub fn get_propositional_variable_value(&self, variable: PropositionalVariable) -> bool {
        self.truth_values[variable]
    }

    pub fn get_literal_value(&self, literal: Literal) -> bool {
        let value = self.truth_values[literal.get_propositional_variable()];
        if literal.is_positive() {
            value
        } else {
            !value
        }
    }

    /// One literal per variable, true under the solution. Variable 0 is skipped.
    pub fn get_propositional_solution(&self) -> impl Iterator<Item = Literal> + '_ {
        self.truth_values
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, truth_value)| {
                Literal::new(PropositionalVariable::new(index as u32), *truth_value)
            })
    }

    /// Grows the assignment to `num_variables`, setting new variables to false. Used when a
    /// solution for a formula is evaluated against a formula with more auxiliary variables.
    pub fn resize(&mut self, num_variables: usize) {
        if self.truth_values.len() < num_variables {
            self.truth_values.resize(num_variables, false);
        }
    }
}
