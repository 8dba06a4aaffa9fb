use super::ClauseDatabase;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Literal;
use crate::basic_types::PropositionalVariable;

/// Counts what an encoding would add without storing it.
///
/// Fresh variables are numbered after `first_free_variable` so that they never clash with the
/// input literals of the encoding being measured.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingClauseDatabase {
    next_variable_index: u32,
    num_new_variables: u32,
    num_clauses: usize,
    num_literals: usize,
}

impl CountingClauseDatabase {
    pub fn new(first_free_variable: u32) -> CountingClauseDatabase {
        CountingClauseDatabase {
            next_variable_index: first_free_variable,
            ..Default::default()
        }
    }

    pub fn num_new_variables(&self) -> u32 {
        self.num_new_variables
    }

    /// The total number of literal occurrences over all clauses.
    pub fn num_literals(&self) -> usize {
        self.num_literals
    }
}

impl ClauseDatabase for CountingClauseDatabase {
    fn new_literal(&mut self) -> Literal {
        let variable = PropositionalVariable::new(self.next_variable_index);
        self.next_variable_index += 1;
        self.num_new_variables += 1;
        Literal::new(variable, true)
    }

    fn add_clause(&mut self, literals: Vec<Literal>) -> Result<(), ConstraintOperationError> {
        self.num_clauses += 1;
        self.num_literals += literals.len();
        Ok(())
    }

    fn fixed_value(&self, _literal: Literal) -> Option<bool> {
        None
    }

    fn num_variables(&self) -> u32 {
        self.next_variable_index.saturating_sub(1)
    }

    fn num_clauses(&self) -> usize {
        self.num_clauses
    }
}
