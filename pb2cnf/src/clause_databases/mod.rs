//! Sinks for the clauses produced by the encoders.
//!
//! The encoders only talk to the [`ClauseDatabase`] trait, so the same encoding can be written to
//! a file ([`VectorClauseDatabase`]), loaded into a solver ([`SatSolverClauseDatabase`]) or just
//! measured ([`CountingClauseDatabase`]).

mod counting_clause_database;
mod sat_solver_clause_database;
mod vector_clause_database;

pub use counting_clause_database::CountingClauseDatabase;
pub use sat_solver_clause_database::SatSolverClauseDatabase;
pub use vector_clause_database::VectorClauseDatabase;

use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Literal;

pub trait ClauseDatabase {
    /// The positive literal of a fresh variable.
    fn new_literal(&mut self) -> Literal;

    fn new_literals(&mut self, num_literals: usize) -> Vec<Literal> {
        (0..num_literals).map(|_| self.new_literal()).collect()
    }

    /// Adds the disjunction of `literals`. Returns an error if the database has no models
    /// afterwards, as far as the database can tell.
    fn add_clause(&mut self, literals: Vec<Literal>) -> Result<(), ConstraintOperationError>;

    /// The value that the database forces on the literal regardless of other choices, if known.
    fn fixed_value(&self, literal: Literal) -> Option<bool>;

    /// The number of variables in use, i.e. the largest variable index.
    fn num_variables(&self) -> u32;

    fn num_clauses(&self) -> usize;
}
