use super::ClauseDatabase;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Literal;
use crate::sat::SatSolver;
use crate::sat::SatSolverOptions;

/// Loads every clause straight into a [`SatSolver`].
#[derive(Debug, Default)]
pub struct SatSolverClauseDatabase {
    solver: SatSolver,
}

impl SatSolverClauseDatabase {
    pub fn new(options: SatSolverOptions) -> SatSolverClauseDatabase {
        SatSolverClauseDatabase {
            solver: SatSolver::new(options),
        }
    }

    pub fn from_solver(solver: SatSolver) -> SatSolverClauseDatabase {
        SatSolverClauseDatabase { solver }
    }

    pub fn solver(&self) -> &SatSolver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut SatSolver {
        &mut self.solver
    }

    pub fn into_solver(self) -> SatSolver {
        self.solver
    }
}

impl ClauseDatabase for SatSolverClauseDatabase {
    fn new_literal(&mut self) -> Literal {
        Literal::new(self.solver.create_new_propositional_variable(), true)
    }

    fn add_clause(&mut self, literals: Vec<Literal>) -> Result<(), ConstraintOperationError> {
        self.solver.add_clause(literals)
    }

    fn fixed_value(&self, literal: Literal) -> Option<bool> {
        self.solver.get_literal_value_at_root(literal)
    }

    fn num_variables(&self) -> u32 {
        // variable 0 is internal to the solver
        self.solver.num_propositional_variables() - 1
    }

    fn num_clauses(&self) -> usize {
        self.solver.num_clauses()
    }
}
