use log::debug;

use super::LinearSearch;
use super::OptimisationResult;
use crate::basic_types::Function;
use crate::basic_types::Solution;
use crate::basic_types::Stopwatch;
use crate::clause_databases::SatSolverClauseDatabase;
use crate::sat::SatisfactionResult;
use crate::termination::TerminationCondition;

/// Attempt to find optimal solutions with respect to an objective function, which is expressed
/// over the literals of the solver.
#[derive(Debug)]
pub struct OptimisationSolver {
    clause_database: SatSolverClauseDatabase,
    objective_function: Function,
    linear_search: LinearSearch,
    lower_bound: Option<i64>,
}

impl OptimisationSolver {
    pub fn new(
        clause_database: SatSolverClauseDatabase,
        objective_function: Function,
        linear_search: LinearSearch,
    ) -> OptimisationSolver {
        OptimisationSolver {
            clause_database,
            objective_function,
            linear_search,
            lower_bound: None,
        }
    }

    /// Provides a value the objective is known not to go below. A solution with this value is
    /// optimal, so the search stops without proving that no better solution exists.
    pub fn with_lower_bound(mut self, lower_bound: i64) -> OptimisationSolver {
        self.lower_bound = Some(lower_bound);
        self
    }

    pub fn clause_database(&self) -> &SatSolverClauseDatabase {
        &self.clause_database
    }

    /// Solves to optimality unless `termination` triggers first. Every solution which improves on
    /// the best objective value so far is passed to `on_improvement`.
    pub fn solve(
        &mut self,
        termination: &mut impl TerminationCondition,
        mut on_improvement: impl FnMut(i64, &Solution),
    ) -> OptimisationResult {
        let process_time = Stopwatch::starting_now();

        // Compute an initial solution from which to start minimising
        let initial_solve_result = self.clause_database.solver_mut().solve(termination);

        match initial_solve_result {
            SatisfactionResult::Satisfiable(solution) => {
                debug!(
                    "Initial solution took {} seconds",
                    process_time.elapsed().as_secs(),
                );

                let lower_bound = self
                    .lower_bound
                    .unwrap_or(i64::MIN)
                    .max(self.objective_function.get_constant_term());

                self.linear_search.solve(
                    &mut self.clause_database,
                    process_time,
                    &self.objective_function,
                    solution,
                    lower_bound,
                    termination,
                    &mut on_improvement,
                )
            }
            SatisfactionResult::Unsatisfiable => {
                self.clause_database.solver().log_statistics();
                OptimisationResult::Infeasible
            }
            SatisfactionResult::Unknown => {
                self.clause_database.solver().log_statistics();
                OptimisationResult::Unknown
            }
        }
    }
}
