use log::info;
use log::warn;

use super::OptimisationResult;
use crate::basic_types::Function;
use crate::basic_types::Solution;
use crate::basic_types::Stopwatch;
use crate::clause_databases::SatSolverClauseDatabase;
use crate::encoders::PseudoBooleanConstraintEncoder;
use crate::encoders::PseudoBooleanEncoding;
use crate::sat::SatisfactionResult;
use crate::statistics::log_statistic;
use crate::termination::TerminationCondition;

/// Tightens the upper bound on the objective to one below the best value found, until no better
/// solution exists or the best value meets the lower bound.
#[derive(Debug, Copy, Clone)]
pub struct LinearSearch {
    upper_bound_encoding: PseudoBooleanEncoding,
}

impl LinearSearch {
    pub fn new(upper_bound_encoding: PseudoBooleanEncoding) -> LinearSearch {
        LinearSearch {
            upper_bound_encoding,
        }
    }

    pub(crate) fn solve(
        &self,
        clause_database: &mut SatSolverClauseDatabase,
        process_time: Stopwatch,
        objective_function: &Function,
        initial_solution: Solution,
        lower_bound: i64,
        termination: &mut impl TerminationCondition,
        on_improvement: &mut impl FnMut(i64, &Solution),
    ) -> OptimisationResult {
        let mut best_objective_value = objective_function.evaluate_solution(&initial_solution);
        let mut best_solution = initial_solution;
        report_improvement(best_objective_value, &best_solution, process_time, on_improvement);

        let mut upper_bound_encoder =
            PseudoBooleanConstraintEncoder::from_function(objective_function, self.upper_bound_encoding);

        loop {
            if best_objective_value <= lower_bound {
                log_statistics_with_objective(clause_database, best_objective_value);
                return OptimisationResult::Optimal {
                    solution: best_solution,
                    objective_value: best_objective_value,
                };
            }

            let encoding_status =
                upper_bound_encoder.constrain_at_most_k(best_objective_value - 1, clause_database);

            // infeasibility may already be detected while constraining the upper bound, meaning
            // the current best solution is optimal
            if encoding_status.is_err() {
                log_statistics_with_objective(clause_database, best_objective_value);
                return OptimisationResult::Optimal {
                    solution: best_solution,
                    objective_value: best_objective_value,
                };
            }

            clause_database.solver().log_debug_summary();

            match clause_database.solver_mut().solve(termination) {
                SatisfactionResult::Satisfiable(solution) => {
                    let new_objective_value = objective_function.evaluate_solution(&solution);

                    // the upper bound could not be strengthened, so solving again would return
                    // the same objective value
                    if new_objective_value >= best_objective_value {
                        warn!(
                            "The bound {} on the objective was not enforced, stopping at {}.",
                            best_objective_value - 1,
                            best_objective_value
                        );
                        log_statistics_with_objective(clause_database, best_objective_value);
                        return OptimisationResult::Optimal {
                            solution: best_solution,
                            objective_value: best_objective_value,
                        };
                    }

                    best_objective_value = new_objective_value;
                    best_solution = solution;
                    report_improvement(
                        best_objective_value,
                        &best_solution,
                        process_time,
                        on_improvement,
                    );
                }
                SatisfactionResult::Unsatisfiable => {
                    log_statistics_with_objective(clause_database, best_objective_value);
                    return OptimisationResult::Optimal {
                        solution: best_solution,
                        objective_value: best_objective_value,
                    };
                }
                SatisfactionResult::Unknown => {
                    log_statistics_with_objective(clause_database, best_objective_value);
                    return OptimisationResult::Satisfiable {
                        best_solution,
                        objective_value: best_objective_value,
                    };
                }
            }
        }
    }
}

fn report_improvement(
    objective_value: i64,
    solution: &Solution,
    process_time: Stopwatch,
    on_improvement: &mut impl FnMut(i64, &Solution),
) {
    info!(
        "Current objective is {} after {} seconds ({} ms)",
        objective_value,
        process_time.elapsed().as_secs(),
        process_time.elapsed().as_millis(),
    );
    on_improvement(objective_value, solution);
}

fn log_statistics_with_objective(clause_database: &SatSolverClauseDatabase, objective_value: i64) {
    clause_database.solver().log_statistics();
    log_statistic("objective", objective_value);
}
