use std::path::Path;
use std::path::PathBuf;

use clap::Args;
use itertools::Itertools;
use log::debug;
use pb2cnf::basic_types::Function;
use pb2cnf::basic_types::PropositionalVariable;
use pb2cnf::basic_types::Solution;
use pb2cnf::clause_databases::SatSolverClauseDatabase;
use pb2cnf::optimisation::LinearSearch;
use pb2cnf::optimisation::OptimisationResult;
use pb2cnf::optimisation::OptimisationSolver;
use pb2cnf::parsers::dimacs::parse_cnf;
use pb2cnf::parsers::dimacs::parse_wcnf;
use pb2cnf::parsers::dimacs::SolverDimacsSink;
use pb2cnf::parsers::dimacs::WcnfInstance;
use pb2cnf::parsers::opb::parse_opb;
use pb2cnf::parsers::opb::EncodedOpb;
use pb2cnf::parsers::opb::EncodingOpbSink;
use pb2cnf::sat::SatSolver;
use pb2cnf::sat::SatisfactionResult;
use pb2cnf::termination::TerminationCondition;

use crate::checker;
use crate::file_format::open_instance;
use crate::file_format::FileFormat;
use crate::result::Pb2CnfError;
use crate::result::Pb2CnfResult;
use crate::SolverArgs;

#[derive(Debug, Args)]
pub(crate) struct SolveArgs {
    /// The instance to solve.
    instance_path: PathBuf,

    /// Verify the reported solution is consistent with the instance, and, if applicable, verify
    /// that it evaluates to the reported objective value.
    #[arg(long = "verify", default_value_t = false)]
    verify_solution: bool,
}

pub(crate) fn solve(
    args: SolveArgs,
    options: &SolverArgs,
    termination: &mut impl TerminationCondition,
) -> Pb2CnfResult<()> {
    let instance_path = args.instance_path.as_path();
    let file_format = FileFormat::from_path(instance_path)
        .ok_or_else(|| Pb2CnfError::invalid_instance(instance_path.display()))?;

    match file_format {
        FileFormat::CnfDimacsPLine => {
            cnf_problem(options, termination, instance_path, args.verify_solution)
        }
        FileFormat::WcnfDimacsPLine => {
            wcnf_problem(options, termination, instance_path, args.verify_solution)
        }
        FileFormat::Opb => opb_problem(options, termination, instance_path, args.verify_solution),
    }
}

fn cnf_problem(
    options: &SolverArgs,
    termination: &mut impl TerminationCondition,
    instance_path: &Path,
    verify: bool,
) -> Pb2CnfResult<()> {
    let mut solver =
        parse_cnf::<SolverDimacsSink>(open_instance(instance_path)?, options.solver_options())?;

    let result = solver.solve(termination);
    solver.log_statistics();

    match result {
        SatisfactionResult::Satisfiable(solution) => {
            println!("s SATISFIABLE");
            println!(
                "v {}",
                stringify_solution(&solution, solution.num_propositional_variables(), true)
            );

            if verify {
                checker::verify_cnf_solution(instance_path, &solution)?;
            }
        }
        SatisfactionResult::Unsatisfiable => println!("s UNSATISFIABLE"),
        SatisfactionResult::Unknown => println!("s UNKNOWN"),
    }

    Ok(())
}

fn wcnf_problem(
    options: &SolverArgs,
    termination: &mut impl TerminationCondition,
    instance_path: &Path,
    verify: bool,
) -> Pb2CnfResult<()> {
    let WcnfInstance {
        formula: solver,
        objective: objective_function,
        last_instance_variable,
    } = parse_wcnf::<SolverDimacsSink>(open_instance(instance_path)?, options.solver_options())?;

    let result = optimise(options, termination, solver, objective_function, None);
    if let Some((solution, objective_value)) = result {
        println!(
            "v {}",
            stringify_solution(&solution, last_instance_variable + 1, false)
        );

        if verify {
            checker::verify_wcnf_solution(instance_path, &solution, objective_value)?;
        }
    }

    Ok(())
}

fn opb_problem(
    options: &SolverArgs,
    termination: &mut impl TerminationCondition,
    instance_path: &Path,
    verify: bool,
) -> Pb2CnfResult<()> {
    let EncodedOpb {
        clause_database,
        objective,
        variable_map,
        num_constraints,
    } = parse_opb::<EncodingOpbSink<SatSolverClauseDatabase>>(
        open_instance(instance_path)?,
        (
            SatSolverClauseDatabase::new(options.solver_options()),
            options.pb2cnf(),
        ),
    )?;
    debug!(
        "Encoded {num_constraints} constraints over {} variables into {} clauses",
        variable_map.num_instance_variables(),
        clause_database.solver().num_clauses()
    );

    let result = match objective {
        Some(objective_function) => optimise(
            options,
            termination,
            clause_database.into_solver(),
            objective_function,
            None,
        )
        .map(|(solution, objective_value)| (solution, Some(objective_value))),
        None => {
            let mut solver = clause_database.into_solver();
            let result = satisfy(&mut solver, termination);
            solver.log_statistics();
            result.map(|solution| (solution, None))
        }
    };

    if let Some((solution, objective_value)) = result {
        let instance_solution = variable_map.instance_solution(&solution);
        println!("v {}", stringify_opb_solution(&instance_solution));

        if verify {
            checker::verify_opb_solution(instance_path, &instance_solution, objective_value)?;
        }
    }

    Ok(())
}

/// Prints the status line and returns the solution, if one was found.
pub(crate) fn satisfy(
    solver: &mut SatSolver,
    termination: &mut impl TerminationCondition,
) -> Option<Solution> {
    match solver.solve(termination) {
        SatisfactionResult::Satisfiable(solution) => {
            println!("s SATISFIABLE");
            Some(solution)
        }
        SatisfactionResult::Unsatisfiable => {
            println!("s UNSATISFIABLE");
            None
        }
        SatisfactionResult::Unknown => {
            println!("s UNKNOWN");
            None
        }
    }
}

/// Prints `o` lines for every improving solution and the final status line. Returns the best
/// solution with its objective value.
///
/// A solution whose objective value meets `lower_bound` is reported as optimal right away.
pub(crate) fn optimise(
    options: &SolverArgs,
    termination: &mut impl TerminationCondition,
    solver: SatSolver,
    objective_function: Function,
    lower_bound: Option<i64>,
) -> Option<(Solution, i64)> {
    let mut solver = OptimisationSolver::new(
        SatSolverClauseDatabase::from_solver(solver),
        objective_function,
        LinearSearch::new(options.encoding),
    );
    if let Some(lower_bound) = lower_bound {
        solver = solver.with_lower_bound(lower_bound);
    }

    match solver.solve(termination, |objective_value, _| {
        println!("o {objective_value}")
    }) {
        OptimisationResult::Optimal {
            solution,
            objective_value,
        } => {
            println!("s OPTIMUM FOUND");
            Some((solution, objective_value))
        }
        OptimisationResult::Satisfiable {
            best_solution,
            objective_value,
        } => {
            println!("s SATISFIABLE");
            Some((best_solution, objective_value))
        }
        OptimisationResult::Infeasible => {
            println!("s UNSATISFIABLE");
            None
        }
        OptimisationResult::Unknown => {
            println!("s UNKNOWN");
            None
        }
    }
}

/// `1 -2 3 ...` for the variables below `num_variables`.
fn stringify_solution(
    solution: &Solution,
    num_variables: usize,
    terminate_with_zero: bool,
) -> String {
    (1..num_variables as u32)
        .map(PropositionalVariable::new)
        .map(|var| {
            if solution.get_propositional_variable_value(var) {
                format!("{}", var.index())
            } else {
                format!("-{}", var.index())
            }
        })
        .chain(terminate_with_zero.then(|| String::from("0")))
        .join(" ")
}

/// `x1 -x2 x3 ...` in the format of the pseudo-Boolean competitions.
fn stringify_opb_solution(solution: &Solution) -> String {
    (1..solution.num_propositional_variables() as u32)
        .map(PropositionalVariable::new)
        .map(|var| {
            if solution.get_propositional_variable_value(var) {
                format!("x{}", var.index())
            } else {
                format!("-x{}", var.index())
            }
        })
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimacs_solution_lists_every_variable() {
        let solution = Solution::new(vec![true, true, false, true]);

        assert_eq!("1 -2 3 0", stringify_solution(&solution, 4, true));
        assert_eq!("1 -2", stringify_solution(&solution, 3, false));
    }

    #[test]
    fn opb_solution_names_the_variables() {
        let solution = Solution::new(vec![false, false, true]);

        assert_eq!("-x1 x2", stringify_opb_solution(&solution));
    }
}
