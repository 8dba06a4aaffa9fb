use std::path::Path;

use log::warn;
use pb2cnf::basic_types::Literal;
use pb2cnf::basic_types::PropositionalVariable;
use pb2cnf::basic_types::Solution;
use pb2cnf::clause_databases::ClauseDatabase;
use pb2cnf::clause_databases::VectorClauseDatabase;
use pb2cnf::parsers::dimacs::parse_cnf;
use pb2cnf::parsers::dimacs::parse_wcnf;
use pb2cnf::parsers::dimacs::WcnfInstance;
use pb2cnf::parsers::opb::parse_opb;
use pb2cnf::parsers::opb::OpbInstance;

use crate::file_format::open_instance;
use crate::result::Pb2CnfError;
use crate::result::Pb2CnfResult;

pub(crate) fn verify_cnf_solution(instance_path: &Path, solution: &Solution) -> Pb2CnfResult<()> {
    let formula = parse_cnf::<VectorClauseDatabase>(open_instance(instance_path)?, ())?;

    let is_satisfied = |clause: &Vec<Literal>| {
        clause
            .iter()
            .any(|&literal| solution.get_literal_value(literal))
    };
    if formula.clauses().iter().all(is_satisfied) {
        Ok(())
    } else {
        Err(Pb2CnfError::InconsistentSolution)
    }
}

pub(crate) fn verify_wcnf_solution(
    instance_path: &Path,
    solution: &Solution,
    reported_objective_value: i64,
) -> Pb2CnfResult<()> {
    let WcnfInstance {
        formula,
        objective,
        last_instance_variable,
    } = parse_wcnf::<VectorClauseDatabase>(open_instance(instance_path)?, ())?;

    let mut values = (0..=formula.num_variables())
        .map(|index| {
            index as usize <= last_instance_variable
                && solution.get_propositional_variable_value(PropositionalVariable::new(index))
        })
        .collect::<Vec<_>>();
    let value = |values: &[bool], literal: Literal| {
        values[literal.get_propositional_variable().index() as usize] == literal.is_positive()
    };

    // the selector of a soft clause is its last literal, true only if the clause is violated
    for clause in formula.clauses() {
        if let Some((selector, rest)) = clause.split_last() {
            let index = selector.get_propositional_variable().index() as usize;
            if index > last_instance_variable {
                values[index] = !rest.iter().any(|&literal| value(&values, literal));
            }
        }
    }

    if !formula
        .clauses()
        .iter()
        .all(|clause| clause.iter().any(|&literal| value(&values, literal)))
    {
        return Err(Pb2CnfError::InconsistentSolution);
    }

    let actual = objective.evaluate_solution(&Solution::new(values));
    if actual != reported_objective_value {
        return Err(Pb2CnfError::InconsistentObjective {
            reported: reported_objective_value,
            actual,
        });
    }

    Ok(())
}

/// `solution` is indexed by OPB variable.
pub(crate) fn verify_opb_solution(
    instance_path: &Path,
    solution: &Solution,
    reported_objective_value: Option<i64>,
) -> Pb2CnfResult<()> {
    let instance = parse_opb::<OpbInstance>(open_instance(instance_path)?, ())?;

    let mut solution = solution.clone();
    solution.resize(instance.num_variables as usize + 1);

    if let Some((index, constraint)) = instance.violated_constraints(&solution).next() {
        warn!("Constraint {} is violated: {constraint:?}", index + 1);
        return Err(Pb2CnfError::InconsistentSolution);
    }

    if let (Some(reported), Some(actual)) = (
        reported_objective_value,
        instance.evaluate_objective(&solution),
    ) {
        if reported != actual {
            return Err(Pb2CnfError::InconsistentObjective { reported, actual });
        }
    }

    Ok(())
}
