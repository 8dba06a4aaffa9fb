use std::io::Write;

use itertools::Itertools;

use super::ClauseDatabase;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Function;
use crate::basic_types::Literal;
use crate::basic_types::PropositionalVariable;
use crate::pb2cnf_assert_simple;

/// Stores clauses in memory so that they can be written out in DIMACS format.
///
/// Unit clauses are remembered as fixed values. They are used to simplify the bookkeeping of
/// later clauses, which are nevertheless stored unchanged, so the written formula contains every
/// clause that was added.
#[derive(Debug, Clone, Default)]
pub struct VectorClauseDatabase {
    clauses: Vec<Vec<Literal>>,
    num_variables: u32,
    /// Indexed by variable; index 0 is unused.
    fixed_values: Vec<Option<bool>>,
    is_infeasible: bool,
}

impl VectorClauseDatabase {
    /// A database whose variables `1..=num_input_variables` are already in use.
    pub fn new(num_input_variables: u32) -> VectorClauseDatabase {
        VectorClauseDatabase {
            clauses: vec![],
            num_variables: num_input_variables,
            fixed_values: vec![None; num_input_variables as usize + 1],
            is_infeasible: false,
        }
    }

    /// Makes sure that the variables `1..=num_variables` are counted as in use.
    pub fn ensure_num_variables(&mut self, num_variables: u32) {
        if num_variables > self.num_variables {
            self.num_variables = num_variables;
            self.fixed_values.resize(num_variables as usize + 1, None);
        }
    }

    pub fn clauses(&self) -> &[Vec<Literal>] {
        &self.clauses
    }

    pub fn is_infeasible(&self) -> bool {
        self.is_infeasible
    }

    fn fix(&mut self, literal: Literal) {
        let variable = literal.get_propositional_variable();
        self.ensure_num_variables(variable.index());
        self.fixed_values[variable] = Some(literal.is_positive());
    }

    /// Writes `p cnf` followed by one clause per line.
    pub fn write_dimacs_cnf(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(writer, "p cnf {} {}", self.num_variables, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(writer, "{}", format_clause(clause))?;
        }
        Ok(())
    }

    /// Writes the clauses as hard clauses of a weighted partial MaxSAT instance with the
    /// objective (to be minimised) as soft clauses: a term `w * l` becomes the soft clause `~l`
    /// with weight `w`. Hard clauses get the top weight, one more than the sum of soft weights.
    /// The constant term of the objective cannot be expressed and is written as a comment.
    pub fn write_dimacs_wcnf(
        &self,
        objective: &Function,
        writer: &mut impl Write,
    ) -> std::io::Result<()> {
        let soft_clauses = objective.get_function_as_weighted_literals_vector();
        let top_weight = soft_clauses
            .iter()
            .map(|term| term.weight)
            .sum::<u64>()
            + 1;

        if objective.get_constant_term() != 0 {
            writeln!(writer, "c objective offset {}", objective.get_constant_term())?;
        }
        writeln!(
            writer,
            "p wcnf {} {} {}",
            self.num_variables,
            self.clauses.len() + soft_clauses.len(),
            top_weight
        )?;
        for clause in &self.clauses {
            writeln!(writer, "{top_weight} {}", format_clause(clause))?;
        }
        for term in &soft_clauses {
            writeln!(writer, "{} {}", term.weight, format_clause(&[!term.literal]))?;
        }
        Ok(())
    }
}

fn format_clause(clause: &[Literal]) -> String {
    clause
        .iter()
        .map(|literal| literal.to_dimacs())
        .chain(std::iter::once(0))
        .join(" ")
}

impl ClauseDatabase for VectorClauseDatabase {
    fn new_literal(&mut self) -> Literal {
        self.num_variables += 1;
        self.fixed_values.push(None);
        Literal::new(PropositionalVariable::new(self.num_variables), true)
    }

    fn add_clause(&mut self, literals: Vec<Literal>) -> Result<(), ConstraintOperationError> {
        pb2cnf_assert_simple!(
            literals
                .iter()
                .all(|literal| literal.get_propositional_variable().index() > 0),
            "variable 0 cannot be written to DIMACS"
        );

        if self.is_infeasible {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        let mut open_literals = literals
            .iter()
            .filter(|literal| self.fixed_value(**literal) != Some(false));
        let first_open = open_literals.next().copied();
        let is_unit = open_literals.next().is_none();
        let is_satisfied = literals
            .iter()
            .any(|literal| self.fixed_value(*literal) == Some(true));

        self.clauses.push(literals);

        match first_open {
            None => {
                self.is_infeasible = true;
                Err(ConstraintOperationError::InfeasibleClause)
            }
            Some(literal) if is_unit && !is_satisfied => {
                self.fix(literal);
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }

    fn fixed_value(&self, literal: Literal) -> Option<bool> {
        self.fixed_values
            .get(literal.get_propositional_variable().index() as usize)
            .copied()
            .flatten()
            .map(|value| value == literal.is_positive())
    }

    fn num_variables(&self) -> u32 {
        self.num_variables
    }

    fn num_clauses(&self) -> usize {
        self.clauses.len()
    }
}
