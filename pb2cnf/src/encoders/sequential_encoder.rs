use log::debug;

use super::pseudo_boolean_constraint_encoder::EncodingError;
use super::PseudoBooleanConstraintEncoderInterface;
use crate::basic_types::Literal;
use crate::basic_types::WeightedLiteral;
use crate::clause_databases::ClauseDatabase;
use crate::pb2cnf_assert_simple;

/// The sequential counter for `x1 + ... + xn <= 1`.
///
/// Auxiliary literal `s_i` means that one of `x1, ..., xi` is true. It needs `3n - 4` clauses and
/// `n - 1` fresh variables.
///
/// Reference:
/// Sinz, Carsten. Towards an optimal CNF encoding of boolean cardinality constraints.
/// CP 2005.
#[derive(Debug)]
pub(crate) struct SequentialEncoder {
    literals: Vec<Literal>,
    num_clauses_added: usize,
}

impl PseudoBooleanConstraintEncoderInterface for SequentialEncoder {
    fn encode_at_most_k(
        weighted_literals: Vec<WeightedLiteral>,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Self, EncodingError> {
        pb2cnf_assert_simple!(
            k <= 1 && weighted_literals.iter().all(|term| term.weight == 1),
            "The sequential encoding only supports at-most-one constraints."
        );

        let mut encoder = SequentialEncoder {
            literals: weighted_literals
                .into_iter()
                .map(|term| term.literal)
                .collect(),
            num_clauses_added: 0,
        };

        if k == 0 {
            encoder.forbid_all_literals(clause_database)?;
        } else {
            encoder.encode_at_most_one(clause_database)?;
        }

        debug!(
            "Sequential counter added {} clauses for {} literals.",
            encoder.num_clauses_added,
            encoder.literals.len()
        );

        Ok(encoder)
    }

    fn strengthen_at_most_k(
        &mut self,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        pb2cnf_assert_simple!(k == 0);

        self.forbid_all_literals(clause_database)
            .map_err(|_| EncodingError::CannotStrengthen)
    }
}

impl SequentialEncoder {
    fn encode_at_most_one(
        &mut self,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        let n = self.literals.len();
        if n <= 1 {
            return Ok(());
        }

        let s = clause_database.new_literals(n - 1);

        for i in 0..n - 1 {
            let x = self.literals[i];
            let x_next = self.literals[i + 1];

            //  x_i -> s_i
            self.add_clause(vec![!x, s[i]], clause_database)?;
            //  x_{i+1} -> ~s_i
            self.add_clause(vec![!x_next, !s[i]], clause_database)?;
            //  s_i -> s_{i+1}
            if i + 1 < n - 1 {
                self.add_clause(vec![!s[i], s[i + 1]], clause_database)?;
            }
        }

        Ok(())
    }

    fn forbid_all_literals(
        &mut self,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        for i in 0..self.literals.len() {
            let literal = self.literals[i];
            self.add_clause(vec![!literal], clause_database)?;
        }
        Ok(())
    }

    fn add_clause(
        &mut self,
        clause: Vec<Literal>,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        self.num_clauses_added += 1;
        clause_database
            .add_clause(clause)
            .map_err(|_| EncodingError::RootPropagationConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause_databases::CountingClauseDatabase;
    use crate::clause_databases::SatSolverClauseDatabase;
    use crate::sat::SatSolverOptions;

    fn unit_weights(literals: &[Literal]) -> Vec<WeightedLiteral> {
        literals
            .iter()
            .map(|literal| WeightedLiteral::new(*literal, 1))
            .collect()
    }

    #[test]
    fn ladder_size() {
        let mut database = CountingClauseDatabase::new(1);
        let xs = database.new_literals(5);

        let _ = SequentialEncoder::encode_at_most_k(unit_weights(&xs), 1, &mut database)
            .expect("valid encoding");

        assert_eq!(3 * 5 - 4, database.num_clauses());
        assert_eq!(5 + 4, database.num_new_variables());
    }

    #[test]
    fn one_true_literal_propagates_the_others() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = database.new_literals(4);

        let _ = SequentialEncoder::encode_at_most_k(unit_weights(&xs), 1, &mut database)
            .expect("valid encoding");

        assert!(database.add_clause(vec![xs[2]]).is_ok());
        for &x in [xs[0], xs[1], xs[3]].iter() {
            assert_eq!(Some(false), database.fixed_value(x));
        }
    }

    #[test]
    fn strengthening_to_zero_forbids_all_literals() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = database.new_literals(3);

        let mut encoder =
            SequentialEncoder::encode_at_most_k(unit_weights(&xs), 1, &mut database)
                .expect("valid encoding");
        encoder
            .strengthen_at_most_k(0, &mut database)
            .expect("valid strengthening");

        for &x in &xs {
            assert_eq!(Some(false), database.fixed_value(x));
        }
    }
}
