use log::debug;

use super::AtMostK;
use super::Comparator;
use super::EncodingError;
use super::PseudoBooleanConstraint;
use super::PseudoBooleanConstraintEncoder;
use super::PseudoBooleanEncoding;
use crate::basic_types::WeightedLiteral;
use crate::clause_databases::ClauseDatabase;

/// Translates complete pseudo-Boolean constraints into clauses.
///
/// The clauses added for a constraint are equisatisfiable with it: any assignment to the literals
/// of the constraint extends to a model of the clauses exactly when it satisfies the constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pb2Cnf {
    encoding: PseudoBooleanEncoding,
}

impl Pb2Cnf {
    pub fn new(encoding: PseudoBooleanEncoding) -> Pb2Cnf {
        Pb2Cnf { encoding }
    }

    pub fn encoding(&self) -> PseudoBooleanEncoding {
        self.encoding
    }

    /// Adds the clauses for `constraint`.
    ///
    /// When the constraint cannot be satisfied the database receives the empty clause, so that
    /// it reflects the infeasibility, and the error is returned.
    pub fn encode(
        &self,
        constraint: &PseudoBooleanConstraint,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        let result = constraint.normalise().and_then(|normalised| {
            normalised
                .into_iter()
                .try_for_each(|at_most_k| self.encode_normalised(at_most_k, clause_database))
        });

        if let Err(EncodingError::TriviallyUnsatisfiable) = result {
            debug!("Constraint {constraint:?} cannot be satisfied.");
            let _ = clause_database.add_clause(vec![]);
        }
        result
    }

    /// Adds the clauses for `sum w_i l_i <= k`.
    pub fn encode_at_most_k(
        &self,
        weighted_literals: &[WeightedLiteral],
        k: i64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        self.encode(
            &Self::to_constraint(weighted_literals, Comparator::LessEqual, k)?,
            clause_database,
        )
    }

    /// Adds the clauses for `sum w_i l_i >= k`.
    pub fn encode_at_least_k(
        &self,
        weighted_literals: &[WeightedLiteral],
        k: i64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        self.encode(
            &Self::to_constraint(weighted_literals, Comparator::GreaterEqual, k)?,
            clause_database,
        )
    }

    fn to_constraint(
        weighted_literals: &[WeightedLiteral],
        comparator: Comparator,
        k: i64,
    ) -> Result<PseudoBooleanConstraint, EncodingError> {
        let terms = weighted_literals
            .iter()
            .map(|term| {
                i64::try_from(term.weight)
                    .map(|coefficient| (coefficient, term.literal))
                    .map_err(|_| EncodingError::CoefficientOverflow)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PseudoBooleanConstraint::new(terms, comparator, k))
    }

    fn encode_normalised(
        &self,
        at_most_k: AtMostK,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        let k = i64::try_from(at_most_k.k).map_err(|_| EncodingError::CoefficientOverflow)?;
        PseudoBooleanConstraintEncoder::from_weighted_literal_vector(
            at_most_k.weighted_literals,
            self.encoding,
        )
        .constrain_at_most_k(k, clause_database)
    }
}
