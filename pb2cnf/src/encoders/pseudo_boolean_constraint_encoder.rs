//! Shared preprocessing for all pseudo-Boolean encoders.
//!
//! The encoding algorithms implement [`PseudoBooleanConstraintEncoderInterface`] and only ever see
//! canonical input: unassigned literals with positive weights that each fit the right-hand side,
//! and whose total exceeds it. [`PseudoBooleanConstraintEncoder`] takes care of everything else.
use std::fmt::Debug;
use std::fmt::Display;
use std::time::Instant;

use clap::ValueEnum;
use log::debug;
use log::warn;
use thiserror::Error;

use super::CardinalityNetworkEncoder;
use super::GeneralisedTotaliserEncoder;
use super::SequentialEncoder;
use crate::basic_types::Function;
use crate::basic_types::Literal;
use crate::basic_types::WeightedLiteral;
use crate::clause_databases::ClauseDatabase;
use crate::clause_databases::CountingClauseDatabase;
use crate::pb2cnf_assert_simple;

pub(crate) trait PseudoBooleanConstraintEncoderInterface: Debug {
    /// Add clauses that encode `sum w_i x_i <= k` and return the encoder, which can later be used
    /// to strengthen the constraint (see [`Self::strengthen_at_most_k`]).
    ///
    /// The input is assumed to be canonical: `weighted_literals` is not empty, `0 < w_i <= k`,
    /// `sum w_i > k`, and no `x_i` has a fixed value.
    fn encode_at_most_k(
        weighted_literals: Vec<WeightedLiteral>,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Self, EncodingError>
    where
        Self: Sized;

    /// Incrementally strengthen the encoding to `sum w_i x_i <= k`, for a `k` smaller than any
    /// previous one.
    fn strengthen_at_most_k(
        &mut self,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
#[allow(
    clippy::upper_case_acronyms,
    reason = "the encodings are known by their acronyms"
)]
pub enum PseudoBooleanEncoding {
    /// The generalised totaliser, works for any weights.
    #[default]
    GTE,
    /// Cardinality networks, for unit weights.
    CNE,
    /// The sequential counter, for at-most-one constraints.
    Sequential,
    /// Picks an encoding per constraint based on its shape and the encoding size.
    Best,
}

impl Display for PseudoBooleanEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PseudoBooleanEncoding::GTE => write!(f, "gte"),
            PseudoBooleanEncoding::CNE => write!(f, "cne"),
            PseudoBooleanEncoding::Sequential => write!(f, "sequential"),
            PseudoBooleanEncoding::Best => write!(f, "best"),
        }
    }
}

/// Encodes `sum w_i x_i + c <= k` and supports strengthening `k` afterwards.
///
/// Before the initial encoding the terms are preprocessed against the values that the clause
/// database fixes: fixed literals move into the constant term or disappear, terms that cannot fit
/// the slack are fixed to false, and the remaining weights are divided by their greatest common
/// divisor. Strengthening later maps the requested `k` onto the same scale.
#[derive(Debug)]
pub struct PseudoBooleanConstraintEncoder {
    original_weighted_literals: Vec<WeightedLiteral>,
    original_constant_term: i64,
    encoder: Option<Box<dyn PseudoBooleanConstraintEncoderInterface>>,
    has_initial_encoding: bool,
    constant_term: i64,
    divisor: u64,
    k_previous: i64,
    encoded_k: u64,
    encoding_algorithm: PseudoBooleanEncoding,
}

impl PseudoBooleanConstraintEncoder {
    pub fn new(
        weighted_literals: Vec<WeightedLiteral>,
        encoding_algorithm: PseudoBooleanEncoding,
    ) -> Self {
        pb2cnf_assert_simple!(
            weighted_literals.iter().all(|term| term.weight > 0),
            "Zero-weight term detected, error?"
        );

        Self {
            original_weighted_literals: weighted_literals,
            original_constant_term: 0,
            encoder: None,
            has_initial_encoding: false,
            constant_term: 0,
            divisor: 1,
            k_previous: 0,
            encoded_k: 0,
            encoding_algorithm,
        }
    }

    pub fn from_weighted_literal_vector(
        weighted_literals: Vec<WeightedLiteral>,
        encoding_algorithm: PseudoBooleanEncoding,
    ) -> Self {
        PseudoBooleanConstraintEncoder::new(weighted_literals, encoding_algorithm)
    }

    pub fn from_literal_vector(
        literals: &[Literal],
        encoding_algorithm: PseudoBooleanEncoding,
    ) -> Self {
        PseudoBooleanConstraintEncoder::new(
            literals
                .iter()
                .map(|literal| WeightedLiteral::new(*literal, 1))
                .collect(),
            encoding_algorithm,
        )
    }

    /// The constraint `function <= k`, including the constant term of the function.
    pub fn from_function(function: &Function, encoding_algorithm: PseudoBooleanEncoding) -> Self {
        let mut encoder = PseudoBooleanConstraintEncoder::new(
            function.get_function_as_weighted_literals_vector(),
            encoding_algorithm,
        );
        encoder.original_constant_term = function.get_constant_term();
        encoder.constant_term = encoder.original_constant_term;
        encoder
    }

    /// Whether the last call to [`Self::constrain_at_most_k`] had to add an encoding.
    pub fn has_encoding(&self) -> bool {
        self.encoder.is_some()
    }

    /// Adds the constraint `sum w_i x_i + c <= k`. The first call creates the encoding; later
    /// calls strengthen it and are expected to pass a smaller `k` each time.
    pub fn constrain_at_most_k(
        &mut self,
        k: i64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        if !self.has_initial_encoding {
            return self.create_initial_encoding(k, clause_database);
        }

        if k >= self.k_previous {
            debug!("The strengthened right-hand side {k} is not smaller than the previous one.");
            return Ok(());
        }

        if k < self.constant_term {
            return Err(EncodingError::TriviallyUnsatisfiable);
        }

        match self.encoder.as_mut() {
            Some(encoder) => {
                self.k_previous = k;
                let scaled_k = (k - self.constant_term) as u64 / self.divisor;
                if scaled_k < self.encoded_k {
                    self.encoded_k = scaled_k;
                    encoder.strengthen_at_most_k(scaled_k, clause_database)?;
                }
                Ok(())
            }
            // the previous bound did not need any clauses, so the new one is encoded from scratch
            None => self.create_initial_encoding(k, clause_database),
        }
    }

    fn create_initial_encoding(
        &mut self,
        k: i64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        let time_start = Instant::now();
        let num_clauses_before = clause_database.num_clauses();

        let preprocessed_weighted_literals = self.initialise_and_preprocess(k, clause_database)?;

        if !preprocessed_weighted_literals.is_empty() {
            self.encoder = Some(Self::create_encoder(
                preprocessed_weighted_literals,
                self.encoded_k,
                clause_database,
                self.encoding_algorithm,
            )?);
        }

        debug!(
            "Initial encoding added {} clauses and took {} seconds.",
            clause_database
                .num_clauses()
                .saturating_sub(num_clauses_before),
            time_start.elapsed().as_secs()
        );

        Ok(())
    }

    /// Initialises internal data structures and returns the preprocessed weighted literals,
    /// already divided by [`Self::divisor`]. An empty result means that no encoding is needed.
    fn initialise_and_preprocess(
        &mut self,
        k: i64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Vec<WeightedLiteral>, EncodingError> {
        self.k_previous = k;
        self.has_initial_encoding = true;
        self.divisor = 1;

        // Literals that are true at the root move into the constant term, and terms that do not
        // fit the remaining slack are fixed to false. The unit clauses may propagate other terms
        // to true, so repeat until the fixed weight no longer changes.
        let mut previous_fixed_true_weight = None;
        let slack = loop {
            let fixed_true_weight = self
                .original_weighted_literals
                .iter()
                .filter(|term| clause_database.fixed_value(term.literal) == Some(true))
                .map(|term| term.weight as i64)
                .sum::<i64>();
            self.constant_term = self.original_constant_term + fixed_true_weight;

            if self.constant_term > k {
                return Err(EncodingError::TriviallyUnsatisfiable);
            }
            let slack = (k - self.constant_term) as u64;

            if previous_fixed_true_weight == Some(fixed_true_weight) {
                break slack;
            }
            previous_fixed_true_weight = Some(fixed_true_weight);

            //  w_i > slack -> ~x_i
            for term in &self.original_weighted_literals {
                if term.weight > slack && clause_database.fixed_value(term.literal).is_none() {
                    clause_database
                        .add_clause(vec![!term.literal])
                        .map_err(|_| EncodingError::RootPropagationConflict)?;
                }
            }
        };

        let mut unassigned_weighted_literals: Vec<WeightedLiteral> = self
            .original_weighted_literals
            .iter()
            .filter(|term| clause_database.fixed_value(term.literal).is_none())
            .copied()
            .collect();

        if unassigned_weighted_literals
            .iter()
            .map(|term| term.weight)
            .sum::<u64>()
            <= slack
        {
            self.encoded_k = slack;
            return Ok(vec![]);
        }

        self.divisor = unassigned_weighted_literals
            .iter()
            .fold(0, |divisor, term| greatest_common_divisor(divisor, term.weight));
        for term in unassigned_weighted_literals.iter_mut() {
            term.weight /= self.divisor;
        }
        self.encoded_k = slack / self.divisor;

        Ok(unassigned_weighted_literals)
    }

    fn create_encoder(
        weighted_literals: Vec<WeightedLiteral>,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
        encoding_algorithm: PseudoBooleanEncoding,
    ) -> Result<Box<dyn PseudoBooleanConstraintEncoderInterface>, EncodingError> {
        let encoding_algorithm =
            Self::select_encoding(&weighted_literals, k, &*clause_database, encoding_algorithm);

        match encoding_algorithm {
            PseudoBooleanEncoding::CNE => {
                let encoder = CardinalityNetworkEncoder::encode_at_most_k(
                    weighted_literals,
                    k,
                    clause_database,
                )?;
                Ok(Box::new(encoder))
            }
            PseudoBooleanEncoding::Sequential => {
                let encoder =
                    SequentialEncoder::encode_at_most_k(weighted_literals, k, clause_database)?;
                Ok(Box::new(encoder))
            }
            PseudoBooleanEncoding::GTE | PseudoBooleanEncoding::Best => {
                let encoder = GeneralisedTotaliserEncoder::encode_at_most_k(
                    weighted_literals,
                    k,
                    clause_database,
                )?;
                Ok(Box::new(encoder))
            }
        }
    }

    /// Resolves [`PseudoBooleanEncoding::Best`] and replaces encodings that cannot express the
    /// constraint by the generalised totaliser.
    fn select_encoding(
        weighted_literals: &[WeightedLiteral],
        k: u64,
        clause_database: &dyn ClauseDatabase,
        requested: PseudoBooleanEncoding,
    ) -> PseudoBooleanEncoding {
        let has_unit_weights = weighted_literals.iter().all(|term| term.weight == 1);

        match requested {
            PseudoBooleanEncoding::GTE => PseudoBooleanEncoding::GTE,
            PseudoBooleanEncoding::CNE if has_unit_weights => PseudoBooleanEncoding::CNE,
            PseudoBooleanEncoding::Sequential if has_unit_weights && k <= 1 => {
                PseudoBooleanEncoding::Sequential
            }
            PseudoBooleanEncoding::CNE | PseudoBooleanEncoding::Sequential => {
                warn!(
                    "The {requested} encoding does not support a constraint with {} terms and \
                     right-hand side {k}, using the generalised totaliser instead.",
                    weighted_literals.len()
                );
                PseudoBooleanEncoding::GTE
            }
            PseudoBooleanEncoding::Best => {
                if !has_unit_weights {
                    PseudoBooleanEncoding::GTE
                } else if k <= 1 {
                    PseudoBooleanEncoding::Sequential
                } else {
                    Self::select_smaller_encoding(weighted_literals, k, clause_database)
                }
            }
        }
    }

    /// Encodes the constraint with the totaliser and with cardinality networks into a
    /// [`CountingClauseDatabase`] and picks the one that needs fewer clauses.
    fn select_smaller_encoding(
        weighted_literals: &[WeightedLiteral],
        k: u64,
        clause_database: &dyn ClauseDatabase,
    ) -> PseudoBooleanEncoding {
        let first_free_variable = clause_database.num_variables() + 1;

        let mut totaliser_size = CountingClauseDatabase::new(first_free_variable);
        let totaliser = GeneralisedTotaliserEncoder::encode_at_most_k(
            weighted_literals.to_vec(),
            k,
            &mut totaliser_size,
        );

        let mut network_size = CountingClauseDatabase::new(first_free_variable);
        let network = CardinalityNetworkEncoder::encode_at_most_k(
            weighted_literals.to_vec(),
            k,
            &mut network_size,
        );

        debug!(
            "Encoding sizes for {} literals with k = {k}: totaliser {} clauses, networks {} clauses.",
            weighted_literals.len(),
            totaliser_size.num_clauses(),
            network_size.num_clauses()
        );

        if totaliser.is_ok()
            && network.is_ok()
            && network_size.num_clauses() < totaliser_size.num_clauses()
        {
            PseudoBooleanEncoding::CNE
        } else {
            PseudoBooleanEncoding::GTE
        }
    }
}

pub(crate) fn greatest_common_divisor(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Constraint detected conflict at root level by propagation")]
    RootPropagationConflict,
    #[error("Strengthening caused conflict")]
    CannotStrengthen,
    #[error("Constraint is trivially unsatisfiable")]
    TriviallyUnsatisfiable,
    #[error("Coefficients of the constraint do not fit in 64 bits")]
    CoefficientOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::PropositionalVariable;
    use crate::clause_databases::SatSolverClauseDatabase;
    use crate::clause_databases::VectorClauseDatabase;
    use crate::sat::SatSolverOptions;

    fn create_literals(clause_database: &mut dyn ClauseDatabase, n: usize) -> Vec<Literal> {
        clause_database.new_literals(n)
    }

    #[test]
    fn greatest_common_divisor_of_weights() {
        assert_eq!(4, greatest_common_divisor(0, 4));
        assert_eq!(3, greatest_common_divisor(9, 6));
        assert_eq!(1, greatest_common_divisor(7, 5));
    }

    #[test]
    fn constraint_that_always_holds_adds_no_clauses() {
        let mut database = VectorClauseDatabase::new(0);
        let xs = create_literals(&mut database, 3);

        let mut encoder =
            PseudoBooleanConstraintEncoder::from_literal_vector(&xs, PseudoBooleanEncoding::GTE);
        encoder.constrain_at_most_k(3, &mut database).unwrap();

        assert!(!encoder.has_encoding());
        assert_eq!(0, database.num_clauses());
    }

    #[test]
    fn too_heavy_literals_are_fixed_to_false() {
        let mut database = VectorClauseDatabase::new(0);
        let xs = create_literals(&mut database, 3);
        let weighted_literals = vec![
            WeightedLiteral::new(xs[0], 5),
            WeightedLiteral::new(xs[1], 2),
            WeightedLiteral::new(xs[2], 2),
        ];

        let mut encoder = PseudoBooleanConstraintEncoder::from_weighted_literal_vector(
            weighted_literals,
            PseudoBooleanEncoding::GTE,
        );
        encoder.constrain_at_most_k(4, &mut database).unwrap();

        assert_eq!(Some(false), database.fixed_value(xs[0]));
        assert!(!encoder.has_encoding());
    }

    #[test]
    fn literals_propagated_by_fixing_are_counted_in_the_constant_term() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = create_literals(&mut database, 2);
        database.add_clause(vec![xs[0], xs[1]]).unwrap();
        let mut function = Function::default();
        function.add_weighted_literal(xs[0], 3);
        function.add_weighted_literal(xs[1], 2);

        let mut encoder =
            PseudoBooleanConstraintEncoder::from_function(&function, PseudoBooleanEncoding::GTE);

        // both terms exceed 1, and fixing x1 to false propagates x2 to true
        let result = encoder.constrain_at_most_k(1, &mut database);

        assert!(result.is_err());
    }

    #[test]
    fn fixing_to_a_fixpoint_keeps_the_remaining_bound() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = create_literals(&mut database, 3);
        // ~x1 -> x2
        database.add_clause(vec![xs[0], xs[1]]).unwrap();
        let mut function = Function::default();
        function.add_weighted_literal(xs[0], 5);
        function.add_weighted_literal(xs[1], 2);
        function.add_weighted_literal(xs[2], 2);

        let mut encoder =
            PseudoBooleanConstraintEncoder::from_function(&function, PseudoBooleanEncoding::GTE);
        encoder.constrain_at_most_k(3, &mut database).unwrap();

        // x1 is fixed false, x2 is propagated true and leaves a slack of 1 for x3
        assert_eq!(Some(false), database.fixed_value(xs[0]));
        assert_eq!(Some(true), database.fixed_value(xs[1]));
        assert_eq!(Some(false), database.fixed_value(xs[2]));
    }

    #[test]
    fn constant_term_above_k_is_trivially_unsatisfiable() {
        let mut database = VectorClauseDatabase::new(0);
        let x = database.new_literal();
        let mut function = Function::default();
        function.add_weighted_literal(x, 1);
        function.add_constant_term(3);

        let mut encoder =
            PseudoBooleanConstraintEncoder::from_function(&function, PseudoBooleanEncoding::GTE);

        assert_eq!(
            Err(EncodingError::TriviallyUnsatisfiable),
            encoder.constrain_at_most_k(2, &mut database)
        );
    }

    #[test]
    fn weights_are_divided_by_their_common_divisor() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = create_literals(&mut database, 3);
        let weighted_literals = xs
            .iter()
            .map(|literal| WeightedLiteral::new(*literal, 3))
            .collect();

        let mut encoder = PseudoBooleanConstraintEncoder::from_weighted_literal_vector(
            weighted_literals,
            PseudoBooleanEncoding::CNE,
        );
        // 3 x1 + 3 x2 + 3 x3 <= 7 is x1 + x2 + x3 <= 2
        encoder.constrain_at_most_k(7, &mut database).unwrap();

        assert!(database.add_clause(vec![xs[0]]).is_ok());
        assert!(database.add_clause(vec![xs[1]]).is_ok());
        assert_eq!(Some(false), database.fixed_value(xs[2]));
    }

    #[test]
    fn strengthening_without_encoding_encodes_from_scratch() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = create_literals(&mut database, 2);

        let mut encoder =
            PseudoBooleanConstraintEncoder::from_literal_vector(&xs, PseudoBooleanEncoding::GTE);
        encoder.constrain_at_most_k(2, &mut database).unwrap();
        assert!(!encoder.has_encoding());

        encoder.constrain_at_most_k(1, &mut database).unwrap();
        assert!(encoder.has_encoding());

        assert!(database.add_clause(vec![xs[0]]).is_ok());
        assert_eq!(Some(false), database.fixed_value(xs[1]));
    }

    #[test]
    fn strengthening_below_the_constant_term_fails() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = create_literals(&mut database, 3);
        database.add_clause(vec![xs[0]]).unwrap();

        let mut encoder =
            PseudoBooleanConstraintEncoder::from_literal_vector(&xs, PseudoBooleanEncoding::GTE);
        encoder.constrain_at_most_k(2, &mut database).unwrap();

        assert_eq!(
            Err(EncodingError::TriviallyUnsatisfiable),
            encoder.constrain_at_most_k(0, &mut database)
        );
    }

    #[test]
    fn unsupported_encoding_falls_back_to_the_totaliser() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = create_literals(&mut database, 3);
        let weighted_literals = vec![
            WeightedLiteral::new(xs[0], 1),
            WeightedLiteral::new(xs[1], 2),
            WeightedLiteral::new(xs[2], 3),
        ];

        let mut encoder = PseudoBooleanConstraintEncoder::from_weighted_literal_vector(
            weighted_literals,
            PseudoBooleanEncoding::CNE,
        );
        encoder.constrain_at_most_k(3, &mut database).unwrap();

        assert!(database.add_clause(vec![xs[2]]).is_ok());
        assert_eq!(Some(false), database.fixed_value(xs[0]));
        assert_eq!(Some(false), database.fixed_value(xs[1]));
    }

    #[test]
    fn best_encoding_selects_by_shape() {
        let database = VectorClauseDatabase::new(4);
        let literal = |index| Literal::new(PropositionalVariable::new(index), true);
        let unit: Vec<WeightedLiteral> = (1..=4)
            .map(|index| WeightedLiteral::new(literal(index), 1))
            .collect();
        let weighted = vec![
            WeightedLiteral::new(literal(1), 1),
            WeightedLiteral::new(literal(2), 2),
            WeightedLiteral::new(literal(3), 2),
        ];

        assert_eq!(
            PseudoBooleanEncoding::Sequential,
            PseudoBooleanConstraintEncoder::select_encoding(
                &unit,
                1,
                &database,
                PseudoBooleanEncoding::Best
            )
        );
        assert_eq!(
            PseudoBooleanEncoding::GTE,
            PseudoBooleanConstraintEncoder::select_encoding(
                &weighted,
                2,
                &database,
                PseudoBooleanEncoding::Best
            )
        );
        assert_eq!(
            PseudoBooleanEncoding::GTE,
            PseudoBooleanConstraintEncoder::select_encoding(
                &unit,
                2,
                &database,
                PseudoBooleanEncoding::Sequential
            )
        );
    }
}
