use std::time::Instant;

use log::debug;

use super::pseudo_boolean_constraint_encoder::EncodingError;
use super::PseudoBooleanConstraintEncoderInterface;
use crate::basic_types::Literal;
use crate::basic_types::WeightedLiteral;
use crate::clause_databases::ClauseDatabase;
use crate::pb2cnf_assert_eq_simple;
use crate::pb2cnf_assert_simple;

/// An implementation of the cardinality network encoding for unweighted cardinality constraints in
/// the form `x1 + ... + xn <= k`. The encoding is arc-consistent and supports incremental
/// strengthening of the upper bound.
///
/// Reference:
/// Asín, Roberto, et al. Cardinality networks: a theoretical and empirical study.
/// Constraints, 2011, 16: 195-221.
#[derive(Debug)]
pub(crate) struct CardinalityNetworkEncoder {
    literals: Vec<Literal>,
    /// `output[i]` is implied by at least `i + 1` true inputs.
    output: Vec<Literal>,
    num_clauses_added: usize,
}

impl PseudoBooleanConstraintEncoderInterface for CardinalityNetworkEncoder {
    fn encode_at_most_k(
        weighted_literals: Vec<WeightedLiteral>,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Self, EncodingError> {
        pb2cnf_assert_simple!(
            weighted_literals.iter().all(|term| term.weight == 1),
            "Sorting network encoding is only supported on unweighted constraints."
        );

        let literals = weighted_literals
            .into_iter()
            .map(|term| term.literal)
            .collect();

        CardinalityNetworkEncoder::new(literals, k, clause_database)
    }

    fn strengthen_at_most_k(
        &mut self,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        if self.output.is_empty() {
            return Ok(());
        }

        pb2cnf_assert_simple!(
            k < self.output.len() as u64,
            "The upper bound cannot be larger than the greatest possible value."
        );

        debug!("Cardinality network strengthened to k = {k}.");

        self.num_clauses_added += 1;
        clause_database
            .add_clause(vec![!self.output[k as usize]])
            .map_err(|_| EncodingError::CannotStrengthen)
    }
}

impl CardinalityNetworkEncoder {
    /// Create a new encoder from the given literals which form the left-hand side.
    pub(crate) fn new(
        literals: Vec<Literal>,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Self, EncodingError> {
        let mut encoder = CardinalityNetworkEncoder {
            literals,
            output: vec![],
            num_clauses_added: 0,
        };

        encoder.create_encoding(k, clause_database)?;

        Ok(encoder)
    }

    fn create_encoding(
        &mut self,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        pb2cnf_assert_simple!(
            self.output.is_empty(),
            "Can only generate the encoding once."
        );

        let time_start = Instant::now();
        let result = self.generate_clauses(k, clause_database);

        debug!(
            "Cardinality network added {} clauses in {} seconds.",
            self.num_clauses_added,
            time_start.elapsed().as_secs()
        );

        result?;

        if !self.output.is_empty() {
            self.num_clauses_added += 1;
            clause_database
                .add_clause(vec![!self.output[k as usize]])
                .map_err(|_| EncodingError::RootPropagationConflict)?;
        }

        Ok(())
    }

    fn generate_clauses(
        &mut self,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        let n = self.literals.len() as u64;

        if n == 0 {
            return Ok(());
        }

        // the networks work on blocks of size p
        let p = find_next_power_of_two(k);

        let num_padding_literals = n.next_multiple_of(p) - n;
        let padding_literals = clause_database.new_literals(num_padding_literals as usize);
        for &literal in padding_literals.iter() {
            self.add_clause(vec![!literal], clause_database)?;
        }

        let inputs = [self.literals.as_slice(), padding_literals.as_slice()].concat();
        self.output = self.card(&inputs, p, clause_database)?;

        Ok(())
    }

    /// Simplified merge: only the first `a.len() + 1` outputs of the merge of `a` and `b`.
    fn s_merge(
        &mut self,
        a: &[Literal],
        b: &[Literal],
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Vec<Literal>, EncodingError> {
        pb2cnf_assert_eq_simple!(a.len(), b.len());

        if a.len() == 1 {
            let c = clause_database.new_literals(2);

            let a = a[0];
            let b = b[0];

            self.add_clause(vec![!a, !b, c[1]], clause_database)?;
            self.add_clause(vec![!a, c[0]], clause_database)?;
            self.add_clause(vec![!b, c[0]], clause_database)?;

            return Ok(c);
        }

        pb2cnf_assert_eq_simple!(0, a.len() & 1);

        let d = self.s_merge(&odd_literals(a), &odd_literals(b), clause_database)?;
        let e = self.s_merge(&even_literals(a), &even_literals(b), clause_database)?;

        pb2cnf_assert_eq_simple!((a.len() >> 1) + 1, d.len());
        pb2cnf_assert_eq_simple!((a.len() >> 1) + 1, e.len());

        let mut c = clause_database.new_literals(a.len());
        c.insert(0, d[0]);

        self.add_merge_clauses(&d, &e, &c, a.len() >> 1, clause_database)?;

        Ok(c)
    }

    fn h_sort(
        &mut self,
        seq: &[Literal],
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Vec<Literal>, EncodingError> {
        pb2cnf_assert_simple!(seq.len() & 1 == 0);

        let n = seq.len() >> 1;

        if n == 1 {
            return self.h_merge(&[seq[0]], &[seq[1]], clause_database);
        }

        let d = self.h_sort(&seq[..n], clause_database)?;
        let d_prime = self.h_sort(&seq[n..], clause_database)?;

        self.h_merge(&d, &d_prime, clause_database)
    }

    fn h_merge(
        &mut self,
        a: &[Literal],
        b: &[Literal],
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Vec<Literal>, EncodingError> {
        pb2cnf_assert_eq_simple!(a.len(), b.len());

        let n = a.len();

        if n == 1 {
            return self.s_merge(a, b, clause_database);
        }

        let d = self.h_merge(&odd_literals(a), &odd_literals(b), clause_database)?;
        let e = self.h_merge(&even_literals(a), &even_literals(b), clause_database)?;

        let mut c = clause_database.new_literals(2 * n - 2);
        c.insert(0, d[0]);
        c.push(e[e.len() - 1]);

        self.add_merge_clauses(&d, &e, &c, n - 1, clause_database)?;

        Ok(c)
    }

    /// The first `p` outputs of a sorting network over `a`, whose length is a multiple of `p`.
    fn card(
        &mut self,
        a: &[Literal],
        p: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Vec<Literal>, EncodingError> {
        let n = a.len() as u64;
        pb2cnf_assert_eq_simple!(0, n % p);

        if n == p {
            return self.h_sort(a, clause_database);
        }

        let d = self.card(&a[..p as usize], p, clause_database)?;
        let d_prime = self.card(&a[p as usize..], p, clause_database)?;

        let mut c = self.s_merge(&d, &d_prime, clause_database)?;
        let _ = c.pop();

        Ok(c)
    }

    fn add_merge_clauses(
        &mut self,
        d: &[Literal],
        e: &[Literal],
        c: &[Literal],
        num_pairs: usize,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        for i in 0..num_pairs {
            self.add_clause(vec![!d[i + 1], !e[i], c[2 * (i + 1)]], clause_database)?;
            self.add_clause(vec![!d[i + 1], c[2 * i + 1]], clause_database)?;
            self.add_clause(vec![!e[i], c[2 * i + 1]], clause_database)?;
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

/// The smallest power of two that is strictly greater than `k`.
fn find_next_power_of_two(k: u64) -> u64 {
    (k + 1).next_power_of_two()
}

fn odd_literals(literals: &[Literal]) -> Vec<Literal> {
    // sequences in the literature start at 1, so the "odd" literals are at even indices
    literals.iter().copied().step_by(2).collect()
}

fn even_literals(literals: &[Literal]) -> Vec<Literal> {
    literals.iter().copied().skip(1).step_by(2).collect()
}
