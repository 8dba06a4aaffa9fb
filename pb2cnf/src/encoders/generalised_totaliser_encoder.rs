use log::debug;

use super::pseudo_boolean_constraint_encoder::EncodingError;
use super::pseudo_boolean_constraint_encoder::PseudoBooleanConstraintEncoderInterface;
use crate::basic_types::HashMap;
use crate::basic_types::Literal;
use crate::basic_types::WeightedLiteral;
use crate::clause_databases::ClauseDatabase;
use crate::pb2cnf_assert_moderate;
use crate::pb2cnf_assert_simple;

/// Implementation of the generalized totalizer encoding for pseudo-boolean constraints.
///
/// # Bibliography
/// \[1] "Generalized totalizer encoding for pseudo-boolean constraints.", Joshi Saurabh, Ruben
/// Martins, Vasco Manquinho; CP '15
#[derive(Debug)]
pub(crate) struct GeneralisedTotaliserEncoder {
    /// The sum literals of the root, sorted by weight.
    root: Vec<WeightedLiteral>,
    /// The root literals from this index onwards are forbidden.
    index_first_forbidden_root_literal: usize,
    num_clauses_added: usize,
}

impl PseudoBooleanConstraintEncoderInterface for GeneralisedTotaliserEncoder {
    fn encode_at_most_k(
        mut weighted_literals: Vec<WeightedLiteral>,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<Self, EncodingError> {
        pb2cnf_assert_simple!(!weighted_literals.is_empty());

        // sorting by weight (stable) keeps the partial sums of neighbouring nodes close, which
        // reduces the size of the encoding significantly
        weighted_literals.sort_by_key(|term| term.weight);

        let mut encoder = GeneralisedTotaliserEncoder {
            root: vec![],
            index_first_forbidden_root_literal: usize::MAX,
            num_clauses_added: 0,
        };
        encoder.encode_at_most_k_standard_case(weighted_literals, k, clause_database)?;

        Ok(encoder)
    }

    fn strengthen_at_most_k(
        &mut self,
        new_k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        pb2cnf_assert_simple!(self.index_first_forbidden_root_literal <= self.root.len());

        // the root is sorted by weight, so the literals to forbid form a suffix
        for i in (0..self.index_first_forbidden_root_literal).rev() {
            if self.root[i].weight <= new_k {
                break;
            }

            self.num_clauses_added += 1;
            self.index_first_forbidden_root_literal = i;

            clause_database
                .add_clause(vec![!self.root[i].literal])
                .map_err(|_| EncodingError::CannotStrengthen)?;
        }
        Ok(())
    }
}

impl GeneralisedTotaliserEncoder {
    /// The totaliser is a binary tree whose leaves are the input literals. Every internal node
    /// holds one fresh literal per achievable partial sum (at most `k`) of the leaves below it, so
    /// the root holds all feasible sums of the inputs. Each layer has half the nodes of the
    /// previous one, but the number of partial sums per node can grow exponentially.
    fn encode_at_most_k_standard_case(
        &mut self,
        weighted_literals: Vec<WeightedLiteral>,
        k: u64,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        let mut current_layer: Vec<Vec<WeightedLiteral>> = weighted_literals
            .iter()
            .map(|term| vec![*term])
            .collect();

        // reused across merges to avoid allocating in every iteration
        let mut value_to_literal_map: HashMap<u64, Literal> = HashMap::default();
        let mut partial_sums: Vec<u64> = Vec::new();

        let num_layers = weighted_literals.len().next_power_of_two().ilog2();
        for _ in 0..num_layers {
            let mut next_layer: Vec<Vec<WeightedLiteral>> =
                Vec::with_capacity(current_layer.len().div_ceil(2));

            for pair in current_layer.chunks(2) {
                let [node1, node2] = pair else {
                    // the odd node out is carried over to the next layer unchanged
                    next_layer.push(pair[0].clone());
                    continue;
                };

                // first collect the distinct partial sums
                partial_sums.clear();
                for term in node1.iter().chain(node2.iter()) {
                    pb2cnf_assert_moderate!(term.weight <= k);
                    partial_sums.push(term.weight);
                }
                for wl1 in node1 {
                    for wl2 in node2 {
                        let combined_weight = wl1.weight + wl2.weight;
                        if combined_weight > k {
                            // the nodes are sorted, later sums only get larger
                            break;
                        }
                        partial_sums.push(combined_weight);
                    }
                }
                partial_sums.sort_unstable();
                partial_sums.dedup();

                // then create one literal per partial sum
                value_to_literal_map.clear();
                let mut next_layer_node: Vec<WeightedLiteral> =
                    Vec::with_capacity(partial_sums.len());
                for &partial_sum in &partial_sums {
                    let literal = clause_database.new_literal();
                    let _ = value_to_literal_map.insert(partial_sum, literal);
                    next_layer_node.push(WeightedLiteral::new(literal, partial_sum));
                }

                //  node[weight] -> next_layer_node[weight]
                for term in node1.iter().chain(node2.iter()) {
                    let sum_literal = value_to_literal_map[&term.weight];
                    self.add_encoding_clause(vec![!term.literal, sum_literal], clause_database)?;
                }

                //  node1[weight1] + node2[weight2] -> next_layer_node[weight1 + weight2]
                //  or, if the sum exceeds k, the two cannot both be true
                for wl1 in node1 {
                    for wl2 in node2 {
                        let combined_weight = wl1.weight + wl2.weight;
                        let clause = match value_to_literal_map.get(&combined_weight) {
                            Some(&sum_literal) => vec![!wl1.literal, !wl2.literal, sum_literal],
                            None => vec![!wl1.literal, !wl2.literal],
                        };
                        self.add_encoding_clause(clause, clause_database)?;
                    }
                }

                next_layer.push(next_layer_node);
            }

            current_layer = next_layer;
        }

        pb2cnf_assert_simple!(current_layer.len() == 1);

        // The root may have holes: a true literal of weight m_1 does not imply that the literal
        // of a smaller weight m_2 is true, as it would in the unweighted totaliser. Any sum in
        // the inputs does force the root literal of exactly that weight, which is all that
        // strengthening needs.
        self.root = current_layer.pop().unwrap_or_default();
        self.index_first_forbidden_root_literal = self.root.len();

        debug!(
            "Totaliser added {} clauses for {} literals and k = {k}.",
            self.num_clauses_added,
            weighted_literals.len()
        );

        Ok(())
    }

    fn add_encoding_clause(
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

    #[test]
    fn at_most_one_of_two_literals() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = database.new_literals(2);
        let weighted_literals = xs.iter().map(|x| WeightedLiteral::new(*x, 1)).collect();

        let _ = GeneralisedTotaliserEncoder::encode_at_most_k(weighted_literals, 1, &mut database)
            .expect("valid encoding");

        assert!(database.add_clause(vec![xs[0]]).is_ok());
        assert!(database.add_clause(vec![xs[1]]).is_err());
    }

    #[test]
    fn root_holds_distinct_feasible_sums() {
        let mut database = CountingClauseDatabase::new(4);
        let xs = database.new_literals(3);
        let weighted_literals = vec![
            WeightedLiteral::new(xs[0], 2),
            WeightedLiteral::new(xs[1], 2),
            WeightedLiteral::new(xs[2], 3),
        ];

        let encoder =
            GeneralisedTotaliserEncoder::encode_at_most_k(weighted_literals, 5, &mut database)
                .expect("valid encoding");

        let weights: Vec<u64> = encoder.root.iter().map(|term| term.weight).collect();
        assert_eq!(vec![2, 3, 4, 5], weights);
    }

    #[test]
    fn strengthening_forbids_heavy_sums() {
        let mut database = SatSolverClauseDatabase::new(SatSolverOptions::default());
        let xs = database.new_literals(3);
        let weighted_literals = vec![
            WeightedLiteral::new(xs[0], 1),
            WeightedLiteral::new(xs[1], 2),
            WeightedLiteral::new(xs[2], 2),
        ];

        let mut encoder =
            GeneralisedTotaliserEncoder::encode_at_most_k(weighted_literals, 4, &mut database)
                .expect("valid encoding");
        encoder
            .strengthen_at_most_k(2, &mut database)
            .expect("valid strengthening");

        assert!(database.add_clause(vec![xs[1]]).is_ok());
        assert_eq!(Some(false), database.fixed_value(xs[2]));
        assert_eq!(Some(false), database.fixed_value(xs[0]));
    }
}
