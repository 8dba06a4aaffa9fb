use super::HashMap;
use super::Literal;
use super::Solution;
use super::WeightedLiteral;
use crate::pb2cnf_assert_moderate;

/// A weighted linear function over [`Literal`]s plus a constant term.
///
/// At most one polarity of each variable carries weight: adding `w * l` when `v * ~l` is present
/// cancels `min(v, w)` into the constant term, since `l + ~l = 1`.
#[derive(Clone, Default, Debug)]
pub struct Function {
    weighted_literals: HashMap<Literal, u64>,
    constant_term: i64,
}

impl Function {
    pub fn add_weighted_literal(&mut self, literal: Literal, weight: u64) {
        if weight == 0 {
            return;
        }

        let negative_literal = !literal;
        if let Some(opposite_weight) = self.weighted_literals.get_mut(&negative_literal) {
            pb2cnf_assert_moderate!(*opposite_weight != 0);
            match weight.cmp(opposite_weight) {
                std::cmp::Ordering::Less => {
                    *opposite_weight -= weight;
                    self.constant_term += weight as i64;
                }
                std::cmp::Ordering::Equal => {
                    let _ = self.weighted_literals.remove(&negative_literal);
                    self.constant_term += weight as i64;
                }
                std::cmp::Ordering::Greater => {
                    let remainder = weight - *opposite_weight;
                    self.constant_term += *opposite_weight as i64;
                    let _ = self.weighted_literals.remove(&negative_literal);
                    let _ = self.weighted_literals.insert(literal, remainder);
                }
            }
        } else {
            *self.weighted_literals.entry(literal).or_insert(0) += weight;
        }
    }

    /// Adds `coefficient * literal` for a possibly negative coefficient; `-w * l` is stored as
    /// `w * ~l - w`.
    pub fn add_term(&mut self, coefficient: i64, literal: Literal) {
        if coefficient >= 0 {
            self.add_weighted_literal(literal, coefficient as u64);
        } else {
            let weight = coefficient.unsigned_abs();
            self.add_weighted_literal(!literal, weight);
            self.constant_term -= weight as i64;
        }
    }

    pub fn add_constant_term(&mut self, value: i64) {
        self.constant_term += value;
    }

    pub fn get_weighted_literals(&self) -> std::collections::hash_map::Iter<'_, Literal, u64> {
        self.weighted_literals.iter()
    }

    pub fn get_constant_term(&self) -> i64 {
        self.constant_term
    }

    pub fn is_empty(&self) -> bool {
        self.weighted_literals.is_empty() && self.constant_term == 0
    }

    /// The largest value the function can take.
    pub fn upper_bound(&self) -> i64 {
        self.constant_term + self.weighted_literals.values().sum::<u64>() as i64
    }

    pub fn evaluate_solution(&self, solution: &Solution) -> i64 {
        self.get_weighted_literals()
            .filter(|(literal, _)| solution.get_literal_value(**literal))
            .map(|(_, weight)| *weight as i64)
            .sum::<i64>()
            + self.constant_term
    }

    /// The terms of the function ordered by literal code.
    ///
    /// The underlying map iterates in an unspecified order, and the encoders are sensitive to the
    /// order of their inputs; sorting keeps runs reproducible.
    pub fn get_function_as_weighted_literals_vector(&self) -> Vec<WeightedLiteral> {
        let mut weighted_literals: Vec<WeightedLiteral> = self
            .get_weighted_literals()
            .map(|(literal, weight)| WeightedLiteral::new(*literal, *weight))
            .collect();
        weighted_literals.sort_by_key(|wl| wl.literal.to_u32());
        weighted_literals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::PropositionalVariable;

    fn literal(index: u32, is_positive: bool) -> Literal {
        Literal::new(PropositionalVariable::new(index), is_positive)
    }

    #[test]
    fn opposite_polarities_cancel_into_the_constant() {
        let mut function = Function::default();
        function.add_weighted_literal(literal(1, true), 5);
        function.add_weighted_literal(literal(1, false), 3);

        let terms = function.get_function_as_weighted_literals_vector();
        assert_eq!(vec![WeightedLiteral::new(literal(1, true), 2)], terms);
        assert_eq!(3, function.get_constant_term());
    }

    #[test]
    fn negative_coefficients_are_rewritten() {
        let mut function = Function::default();
        function.add_term(-4, literal(2, true));

        let solution = Solution::new(vec![true, false, true]);
        assert_eq!(-4, function.evaluate_solution(&solution));

        let solution = Solution::new(vec![true, false, false]);
        assert_eq!(0, function.evaluate_solution(&solution));
    }

    #[test]
    fn upper_bound_sums_all_weights() {
        let mut function = Function::default();
        function.add_weighted_literal(literal(1, true), 2);
        function.add_weighted_literal(literal(2, false), 7);
        function.add_constant_term(-1);

        assert_eq!(8, function.upper_bound());
    }
}
