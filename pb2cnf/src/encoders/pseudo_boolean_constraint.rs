use std::fmt::Display;

use itertools::Itertools;

use super::pseudo_boolean_constraint_encoder::greatest_common_divisor;
use super::EncodingError;
use crate::basic_types::HashMap;
use crate::basic_types::Literal;
use crate::basic_types::PropositionalVariable;
use crate::basic_types::Solution;
use crate::basic_types::WeightedLiteral;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparator {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparator::LessEqual => write!(f, "<="),
            Comparator::GreaterEqual => write!(f, ">="),
            Comparator::Equal => write!(f, "="),
        }
    }
}

/// A linear constraint `sum c_i l_i <comparator> rhs` with signed integer coefficients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PseudoBooleanConstraint {
    pub terms: Vec<(i64, Literal)>,
    pub comparator: Comparator,
    pub rhs: i64,
}

/// The normal form `sum w_i l_i <= k` with positive weights.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtMostK {
    pub weighted_literals: Vec<WeightedLiteral>,
    pub k: u64,
}

impl PseudoBooleanConstraint {
    pub fn new(
        terms: Vec<(i64, Literal)>,
        comparator: Comparator,
        rhs: i64,
    ) -> PseudoBooleanConstraint {
        PseudoBooleanConstraint {
            terms,
            comparator,
            rhs,
        }
    }

    pub fn is_satisfied_by(&self, solution: &Solution) -> bool {
        let lhs = self
            .terms
            .iter()
            .filter(|(_, literal)| solution.get_literal_value(*literal))
            .map(|(coefficient, _)| *coefficient as i128)
            .sum::<i128>();
        let rhs = self.rhs as i128;

        match self.comparator {
            Comparator::LessEqual => lhs <= rhs,
            Comparator::GreaterEqual => lhs >= rhs,
            Comparator::Equal => lhs == rhs,
        }
    }

    /// Rewrites the constraint into at most two [`AtMostK`] constraints, one for each direction
    /// of the comparator. Constraints that always hold are left out, so the result can be empty.
    pub fn normalise(&self) -> Result<Vec<AtMostK>, EncodingError> {
        let less_equal = || normalise_less_equal(self.terms.iter().copied(), self.rhs as i128);
        let greater_equal = || {
            normalise_less_equal(
                self.terms
                    .iter()
                    .map(|&(coefficient, literal)| (-coefficient, literal)),
                -(self.rhs as i128),
            )
        };

        let normalised = match self.comparator {
            Comparator::LessEqual => vec![less_equal()?],
            Comparator::GreaterEqual => vec![greater_equal()?],
            Comparator::Equal => vec![less_equal()?, greater_equal()?],
        };

        Ok(normalised.into_iter().flatten().collect())
    }
}

/// Normalises `sum c_i l_i <= rhs`; `None` if the constraint always holds.
fn normalise_less_equal(
    terms: impl Iterator<Item = (i64, Literal)>,
    mut rhs: i128,
) -> Result<Option<AtMostK>, EncodingError> {
    // the coefficient of the positive literal of every variable, with ~x = 1 - x
    let mut coefficients: HashMap<PropositionalVariable, i128> = HashMap::default();
    for (coefficient, literal) in terms {
        let coefficient = coefficient as i128;
        let entry = coefficients
            .entry(literal.get_propositional_variable())
            .or_insert(0);
        if literal.is_positive() {
            *entry += coefficient;
        } else {
            *entry -= coefficient;
            rhs -= coefficient;
        }
    }

    // -w x = w ~x - w
    let mut weighted_literals = vec![];
    for (variable, coefficient) in coefficients
        .into_iter()
        .sorted_by_key(|(variable, _)| *variable)
    {
        let literal = Literal::new(variable, coefficient > 0);
        if coefficient < 0 {
            rhs -= coefficient;
        }
        if coefficient != 0 {
            let weight =
                u64::try_from(coefficient.abs()).map_err(|_| EncodingError::CoefficientOverflow)?;
            weighted_literals.push(WeightedLiteral::new(literal, weight));
        }
    }

    if rhs < 0 {
        return Err(EncodingError::TriviallyUnsatisfiable);
    }

    let sum_of_weights = weighted_literals
        .iter()
        .map(|term| term.weight as i128)
        .sum::<i128>();
    if sum_of_weights <= rhs {
        return Ok(None);
    }

    let divisor = weighted_literals
        .iter()
        .fold(0, |divisor, term| greatest_common_divisor(divisor, term.weight));
    for term in weighted_literals.iter_mut() {
        term.weight /= divisor;
    }
    let k = u64::try_from(rhs / divisor as i128).map_err(|_| EncodingError::CoefficientOverflow)?;

    Ok(Some(AtMostK {
        weighted_literals,
        k,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(index: u32) -> Literal {
        Literal::new(PropositionalVariable::new(index), true)
    }

    #[test]
    fn less_equal_with_positive_coefficients_is_unchanged() {
        let constraint =
            PseudoBooleanConstraint::new(vec![(2, x(1)), (3, x(2))], Comparator::LessEqual, 4);

        assert_eq!(
            vec![AtMostK {
                weighted_literals: vec![
                    WeightedLiteral::new(x(1), 2),
                    WeightedLiteral::new(x(2), 3)
                ],
                k: 4
            }],
            constraint.normalise().unwrap()
        );
    }

    #[test]
    fn greater_equal_negates_literals() {
        // x1 + x2 + x3 >= 2 is ~x1 + ~x2 + ~x3 <= 1
        let constraint = PseudoBooleanConstraint::new(
            vec![(1, x(1)), (1, x(2)), (1, x(3))],
            Comparator::GreaterEqual,
            2,
        );

        assert_eq!(
            vec![AtMostK {
                weighted_literals: vec![
                    WeightedLiteral::new(!x(1), 1),
                    WeightedLiteral::new(!x(2), 1),
                    WeightedLiteral::new(!x(3), 1)
                ],
                k: 1
            }],
            constraint.normalise().unwrap()
        );
    }

    #[test]
    fn negative_coefficients_move_into_the_right_hand_side() {
        // 2 x1 - 3 x2 <= 1 is 2 x1 + 3 ~x2 <= 4
        let constraint =
            PseudoBooleanConstraint::new(vec![(2, x(1)), (-3, x(2))], Comparator::LessEqual, 1);

        let normalised = constraint.normalise().unwrap();
        assert_eq!(1, normalised.len());
        assert_eq!(4, normalised[0].k);
        assert_eq!(
            vec![
                WeightedLiteral::new(x(1), 2),
                WeightedLiteral::new(!x(2), 3)
            ],
            normalised[0].weighted_literals
        );
    }

    #[test]
    fn duplicate_and_opposite_literals_are_merged() {
        // x1 + x1 + 3 ~x1 + x2 <= 3 is 3 - x1 + x2 <= 3, so ~x1 + x2 <= 1
        let constraint = PseudoBooleanConstraint::new(
            vec![(1, x(1)), (1, x(1)), (3, !x(1)), (1, x(2))],
            Comparator::LessEqual,
            3,
        );

        assert_eq!(
            vec![AtMostK {
                weighted_literals: vec![WeightedLiteral::new(!x(1), 1), WeightedLiteral::new(x(2), 1)],
                k: 1
            }],
            constraint.normalise().unwrap()
        );
    }

    #[test]
    fn weights_are_divided_by_the_gcd() {
        let constraint = PseudoBooleanConstraint::new(
            vec![(4, x(1)), (6, x(2)), (2, x(3))],
            Comparator::LessEqual,
            7,
        );

        let normalised = constraint.normalise().unwrap();
        assert_eq!(3, normalised[0].k);
        assert_eq!(
            vec![2, 3, 1],
            normalised[0]
                .weighted_literals
                .iter()
                .map(|term| term.weight)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn trivial_constraints() {
        let always_holds =
            PseudoBooleanConstraint::new(vec![(1, x(1)), (1, x(2))], Comparator::LessEqual, 2);
        let never_holds =
            PseudoBooleanConstraint::new(vec![(1, x(1)), (1, x(2))], Comparator::GreaterEqual, 3);
        let zero_coefficients =
            PseudoBooleanConstraint::new(vec![(0, x(1))], Comparator::Equal, 0);

        assert!(always_holds.normalise().unwrap().is_empty());
        assert_eq!(
            Err(EncodingError::TriviallyUnsatisfiable),
            never_holds.normalise()
        );
        assert!(zero_coefficients.normalise().unwrap().is_empty());
    }

    #[test]
    fn equality_gives_both_directions() {
        let constraint = PseudoBooleanConstraint::new(
            vec![(1, x(1)), (1, x(2)), (1, x(3))],
            Comparator::Equal,
            1,
        );

        let normalised = constraint.normalise().unwrap();
        assert_eq!(2, normalised.len());
        assert_eq!(1, normalised[0].k);
        assert_eq!(2, normalised[1].k);
    }

    #[test]
    fn satisfaction_check() {
        let constraint =
            PseudoBooleanConstraint::new(vec![(2, x(1)), (-1, x(2))], Comparator::Equal, 1);

        assert!(constraint.is_satisfied_by(&Solution::new(vec![false, true, true])));
        assert!(!constraint.is_satisfied_by(&Solution::new(vec![false, true, false])));
    }
}
