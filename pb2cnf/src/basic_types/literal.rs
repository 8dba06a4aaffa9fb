use std::num::NonZeroI32;

use super::PropositionalVariable;
use crate::pb2cnf_assert_moderate;

/// A propositional variable together with a polarity.
///
/// Literals are stored as `2 * index + is_positive`, so that the two literals of a variable are
/// adjacent and data can be stored per literal in a plain vector (see the `Index<Literal>`
/// implementation for `Vec`).
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    code: u32,
}

impl Literal {
    pub fn new(propositional_variable: PropositionalVariable, is_positive: bool) -> Literal {
        Literal {
            code: propositional_variable.index() * 2 + (is_positive as u32),
        }
    }

    pub fn is_positive(&self) -> bool {
        (self.code & 1) == 1
    }

    pub fn is_negative(&self) -> bool {
        (self.code & 1) == 0
    }

    pub fn get_propositional_variable(&self) -> PropositionalVariable {
        PropositionalVariable::new(self.code / 2)
    }

    pub fn to_u32(self) -> u32 {
        self.code
    }

    pub fn u32_to_literal(literal_code: u32) -> Literal {
        let literal = Literal { code: literal_code };
        pb2cnf_assert_moderate!(literal.to_u32() == literal_code);
        literal
    }

    /// The DIMACS representation of the literal: the variable index, negated for negative
    /// literals.
    pub fn to_dimacs(self) -> i32 {
        let index = self.get_propositional_variable().index() as i32;
        if self.is_positive() {
            index
        } else {
            -index
        }
    }

    pub fn from_dimacs(dimacs_code: NonZeroI32) -> Literal {
        Literal::new(
            PropositionalVariable::new(dimacs_code.unsigned_abs().get()),
            dimacs_code.get().is_positive(),
        )
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;
    fn not(self) -> Literal {
        Literal {
            code: self.code ^ 1,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_negative() {
            write!(f, "~{}", self.get_propositional_variable())
        } else {
            write!(f, "{}", self.get_propositional_variable())
        }
    }
}

impl<T> std::ops::Index<Literal> for Vec<T> {
    type Output = T;
    fn index(&self, index_literal: Literal) -> &T {
        self.index(index_literal.to_u32() as usize)
    }
}

impl<T> std::ops::IndexMut<Literal> for Vec<T> {
    fn index_mut(&mut self, index_literal: Literal) -> &mut T {
        self.index_mut(index_literal.to_u32() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_flips_polarity_only() {
        let literal = Literal::new(PropositionalVariable::new(7), true);

        assert!(!(!literal).is_positive());
        assert_eq!(
            literal.get_propositional_variable(),
            (!literal).get_propositional_variable()
        );
        assert_eq!(literal, !!literal);
    }

    #[test]
    fn dimacs_codes_use_the_variable_index() {
        let positive = Literal::from_dimacs(NonZeroI32::new(12).unwrap());
        let negative = Literal::from_dimacs(NonZeroI32::new(-3).unwrap());

        assert_eq!(12, positive.to_dimacs());
        assert_eq!(-3, negative.to_dimacs());
        assert_eq!(3, negative.get_propositional_variable().index());
    }
}
