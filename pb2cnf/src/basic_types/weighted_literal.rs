use super::Literal;

/// A term `weight * literal` of a pseudo-Boolean constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WeightedLiteral {
    pub literal: Literal,
    pub weight: u64,
}

impl WeightedLiteral {
    pub fn new(literal: Literal, weight: u64) -> WeightedLiteral {
        WeightedLiteral { literal, weight }
    }
}

impl std::fmt::Display for WeightedLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.weight, self.literal)
    }
}
