mod constraint_operation_error;
mod function;
mod hash_structures;
mod key_value_heap;
mod literal;
mod propositional_variable;
pub mod sequence_generators;
mod solution;
mod stopwatch;
mod weighted_literal;

pub use constraint_operation_error::ConstraintOperationError;
pub use function::Function;
pub use hash_structures::HashMap;
pub use hash_structures::HashSet;
pub use key_value_heap::KeyValueHeap;
pub use literal::Literal;
pub use propositional_variable::PropositionalVariable;
pub use propositional_variable::PropositionalVariableGeneratorIterator;
pub use solution::Solution;
pub use stopwatch::Stopwatch;
pub use weighted_literal::WeightedLiteral;
