//! Integer sequences used to space out restarts.

mod constant_sequence;
mod geometric_sequence;
mod luby_sequence;
mod sequence_generator;
mod sequence_generator_type;

pub use constant_sequence::ConstantSequence;
pub use geometric_sequence::GeometricSequence;
pub use luby_sequence::LubySequence;
pub use sequence_generator::SequenceGenerator;
pub use sequence_generator_type::SequenceGeneratorType;
