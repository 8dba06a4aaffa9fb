//! Translations of pseudo-Boolean constraints into clauses.
//!
//! [`Pb2Cnf`] is the entry point for complete constraints (any comparator, signed coefficients).
//! [`PseudoBooleanConstraintEncoder`] encodes a single `sum w_i x_i <= k` and can later strengthen
//! it, which is what optimisation needs.

mod cardinality_networks_encoder;
mod generalised_totaliser_encoder;
mod pb2cnf;
mod pseudo_boolean_constraint;
mod pseudo_boolean_constraint_encoder;
mod sequential_encoder;

pub(crate) use cardinality_networks_encoder::CardinalityNetworkEncoder;
pub(crate) use generalised_totaliser_encoder::GeneralisedTotaliserEncoder;
pub use pb2cnf::Pb2Cnf;
pub use pseudo_boolean_constraint::AtMostK;
pub use pseudo_boolean_constraint::Comparator;
pub use pseudo_boolean_constraint::PseudoBooleanConstraint;
pub use pseudo_boolean_constraint_encoder::EncodingError;
pub use pseudo_boolean_constraint_encoder::PseudoBooleanConstraintEncoder;
pub(crate) use pseudo_boolean_constraint_encoder::PseudoBooleanConstraintEncoderInterface;
pub use pseudo_boolean_constraint_encoder::PseudoBooleanEncoding;
pub(crate) use sequential_encoder::SequentialEncoder;
