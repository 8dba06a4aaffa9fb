//! Translation of pseudo-Boolean constraints into CNF.
//!
//! The core is [`encoders::Pb2Cnf`], which turns a [`encoders::PseudoBooleanConstraint`] into
//! clauses using one of several encodings (generalised totaliser, cardinality networks, or a
//! sequential counter) and hands them to a [`clause_databases::ClauseDatabase`]. Around it the
//! crate provides an OPB and DIMACS front-end ([`parsers`]), a CDCL solver to run the encodings on
//! ([`sat`]), linear search for optimisation problems ([`optimisation`]), and a grid routing
//! model built on top of all of this ([`routing`]).
//!
//! ```
//! use pb2cnf::basic_types::WeightedLiteral;
//! use pb2cnf::clause_databases::ClauseDatabase;
//! use pb2cnf::clause_databases::VectorClauseDatabase;
//! use pb2cnf::encoders::Pb2Cnf;
//!
//! let mut clause_database = VectorClauseDatabase::new(0);
//! let x = clause_database.new_literals(3);
//! let terms = x
//!     .iter()
//!     .map(|&literal| WeightedLiteral::new(literal, 1))
//!     .collect::<Vec<_>>();
//!
//! // x1 + x2 + x3 <= 1
//! Pb2Cnf::default()
//!     .encode_at_most_k(&terms, 1, &mut clause_database)
//!     .expect("the constraint is satisfiable");
//! assert!(!clause_database.clauses().is_empty());
//! ```
pub mod basic_types;
pub mod clause_databases;
pub mod encoders;
pub mod optimisation;
pub mod parsers;
pub mod routing;
pub mod sat;
pub mod statistics;
pub mod termination;

pub(crate) mod pb2cnf_asserts;

pub mod asserts {
    pub use crate::pb2cnf_asserts::*;
}
