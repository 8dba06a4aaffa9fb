//! Readers for the input formats: DIMACS CNF/WCNF ([`dimacs`]) and the pseudo-Boolean OPB format
//! ([`opb`]). Both read their input in chunks and hand what they find to a sink, so the same
//! parser can build a solver, a clause database, or a plain in-memory instance.

pub mod dimacs;
pub mod opb;
