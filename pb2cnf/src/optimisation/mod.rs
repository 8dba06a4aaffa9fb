//! Minimisation of a [`Function`](crate::basic_types::Function) over the models of a clause
//! database, by linear search on the objective value.

mod linear_search;
mod optimisation_result;
mod optimisation_solver;

pub use linear_search::LinearSearch;
pub use optimisation_result::OptimisationResult;
pub use optimisation_solver::OptimisationSolver;
