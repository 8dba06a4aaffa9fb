//! A conflict-driven clause learning SAT solver.

mod assignments_propositional;
mod clausal_propagator;
mod clause;
mod clause_allocator;
mod learned_clause_manager;
mod learned_clause_minimiser;
mod propositional_value_selector;
mod propositional_variable_selector;
mod restart_strategy;
mod sat_solver;

pub use assignments_propositional::AssignmentsPropositional;
pub use clausal_propagator::ClausalPropagator;
pub use clausal_propagator::PropagationStatusClausal;
pub use clause::Clause;
pub use clause::ClauseReference;
pub use clause_allocator::ClauseAllocator;
pub use learned_clause_manager::LearnedClauseManager;
pub use learned_clause_manager::LearnedClauseSortingStrategy;
pub use learned_clause_manager::LearningOptions;
pub use learned_clause_minimiser::LearnedClauseMinimiser;
pub use propositional_value_selector::PropositionalValueSelector;
pub use propositional_variable_selector::PropositionalVariableSelector;
pub use restart_strategy::RestartOptions;
pub(crate) use restart_strategy::RestartStrategy;
pub(crate) use sat_solver::preprocess_clause;
pub use sat_solver::Counters;
pub use sat_solver::SatSolver;
pub use sat_solver::SatSolverOptions;
pub use sat_solver::SatisfactionResult;
