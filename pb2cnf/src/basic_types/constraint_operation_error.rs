use thiserror::Error;

/// Returned when adding a clause to a [`crate::clause_databases::ClauseDatabase`] leaves the
/// database without models.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    #[error("adding the clause failed because it is infeasible at the root")]
    InfeasibleClause,
    #[error("adding the clause failed because the database is already infeasible")]
    InfeasibleState,
}
