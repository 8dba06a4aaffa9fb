use super::Clause;
use super::ClauseReference;
use crate::basic_types::Literal;
use crate::pb2cnf_assert_advanced;
use crate::pb2cnf_assert_moderate;
use crate::pb2cnf_assert_simple;

/// Owns all clauses with at least two literals. Ids of deleted clauses are reused.
#[derive(Default, Debug)]
pub struct ClauseAllocator {
    allocated_clauses: Vec<Clause>,
    deleted_clause_references: Vec<ClauseReference>,
}

impl ClauseAllocator {
    pub fn create_clause(&mut self, literals: Vec<Literal>, is_learned: bool) -> ClauseReference {
        pb2cnf_assert_simple!(literals.len() >= 2);

        let clause = Clause::new(literals, is_learned);
        match self.deleted_clause_references.pop() {
            Some(clause_reference) => {
                self.allocated_clauses[clause_reference.id as usize - 1] = clause;
                clause_reference
            }
            None => {
                self.allocated_clauses.push(clause);
                ClauseReference {
                    id: self.allocated_clauses.len() as u32,
                }
            }
        }
    }

    pub fn get_clause(&self, clause_reference: ClauseReference) -> &Clause {
        pb2cnf_assert_moderate!(!clause_reference.is_null());
        &self.allocated_clauses[clause_reference.id as usize - 1]
    }

    pub fn get_mutable_clause(&mut self, clause_reference: ClauseReference) -> &mut Clause {
        pb2cnf_assert_moderate!(!clause_reference.is_null());
        &mut self.allocated_clauses[clause_reference.id as usize - 1]
    }

    /// Marks the clause as deleted and makes its id available for new clauses.
    pub fn delete_clause(&mut self, clause_reference: ClauseReference) {
        pb2cnf_assert_moderate!(
            !self.get_clause(clause_reference).is_deleted(),
            "cannot delete an already deleted clause"
        );
        pb2cnf_assert_advanced!(!self.deleted_clause_references.contains(&clause_reference));

        self.get_mutable_clause(clause_reference).mark_deleted();
        self.deleted_clause_references.push(clause_reference);
    }

    /// The number of clauses that are allocated and not deleted.
    pub fn num_clauses(&self) -> usize {
        self.allocated_clauses.len() - self.deleted_clause_references.len()
    }
}

impl std::ops::Index<ClauseReference> for ClauseAllocator {
    type Output = Clause;
    fn index(&self, clause_reference: ClauseReference) -> &Clause {
        self.get_clause(clause_reference)
    }
}

impl std::ops::IndexMut<ClauseReference> for ClauseAllocator {
    fn index_mut(&mut self, clause_reference: ClauseReference) -> &mut Clause {
        self.get_mutable_clause(clause_reference)
    }
}
