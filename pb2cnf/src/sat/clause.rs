use crate::basic_types::Literal;
use crate::pb2cnf_assert_advanced;
use crate::pb2cnf_assert_moderate;
use crate::pb2cnf_assert_simple;

/// Identifies a clause stored in the [`super::ClauseAllocator`]. Id zero is never handed out and
/// serves as the null reference (the reason of decisions and root assignments).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClauseReference {
    pub(crate) id: u32,
}

impl ClauseReference {
    pub const NULL: ClauseReference = ClauseReference { id: 0 };

    pub fn is_null(&self) -> bool {
        self.id == 0
    }
}

impl std::fmt::Display for ClauseReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.id)
    }
}

#[derive(Debug, Clone)]
pub struct Clause {
    literals: Vec<Literal>,
    is_learned: bool,
    is_deleted: bool,
    is_protected_against_deletion: bool,
    lbd: u32,
    activity: f32,
}

impl Clause {
    pub fn new(literals: Vec<Literal>, is_learned: bool) -> Clause {
        pb2cnf_assert_simple!(literals.len() >= 2);

        // pessimistic until computed
        let lbd = literals.len() as u32;
        Clause {
            literals,
            is_learned,
            is_deleted: false,
            is_protected_against_deletion: false,
            lbd,
            activity: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_learned(&self) -> bool {
        self.is_learned
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn is_protected_against_deletion(&self) -> bool {
        self.is_protected_against_deletion
    }

    pub fn get_literal_slice(&self) -> &[Literal] {
        &self.literals
    }

    pub fn lbd(&self) -> u32 {
        self.lbd
    }

    pub fn get_activity(&self) -> f32 {
        pb2cnf_assert_advanced!(self.activity == 0.0 || self.activity.is_normal());
        self.activity
    }

    /// Only marks the clause; the allocator is responsible for actually releasing it.
    pub(crate) fn mark_deleted(&mut self) {
        pb2cnf_assert_moderate!(!self.is_deleted);
        self.is_deleted = true;
    }

    pub fn mark_protection_against_deletion(&mut self) {
        self.is_protected_against_deletion = true;
    }

    pub fn clear_protection_against_deletion(&mut self) {
        self.is_protected_against_deletion = false;
    }

    pub fn update_lbd(&mut self, new_lbd: u32) {
        pb2cnf_assert_moderate!(new_lbd < self.lbd);
        self.lbd = new_lbd;
    }

    pub fn increase_activity(&mut self, increment: f32) {
        self.activity += increment;
    }

    pub fn divide_activity(&mut self, division_factor: f32) {
        self.activity /= division_factor;
    }
}

impl std::ops::Index<usize> for Clause {
    type Output = Literal;
    fn index(&self, index: usize) -> &Literal {
        &self.literals[index]
    }
}

impl std::ops::IndexMut<usize> for Clause {
    fn index_mut(&mut self, index: usize) -> &mut Literal {
        &mut self.literals[index]
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let literals = self
            .literals
            .iter()
            .map(|literal| literal.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        write!(
            f,
            "({literals})[learned: {}, deleted: {}]",
            self.is_learned, self.is_deleted
        )
    }
}
