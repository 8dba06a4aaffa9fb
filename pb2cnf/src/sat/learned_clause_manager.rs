use clap::ValueEnum;

use super::AssignmentsPropositional;
use super::ClausalPropagator;
use super::ClauseAllocator;
use super::ClauseReference;
use crate::basic_types::Literal;
use crate::pb2cnf_assert_moderate;

/// How high-LBD learned clauses are ordered before half of them are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LearnedClauseSortingStrategy {
    #[default]
    Activity,
    Lbd,
}

impl std::fmt::Display for LearnedClauseSortingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LearnedClauseSortingStrategy::Activity => write!(f, "activity"),
            LearnedClauseSortingStrategy::Lbd => write!(f, "lbd"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LearningOptions {
    /// Learned clauses with an LBD at most this value are never removed.
    pub lbd_threshold: u32,
    /// Once more high-LBD clauses are stored, the worst half is removed.
    pub max_num_high_lbd_clauses: u64,
    pub high_lbd_sorting_strategy: LearnedClauseSortingStrategy,
    pub max_clause_activity: f32,
    pub clause_activity_decay_factor: f32,
    /// Whether learned clauses are minimised before they are added.
    pub minimise: bool,
}

impl Default for LearningOptions {
    fn default() -> Self {
        LearningOptions {
            lbd_threshold: 5,
            max_num_high_lbd_clauses: 4000,
            high_lbd_sorting_strategy: LearnedClauseSortingStrategy::Activity,
            max_clause_activity: 1e20,
            clause_activity_decay_factor: 0.99,
            minimise: true,
        }
    }
}

#[derive(Default, Debug)]
struct LearnedClauses {
    low_lbd: Vec<ClauseReference>,
    high_lbd: Vec<ClauseReference>,
}

/// Keeps learned clauses in two tiers. Low-LBD clauses are kept forever. High-LBD clauses are
/// halved whenever their number exceeds the limit, keeping the better half according to the
/// sorting strategy. A clause whose LBD improved since the last reduction survives one more round.
#[derive(Debug)]
pub struct LearnedClauseManager {
    learned_clauses: LearnedClauses,
    options: LearningOptions,
    clause_bump_increment: f32,
    num_removed_clauses: u64,
}

impl LearnedClauseManager {
    pub fn new(options: LearningOptions) -> Self {
        LearnedClauseManager {
            learned_clauses: LearnedClauses::default(),
            options,
            clause_bump_increment: 1.0,
            num_removed_clauses: 0,
        }
    }

    pub fn num_learned_clauses(&self) -> usize {
        self.learned_clauses.low_lbd.len() + self.learned_clauses.high_lbd.len()
    }

    pub fn num_removed_clauses(&self) -> u64 {
        self.num_removed_clauses
    }

    /// Stores a clause of at least two literals, with the asserting literal at position 0 and
    /// all other literals false. Returns its reference so the caller can propagate it.
    pub fn add_learned_clause(
        &mut self,
        learned_clause_literals: Vec<Literal>,
        clausal_propagator: &mut ClausalPropagator,
        assignments: &AssignmentsPropositional,
        clause_allocator: &mut ClauseAllocator,
    ) -> ClauseReference {
        // the asserting literal is unassigned after the backjump; it was the only literal of the
        // conflict level
        let lbd = compute_lbd_for_literals(&learned_clause_literals[1..], assignments) + 1;

        let clause_reference = clause_allocator.create_clause(learned_clause_literals, true);
        clausal_propagator
            .start_watching_clause_unchecked(&clause_allocator[clause_reference], clause_reference);

        if lbd < clause_allocator[clause_reference].lbd() {
            clause_allocator[clause_reference].update_lbd(lbd);
        }
        if clause_allocator[clause_reference].lbd() <= self.options.lbd_threshold {
            self.learned_clauses.low_lbd.push(clause_reference);
        } else {
            self.learned_clauses.high_lbd.push(clause_reference);
        }

        clause_reference
    }

    pub fn shrink_learned_clause_database_if_needed(
        &mut self,
        assignments: &AssignmentsPropositional,
        clausal_propagator: &mut ClausalPropagator,
        clause_allocator: &mut ClauseAllocator,
    ) {
        if self.learned_clauses.high_lbd.len() as u64 <= self.options.max_num_high_lbd_clauses {
            return;
        }

        self.promote_high_lbd_clauses(clause_allocator);
        self.remove_high_lbd_clauses(assignments, clausal_propagator, clause_allocator);
    }

    fn promote_high_lbd_clauses(&mut self, clause_allocator: &ClauseAllocator) {
        let lbd_threshold = self.options.lbd_threshold;
        let (promoted, remaining): (Vec<ClauseReference>, Vec<ClauseReference>) = self
            .learned_clauses
            .high_lbd
            .iter()
            .partition(|&&clause_reference| clause_allocator[clause_reference].lbd() <= lbd_threshold);

        self.learned_clauses.low_lbd.extend(promoted);
        self.learned_clauses.high_lbd = remaining;
    }

    fn remove_high_lbd_clauses(
        &mut self,
        assignments: &AssignmentsPropositional,
        clausal_propagator: &mut ClausalPropagator,
        clause_allocator: &mut ClauseAllocator,
    ) {
        self.sort_high_lbd_clauses_by_quality_decreasing_order(clause_allocator);

        let mut num_clauses_to_remove = (self.learned_clauses.high_lbd.len() as u64)
            .saturating_sub(self.options.max_num_high_lbd_clauses / 2);
        let mut num_removed_clauses = 0;

        // Worst clauses are at the back. Fewer than planned may be removed when many clauses are
        // protected or currently the reason of an assignment.
        for &clause_reference in self.learned_clauses.high_lbd.iter().rev() {
            if num_clauses_to_remove == 0 {
                break;
            }

            if clause_allocator[clause_reference].is_protected_against_deletion() {
                clause_allocator[clause_reference].clear_protection_against_deletion();
                continue;
            }

            if is_clause_propagating(clause_reference, assignments, clause_allocator) {
                continue;
            }

            clausal_propagator
                .remove_clause_from_consideration(&clause_allocator[clause_reference], clause_reference);
            clause_allocator.delete_clause(clause_reference);

            num_clauses_to_remove -= 1;
            num_removed_clauses += 1;
        }
        self.num_removed_clauses += num_removed_clauses;

        self.learned_clauses
            .high_lbd
            .retain(|&clause_reference| !clause_allocator[clause_reference].is_deleted());
    }

    fn sort_high_lbd_clauses_by_quality_decreasing_order(
        &mut self,
        clause_allocator: &ClauseAllocator,
    ) {
        let strategy = self.options.high_lbd_sorting_strategy;
        self.learned_clauses
            .high_lbd
            .sort_unstable_by(|&clause_reference1, &clause_reference2| {
                let clause1 = &clause_allocator[clause_reference1];
                let clause2 = &clause_allocator[clause_reference2];

                // higher activity is better, hence the reversed comparison
                let by_activity = clause2.get_activity().total_cmp(&clause1.get_activity());
                match strategy {
                    LearnedClauseSortingStrategy::Activity => by_activity,
                    LearnedClauseSortingStrategy::Lbd => {
                        clause1.lbd().cmp(&clause2.lbd()).then(by_activity)
                    }
                }
            });
    }

    /// Called for every learned clause used during conflict analysis.
    pub fn update_clause_lbd_and_bump_activity(
        &mut self,
        clause_reference: ClauseReference,
        assignments: &AssignmentsPropositional,
        clause_allocator: &mut ClauseAllocator,
    ) {
        let clause = &clause_allocator[clause_reference];
        if clause.is_learned() && clause.lbd() > self.options.lbd_threshold {
            self.bump_clause_activity(clause_reference, clause_allocator);
            self.update_lbd(clause_reference, assignments, clause_allocator);
        }
    }

    fn update_lbd(
        &mut self,
        clause_reference: ClauseReference,
        assignments: &AssignmentsPropositional,
        clause_allocator: &mut ClauseAllocator,
    ) {
        let new_lbd =
            compute_lbd_for_literals(clause_allocator[clause_reference].get_literal_slice(), assignments);
        if new_lbd < clause_allocator[clause_reference].lbd() {
            clause_allocator[clause_reference].update_lbd(new_lbd);
            if new_lbd <= 30 {
                clause_allocator[clause_reference].mark_protection_against_deletion();
            }
        }
    }

    fn bump_clause_activity(
        &mut self,
        clause_reference: ClauseReference,
        clause_allocator: &mut ClauseAllocator,
    ) {
        if clause_allocator[clause_reference].get_activity() + self.clause_bump_increment
            > self.options.max_clause_activity
        {
            self.rescale_clause_activities(clause_allocator);
        }
        clause_allocator[clause_reference].increase_activity(self.clause_bump_increment);
    }

    fn rescale_clause_activities(&mut self, clause_allocator: &mut ClauseAllocator) {
        for &clause_reference in &self.learned_clauses.high_lbd {
            clause_allocator[clause_reference].divide_activity(self.options.max_clause_activity);
        }
        self.clause_bump_increment /= self.options.max_clause_activity;
    }

    pub fn decay_clause_activities(&mut self) {
        self.clause_bump_increment /= self.options.clause_activity_decay_factor;
    }
}

/// The number of distinct non-root decision levels among the literals.
fn compute_lbd_for_literals(
    literals: &[Literal],
    assignments: &AssignmentsPropositional,
) -> u32 {
    pb2cnf_assert_moderate!(
        literals
            .iter()
            .all(|literal| assignments.is_literal_assigned(*literal)),
        "cannot compute the LBD of a clause with unassigned literals"
    );

    let mut levels: Vec<usize> = literals
        .iter()
        .map(|literal| assignments.get_literal_assignment_level(*literal))
        .filter(|level| *level > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();
    levels.len() as u32
}

/// A clause is propagating when it is the reason of the assignment of its first literal; such
/// clauses cannot be removed without breaking conflict analysis.
fn is_clause_propagating(
    clause_reference: ClauseReference,
    assignments: &AssignmentsPropositional,
    clause_allocator: &ClauseAllocator,
) -> bool {
    let propagated_literal = clause_allocator[clause_reference][0];
    assignments.is_literal_assigned_true(propagated_literal)
        && assignments.get_literal_reason(propagated_literal) == clause_reference
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::PropositionalVariable;

    #[test]
    fn learned_clause_lbd_counts_the_unassigned_asserting_literal_once() {
        let mut assignments = AssignmentsPropositional::default();
        let mut clausal_propagator = ClausalPropagator::default();
        let mut clause_allocator = ClauseAllocator::default();
        let mut manager = LearnedClauseManager::new(LearningOptions {
            lbd_threshold: 2,
            ..Default::default()
        });

        for _ in 0..5 {
            assignments.grow();
            clausal_propagator.grow();
        }
        let x: Vec<Literal> = (1..5)
            .map(|index| Literal::new(PropositionalVariable::new(index), true))
            .collect();

        assignments.increase_decision_level();
        assignments.enqueue_decision_literal(x[1]);
        assignments.enqueue_decision_literal(x[2]);
        assignments.increase_decision_level();
        assignments.enqueue_decision_literal(x[3]);

        // x[0] is unassigned, as after the backjump
        let clause_reference = manager.add_learned_clause(
            vec![x[0], !x[1], !x[2], !x[3]],
            &mut clausal_propagator,
            &assignments,
            &mut clause_allocator,
        );

        assert_eq!(3, clause_allocator[clause_reference].lbd());
        assert_eq!(1, manager.num_learned_clauses());
        assert_eq!(1, manager.learned_clauses.high_lbd.len());
    }
}
