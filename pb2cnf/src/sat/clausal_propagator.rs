use super::AssignmentsPropositional;
use super::Clause;
use super::ClauseAllocator;
use super::ClauseReference;
use crate::basic_types::HashMap;
use crate::basic_types::Literal;
use crate::pb2cnf_assert_moderate;
use crate::pb2cnf_assert_simple;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationStatusClausal {
    NoConflictDetected,
    ConflictDetected { conflict_clause: ClauseReference },
}

impl PropagationStatusClausal {
    pub fn no_conflict(&self) -> bool {
        matches!(self, PropagationStatusClausal::NoConflictDetected)
    }
}

#[derive(Clone, Copy, Debug)]
struct ClauseWatcher {
    /// Some other literal of the clause; when it is true the clause need not be visited.
    cached_literal: Literal,
    clause_reference: ClauseReference,
}

/// Unit propagation with two watched literals per clause.
///
/// The watched literals of a clause are always at positions 0 and 1. When a clause propagates,
/// the propagated literal is at position 0, which conflict analysis relies on.
#[derive(Default, Debug)]
pub struct ClausalPropagator {
    watch_lists: Vec<Vec<ClauseWatcher>>,
    next_position_on_trail_to_propagate: usize,
}

impl ClausalPropagator {
    /// Adds the watch lists for both literals of a new variable.
    pub fn grow(&mut self) {
        self.watch_lists.push(vec![]);
        self.watch_lists.push(vec![]);
    }

    pub fn start_watching_clause_unchecked(
        &mut self,
        clause: &Clause,
        clause_reference: ClauseReference,
    ) {
        pb2cnf_assert_simple!(clause.len() >= 2);

        self.watch_lists[clause[0]].push(ClauseWatcher {
            cached_literal: clause[1],
            clause_reference,
        });
        self.watch_lists[clause[1]].push(ClauseWatcher {
            cached_literal: clause[0],
            clause_reference,
        });
    }

    /// Propagates every trail entry that has not been processed yet.
    ///
    /// Kept as one loop on purpose: it is the hot path of the solver.
    pub fn propagate(
        &mut self,
        assignments: &mut AssignmentsPropositional,
        clause_allocator: &mut ClauseAllocator,
    ) -> PropagationStatusClausal {
        while self.next_position_on_trail_to_propagate < assignments.num_trail_entries() {
            let true_literal =
                assignments.get_trail_entry(self.next_position_on_trail_to_propagate);
            let false_literal = !true_literal;
            pb2cnf_assert_moderate!(assignments.is_literal_assigned_true(true_literal));

            // Watchers are compacted in place: those that stay are copied to `end_index`.
            let mut end_index: usize = 0;
            let mut current_index: usize = 0;
            while current_index < self.watch_lists[false_literal].len() {
                let watcher = self.watch_lists[false_literal][current_index];
                if assignments.is_literal_assigned_true(watcher.cached_literal) {
                    self.watch_lists[false_literal][end_index] = watcher;
                    current_index += 1;
                    end_index += 1;
                    continue;
                }

                let clause_reference = watcher.clause_reference;
                let watched_clause = clause_allocator.get_mutable_clause(clause_reference);

                if watched_clause[0] == false_literal {
                    watched_clause[0] = watched_clause[1];
                    watched_clause[1] = false_literal;
                }

                if assignments.is_literal_assigned_true(watched_clause[0]) {
                    self.watch_lists[false_literal][end_index] = ClauseWatcher {
                        cached_literal: watched_clause[0],
                        clause_reference,
                    };
                    current_index += 1;
                    end_index += 1;
                    continue;
                }

                let replacement = (2..watched_clause.len())
                    .find(|&i| !assignments.is_literal_assigned_false(watched_clause[i]));
                if let Some(i) = replacement {
                    watched_clause[1] = watched_clause[i];
                    watched_clause[i] = false_literal;

                    let new_watched_literal = watched_clause[1];
                    let cached_literal = watched_clause[0];
                    self.watch_lists[new_watched_literal].push(ClauseWatcher {
                        cached_literal,
                        clause_reference,
                    });
                    // not copied to end_index: the watcher moved to another list
                    current_index += 1;
                    continue;
                }

                self.watch_lists[false_literal][end_index] = watcher;
                end_index += 1;
                current_index += 1;

                // All literals except position 0 are false.
                let unit_literal = watched_clause[0];
                if assignments.is_literal_unassigned(unit_literal) {
                    assignments.enqueue_propagated_literal(unit_literal, clause_reference);
                } else {
                    while current_index < self.watch_lists[false_literal].len() {
                        self.watch_lists[false_literal][end_index] =
                            self.watch_lists[false_literal][current_index];
                        current_index += 1;
                        end_index += 1;
                    }
                    self.watch_lists[false_literal].truncate(end_index);
                    return PropagationStatusClausal::ConflictDetected {
                        conflict_clause: clause_reference,
                    };
                }
            }
            self.watch_lists[false_literal].truncate(end_index);
            self.next_position_on_trail_to_propagate += 1;
        }
        PropagationStatusClausal::NoConflictDetected
    }

    pub fn synchronise(&mut self, trail_size: usize) {
        pb2cnf_assert_simple!(self.next_position_on_trail_to_propagate >= trail_size);
        self.next_position_on_trail_to_propagate = trail_size;
    }

    pub fn is_propagation_complete(&self, trail_size: usize) -> bool {
        self.next_position_on_trail_to_propagate == trail_size
    }

    pub fn remove_clause_from_consideration(
        &mut self,
        clause: &Clause,
        clause_reference: ClauseReference,
    ) {
        for watched_literal in [clause[0], clause[1]] {
            let watchers = &mut self.watch_lists[watched_literal];
            if let Some(index) = watchers
                .iter()
                .position(|watcher| watcher.clause_reference == clause_reference)
            {
                let _ = watchers.swap_remove(index);
            }
        }
    }

    /// Checks the watch invariants; only used inside assertions.
    pub fn debug_check_state(
        &self,
        assignments: &AssignmentsPropositional,
        clause_allocator: &ClauseAllocator,
    ) -> bool {
        assert_eq!(
            self.watch_lists.len(),
            2 * assignments.num_propositional_variables() as usize,
            "one watch list per literal expected"
        );

        let mut occurrences: HashMap<ClauseReference, usize> = HashMap::default();
        for watcher in self.watch_lists.iter().flatten() {
            *occurrences.entry(watcher.clause_reference).or_insert(0) += 1;
        }
        assert!(
            occurrences.values().all(|count| *count == 2),
            "every watched clause must be in exactly two watch lists"
        );

        for (literal_code, watchers) in self.watch_lists.iter().enumerate() {
            let literal = Literal::u32_to_literal(literal_code as u32);
            for watcher in watchers {
                let clause = clause_allocator.get_clause(watcher.clause_reference);
                assert!(
                    clause[0] == literal || clause[1] == literal,
                    "clause {} is in the watch list of {literal} without watching it",
                    watcher.clause_reference
                );
                assert!(
                    clause.get_literal_slice().contains(&watcher.cached_literal),
                    "cached literal does not belong to the clause"
                );
            }
        }

        if self.is_propagation_complete(assignments.num_trail_entries()) {
            for clause_reference in occurrences.keys() {
                let clause = clause_allocator.get_clause(*clause_reference);
                let num_falsified = clause
                    .get_literal_slice()
                    .iter()
                    .filter(|literal| assignments.is_literal_assigned_false(**literal))
                    .count();
                assert!(num_falsified < clause.len(), "missed a falsified clause");
                if num_falsified + 1 == clause.len() {
                    assert!(
                        clause
                            .get_literal_slice()
                            .iter()
                            .any(|literal| assignments.is_literal_assigned_true(*literal)),
                        "missed a propagation"
                    );
                }
            }
        }
        true
    }
}
