use super::AssignmentsPropositional;
use super::ClauseAllocator;
use crate::basic_types::HashMap;
use crate::basic_types::HashSet;
use crate::basic_types::Literal;
use crate::pb2cnf_assert_moderate;
use crate::pb2cnf_assert_simple;

const MAX_RECURSION_DEPTH: usize = 500;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
enum Label {
    /// Part of the learned clause, not yet analysed.
    Seen,
    Poison,
    Removable,
    Keep,
}

/// Removes literals from a learned clause that are implied by the other literals of the clause in
/// the implication graph (recursive minimisation, Sörensson and Biere, SAT'09; labels after Van
/// Gelder, SAT'09).
#[derive(Default, Debug)]
pub struct LearnedClauseMinimiser {
    current_depth: usize,
    allowed_decision_levels: HashSet<usize>,
    label_assignments: HashMap<Literal, Label>,
    num_minimisation_calls: u64,
    num_literals_removed_total: u64,
    num_literals_seen_total: u64,
}

impl LearnedClauseMinimiser {
    /// `learned_literals[0]` is the asserting literal and is always kept. Afterwards the literal
    /// at position 1 is one with the highest decision level among the rest.
    pub fn remove_dominated_literals(
        &mut self,
        learned_literals: &mut Vec<Literal>,
        assignments: &AssignmentsPropositional,
        clause_allocator: &ClauseAllocator,
    ) {
        self.num_minimisation_calls += 1;
        self.num_literals_seen_total += learned_literals.len() as u64;
        let num_literals_before_minimisation = learned_literals.len();

        self.initialise(learned_literals, assignments);

        let mut end_position: usize = 1;
        for i in 1..learned_literals.len() {
            let learned_literal = learned_literals[i];

            self.compute_label(!learned_literal, assignments, clause_allocator);

            let label = self.get_literal_label(!learned_literal);
            if label == Label::Poison || label == Label::Keep {
                learned_literals[end_position] = learned_literal;
                end_position += 1;

                if assignments.get_literal_assignment_level(learned_literals[1])
                    < assignments.get_literal_assignment_level(learned_literal)
                {
                    learned_literals.swap(1, end_position - 1);
                }
            }
        }
        learned_literals.truncate(end_position);

        self.clean_up();

        self.num_literals_removed_total +=
            (num_literals_before_minimisation - learned_literals.len()) as u64;
    }

    fn compute_label(
        &mut self,
        input_literal: Literal,
        assignments: &AssignmentsPropositional,
        clause_allocator: &ClauseAllocator,
    ) {
        pb2cnf_assert_moderate!(assignments.is_literal_assigned_true(input_literal));

        if self.is_literal_label_already_computed(input_literal) {
            return;
        }

        self.current_depth += 1;
        let label = self.determine_label(input_literal, assignments, clause_allocator);
        self.assign_literal_label(input_literal, label);
        self.current_depth -= 1;
    }

    fn determine_label(
        &mut self,
        input_literal: Literal,
        assignments: &AssignmentsPropositional,
        clause_allocator: &ClauseAllocator,
    ) -> Label {
        if self.current_depth >= MAX_RECURSION_DEPTH {
            return Label::Poison;
        }

        // Decisions of the original clause were labelled Keep during initialisation, so any
        // decision reached here is outside the clause.
        if assignments.is_literal_decision(input_literal) {
            return Label::Poison;
        }

        if !self
            .allowed_decision_levels
            .contains(&assignments.get_literal_assignment_level(input_literal))
        {
            return Label::Poison;
        }

        let reason = assignments.get_literal_reason(input_literal);
        let reason_clause = &clause_allocator[reason];
        pb2cnf_assert_moderate!(reason_clause[0] == input_literal);

        for i in 1..reason_clause.len() {
            let antecedent_literal = !reason_clause[i];

            if assignments.is_literal_root_assignment(antecedent_literal) {
                continue;
            }

            self.compute_label(antecedent_literal, assignments, clause_allocator);

            if self.get_literal_label(antecedent_literal) == Label::Poison {
                return if self.is_literal_assigned_seen(input_literal) {
                    Label::Keep
                } else {
                    Label::Poison
                };
            }
        }

        Label::Removable
    }

    fn is_literal_assigned_seen(&self, literal: Literal) -> bool {
        self.label_assignments.get(&literal) == Some(&Label::Seen)
    }

    fn get_literal_label(&self, literal: Literal) -> Label {
        self.label_assignments
            .get(&literal)
            .copied()
            .unwrap_or(Label::Poison)
    }

    fn assign_literal_label(&mut self, literal: Literal, label: Label) {
        pb2cnf_assert_moderate!(
            !self.label_assignments.contains_key(&literal) || self.is_literal_assigned_seen(literal),
            "cannot relabel literal {literal}"
        );
        let _ = self.label_assignments.insert(literal, label);
    }

    fn is_literal_label_already_computed(&self, literal: Literal) -> bool {
        self.label_assignments
            .get(&literal)
            .is_some_and(|label| *label != Label::Seen)
    }

    fn initialise(&mut self, learned_literals: &[Literal], assignments: &AssignmentsPropositional) {
        pb2cnf_assert_simple!(self.current_depth == 0);

        let _ = self
            .label_assignments
            .insert(!learned_literals[0], Label::Keep);

        for learned_literal in &learned_literals[1..] {
            let literal = !*learned_literal;
            if assignments.is_literal_decision(literal) {
                self.assign_literal_label(literal, Label::Keep);
            } else {
                self.assign_literal_label(literal, Label::Seen);
            }

            let _ = self
                .allowed_decision_levels
                .insert(assignments.get_literal_assignment_level(literal));
        }
    }

    fn clean_up(&mut self) {
        pb2cnf_assert_simple!(self.current_depth == 0);

        self.allowed_decision_levels.clear();
        self.label_assignments.clear();
    }

    pub fn num_minimisation_calls(&self) -> u64 {
        self.num_minimisation_calls
    }

    pub fn num_literals_removed_total(&self) -> u64 {
        self.num_literals_removed_total
    }

    /// The fraction of literals that survived minimisation, over all calls.
    pub fn fraction_of_literals_kept(&self) -> f64 {
        if self.num_literals_seen_total > 0 {
            1.0 - (self.num_literals_removed_total as f64 / self.num_literals_seen_total as f64)
        } else {
            1.0
        }
    }
}
