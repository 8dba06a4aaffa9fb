use super::ClauseReference;
use crate::basic_types::Literal;
use crate::basic_types::PropositionalVariable;
use crate::basic_types::PropositionalVariableGeneratorIterator;
use crate::basic_types::Solution;
use crate::pb2cnf_assert_moderate;
use crate::pb2cnf_assert_simple;

/// The current partial assignment: per-variable truth value, decision level and reason, and the
/// trail of assigned literals in assignment order.
///
/// Variable 0 is reserved and assigned true at the root by the solver, which makes
/// [`AssignmentsPropositional::true_literal`] available as a constant.
#[derive(Clone, Debug)]
pub struct AssignmentsPropositional {
    assignment_info: Vec<PropositionalAssignmentInfo>,
    trail: Vec<Literal>,
    /// `trail_delimiter[d]` is the trail length when decision level `d + 1` was entered.
    trail_delimiter: Vec<usize>,
    pub true_literal: Literal,
    pub false_literal: Literal,
}

impl Default for AssignmentsPropositional {
    fn default() -> Self {
        let dummy_literal = Literal::new(PropositionalVariable::new(0), true);
        AssignmentsPropositional {
            assignment_info: vec![],
            trail: vec![],
            trail_delimiter: vec![],
            true_literal: dummy_literal,
            false_literal: !dummy_literal,
        }
    }
}

impl AssignmentsPropositional {
    pub fn increase_decision_level(&mut self) {
        self.trail_delimiter.push(self.trail.len());
    }

    pub fn get_decision_level(&self) -> usize {
        self.trail_delimiter.len()
    }

    pub fn is_at_the_root_level(&self) -> bool {
        self.trail_delimiter.is_empty()
    }

    pub fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    pub fn get_trail_entry(&self, index: usize) -> Literal {
        self.trail[index]
    }

    pub fn grow(&mut self) {
        self.assignment_info
            .push(PropositionalAssignmentInfo::Unassigned);
    }

    pub fn num_propositional_variables(&self) -> u32 {
        self.assignment_info.len() as u32
    }

    /// All variables except the reserved variable 0.
    pub fn get_propositional_variables(&self) -> PropositionalVariableGeneratorIterator {
        PropositionalVariableGeneratorIterator::new(1, self.num_propositional_variables())
    }

    pub fn is_variable_assigned_true(&self, variable: PropositionalVariable) -> bool {
        matches!(
            self.assignment_info[variable],
            PropositionalAssignmentInfo::Assigned {
                truth_value: true,
                ..
            }
        )
    }

    pub fn is_variable_assigned_false(&self, variable: PropositionalVariable) -> bool {
        matches!(
            self.assignment_info[variable],
            PropositionalAssignmentInfo::Assigned {
                truth_value: false,
                ..
            }
        )
    }

    pub fn is_literal_assigned_true(&self, literal: Literal) -> bool {
        if literal.is_positive() {
            self.is_variable_assigned_true(literal.get_propositional_variable())
        } else {
            self.is_variable_assigned_false(literal.get_propositional_variable())
        }
    }

    pub fn is_literal_assigned_false(&self, literal: Literal) -> bool {
        self.is_literal_assigned_true(!literal)
    }

    pub fn is_literal_assigned(&self, literal: Literal) -> bool {
        self.is_variable_assigned(literal.get_propositional_variable())
    }

    pub fn is_literal_unassigned(&self, literal: Literal) -> bool {
        !self.is_literal_assigned(literal)
    }

    pub fn is_variable_assigned(&self, variable: PropositionalVariable) -> bool {
        self.assignment_info[variable] != PropositionalAssignmentInfo::Unassigned
    }

    pub fn is_literal_root_assignment(&self, literal: Literal) -> bool {
        self.is_literal_assigned(literal)
            && self.get_literal_assignment_level(literal) == 0
    }

    /// The value of the literal if it is fixed at the root, `None` otherwise.
    pub fn get_literal_root_value(&self, literal: Literal) -> Option<bool> {
        if self.is_literal_root_assignment(literal) {
            Some(self.is_literal_assigned_true(literal))
        } else {
            None
        }
    }

    /// Decisions are the only non-root assignments without a reason clause.
    pub fn is_literal_decision(&self, literal: Literal) -> bool {
        match self.assignment_info[literal.get_propositional_variable()] {
            PropositionalAssignmentInfo::Assigned {
                decision_level,
                reason,
                ..
            } => decision_level > 0 && reason.is_null(),
            PropositionalAssignmentInfo::Unassigned => false,
        }
    }

    pub fn get_variable_assignment_level(&self, variable: PropositionalVariable) -> usize {
        match self.assignment_info[variable] {
            PropositionalAssignmentInfo::Assigned { decision_level, .. } => decision_level,
            PropositionalAssignmentInfo::Unassigned => {
                panic!("unassigned variable {variable} has no assignment level")
            }
        }
    }

    pub fn get_literal_assignment_level(&self, literal: Literal) -> usize {
        self.get_variable_assignment_level(literal.get_propositional_variable())
    }

    pub fn get_variable_reason(&self, variable: PropositionalVariable) -> ClauseReference {
        match self.assignment_info[variable] {
            PropositionalAssignmentInfo::Assigned { reason, .. } => reason,
            PropositionalAssignmentInfo::Unassigned => {
                panic!("unassigned variable {variable} has no reason")
            }
        }
    }

    pub fn get_literal_reason(&self, literal: Literal) -> ClauseReference {
        self.get_variable_reason(literal.get_propositional_variable())
    }

    fn make_assignment(&mut self, true_literal: Literal, reason: ClauseReference) {
        pb2cnf_assert_simple!(
            self.is_literal_unassigned(true_literal),
            "cannot assign {true_literal} twice"
        );

        self.assignment_info[true_literal.get_propositional_variable()] =
            PropositionalAssignmentInfo::Assigned {
                truth_value: true_literal.is_positive(),
                decision_level: self.get_decision_level(),
                reason,
            };
        self.trail.push(true_literal);
    }

    pub fn enqueue_decision_literal(&mut self, decision_literal: Literal) {
        self.make_assignment(decision_literal, ClauseReference::NULL);
    }

    /// Root-level facts such as unit clauses have no reason clause.
    pub fn enqueue_root_literal(&mut self, literal: Literal) {
        pb2cnf_assert_simple!(self.is_at_the_root_level());
        self.make_assignment(literal, ClauseReference::NULL);
    }

    pub fn enqueue_propagated_literal(&mut self, propagated_literal: Literal, reason: ClauseReference) {
        pb2cnf_assert_moderate!(!reason.is_null());
        self.make_assignment(propagated_literal, reason);
    }

    /// Undoes every assignment above `new_decision_level` and returns the removed literals, most
    /// recent first.
    pub fn synchronise(&mut self, new_decision_level: usize) -> Vec<Literal> {
        pb2cnf_assert_simple!(new_decision_level < self.get_decision_level());

        let new_trail_length = self.trail_delimiter[new_decision_level];
        self.trail_delimiter.truncate(new_decision_level);

        let removed: Vec<Literal> = self.trail.drain(new_trail_length..).rev().collect();
        for literal in &removed {
            self.assignment_info[literal.get_propositional_variable()] =
                PropositionalAssignmentInfo::Unassigned;
        }
        removed
    }

    /// A [`Solution`] from a complete assignment.
    pub fn create_solution(&self) -> Solution {
        Solution::new(
            (0..self.num_propositional_variables())
                .map(|index| self.is_variable_assigned_true(PropositionalVariable::new(index)))
                .collect(),
        )
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
enum PropositionalAssignmentInfo {
    Assigned {
        truth_value: bool,
        decision_level: usize,
        reason: ClauseReference,
    },
    #[default]
    Unassigned,
}
