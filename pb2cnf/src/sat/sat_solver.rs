use std::time::Duration;

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::AssignmentsPropositional;
use super::ClausalPropagator;
use super::ClauseAllocator;
use super::ClauseReference;
use super::LearnedClauseManager;
use super::LearnedClauseMinimiser;
use super::LearningOptions;
use super::PropagationStatusClausal;
use super::PropositionalValueSelector;
use super::PropositionalVariableSelector;
use super::RestartOptions;
use super::RestartStrategy;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Literal;
use crate::basic_types::PropositionalVariable;
use crate::basic_types::Solution;
use crate::basic_types::Stopwatch;
use crate::pb2cnf_assert_extreme;
use crate::pb2cnf_assert_moderate;
use crate::pb2cnf_assert_simple;
use crate::statistics::log_statistic;
use crate::termination::TerminationCondition;

#[derive(Debug, Clone, Copy)]
pub struct SatSolverOptions {
    pub restart_options: RestartOptions,
    pub learning_options: LearningOptions,
    /// Seeds the random initial variable activities.
    pub random_seed: u64,
}

impl Default for SatSolverOptions {
    fn default() -> Self {
        SatSolverOptions {
            restart_options: RestartOptions::default(),
            learning_options: LearningOptions::default(),
            random_seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatisfactionResult {
    Satisfiable(Solution),
    Unsatisfiable,
    /// The termination condition triggered before a conclusion was reached.
    Unknown,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct Counters {
    pub num_decisions: u64,
    pub num_conflicts: u64,
    pub num_propagations: u64,
    pub num_restarts: u64,
    pub num_unit_clauses_learned: u64,
    pub num_learned_clauses: u64,
    pub sum_of_learned_clause_lengths: u64,
    pub num_solve_calls: u64,
    pub time_spent_in_solver: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverState {
    Ready,
    /// The clauses have no model, at the root.
    Infeasible,
}

/// A CDCL SAT solver that can be used incrementally: clauses may be added between calls to
/// [`SatSolver::solve`], which always returns with the solver back at the root.
///
/// Variable 0 is reserved and fixed to true at construction, see
/// [`SatSolver::get_true_literal`].
#[derive(Debug)]
pub struct SatSolver {
    assignments: AssignmentsPropositional,
    clausal_propagator: ClausalPropagator,
    clause_allocator: ClauseAllocator,
    permanent_clauses: Vec<ClauseReference>,
    learned_clause_manager: LearnedClauseManager,
    learned_clause_minimiser: LearnedClauseMinimiser,
    variable_selector: PropositionalVariableSelector,
    value_selector: PropositionalValueSelector,
    restart_strategy: RestartStrategy,
    options: SatSolverOptions,
    rng: SmallRng,
    /// Scratch space for conflict analysis, indexed by variable.
    seen: Vec<bool>,
    state: SolverState,
    num_root_unit_clauses: usize,
    counters: Counters,
}

impl Default for SatSolver {
    fn default() -> Self {
        SatSolver::new(SatSolverOptions::default())
    }
}

struct ConflictAnalysisResult {
    learned_literals: Vec<Literal>,
    backjump_level: usize,
}

impl SatSolver {
    pub fn new(options: SatSolverOptions) -> SatSolver {
        let mut solver = SatSolver {
            assignments: AssignmentsPropositional::default(),
            clausal_propagator: ClausalPropagator::default(),
            clause_allocator: ClauseAllocator::default(),
            permanent_clauses: vec![],
            learned_clause_manager: LearnedClauseManager::new(options.learning_options),
            learned_clause_minimiser: LearnedClauseMinimiser::default(),
            variable_selector: PropositionalVariableSelector::default(),
            value_selector: PropositionalValueSelector::default(),
            restart_strategy: RestartStrategy::new(options.restart_options),
            options,
            rng: SmallRng::seed_from_u64(options.random_seed),
            seen: vec![],
            state: SolverState::Ready,
            num_root_unit_clauses: 0,
            counters: Counters::default(),
        };

        let true_variable = solver.create_new_propositional_variable();
        pb2cnf_assert_simple!(true_variable.index() == 0);
        solver.variable_selector.remove(true_variable);
        let true_literal = solver.assignments.true_literal;
        solver.assignments.enqueue_root_literal(true_literal);

        solver
    }

    pub fn get_true_literal(&self) -> Literal {
        self.assignments.true_literal
    }

    pub fn get_false_literal(&self) -> Literal {
        self.assignments.false_literal
    }

    pub fn create_new_propositional_variable(&mut self) -> PropositionalVariable {
        let variable = PropositionalVariable::new(self.assignments.num_propositional_variables());

        self.assignments.grow();
        self.clausal_propagator.grow();
        self.variable_selector.grow(&mut self.rng);
        self.value_selector.grow();
        self.seen.push(false);

        variable
    }

    /// Ensures that the variables `1..=num_variables` exist, e.g. before loading a DIMACS file.
    pub fn ensure_num_variables(&mut self, num_variables: u32) {
        while self.assignments.num_propositional_variables() <= num_variables {
            let _ = self.create_new_propositional_variable();
        }
    }

    /// Including the reserved variable 0.
    pub fn num_propositional_variables(&self) -> u32 {
        self.assignments.num_propositional_variables()
    }

    /// Clauses stored by the solver, excluding learned clauses. Unit clauses are counted although
    /// they are stored as root assignments.
    pub fn num_clauses(&self) -> usize {
        self.permanent_clauses.len() + self.num_root_unit_clauses
    }

    pub(crate) fn assignments(&self) -> &AssignmentsPropositional {
        &self.assignments
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn is_infeasible(&self) -> bool {
        self.state == SolverState::Infeasible
    }

    /// The value of the literal if it is fixed at the root, `None` otherwise.
    pub fn get_literal_value_at_root(&self, literal: Literal) -> Option<bool> {
        self.assignments.get_literal_root_value(literal)
    }

    /// Fixes the preferred value of a variable for decisions, e.g. to steer the search towards
    /// solutions with a low objective value.
    pub fn set_preferred_value(&mut self, variable: PropositionalVariable, value: bool) {
        self.value_selector.update_and_freeze(variable, value);
    }

    /// Adds a clause at the root.
    ///
    /// Literals false at the root are dropped and a clause satisfied at the root is ignored. Unit
    /// clauses become root assignments and are propagated immediately. An error means that the
    /// clauses have no model; the solver stays infeasible from then on.
    pub fn add_clause(&mut self, literals: Vec<Literal>) -> Result<(), ConstraintOperationError> {
        pb2cnf_assert_simple!(self.assignments.is_at_the_root_level());

        if self.is_infeasible() {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        let literals = preprocess_clause(literals, &self.assignments);

        if literals.is_empty() {
            self.state = SolverState::Infeasible;
            return Err(ConstraintOperationError::InfeasibleClause);
        }

        if literals.len() == 1 {
            if literals[0] != self.assignments.true_literal {
                self.num_root_unit_clauses += 1;
                self.assignments.enqueue_root_literal(literals[0]);
                if !self.propagate().no_conflict() {
                    self.state = SolverState::Infeasible;
                    return Err(ConstraintOperationError::InfeasibleClause);
                }
            }
            return Ok(());
        }

        let clause_reference = self.clause_allocator.create_clause(literals, false);
        self.clausal_propagator.start_watching_clause_unchecked(
            &self.clause_allocator[clause_reference],
            clause_reference,
        );
        self.permanent_clauses.push(clause_reference);

        Ok(())
    }

    pub fn solve(&mut self, termination: &mut impl TerminationCondition) -> SatisfactionResult {
        self.counters.num_solve_calls += 1;

        if self.is_infeasible() {
            return SatisfactionResult::Unsatisfiable;
        }

        let stopwatch = Stopwatch::starting_now();
        let result = self.solve_internal(termination);
        self.counters.time_spent_in_solver += stopwatch.elapsed();

        if !self.assignments.is_at_the_root_level() {
            self.backtrack(0);
        }

        if result == SatisfactionResult::Unsatisfiable {
            self.state = SolverState::Infeasible;
        }
        result
    }

    fn solve_internal(&mut self, termination: &mut impl TerminationCondition) -> SatisfactionResult {
        loop {
            if termination.should_stop() {
                return SatisfactionResult::Unknown;
            }

            match self.propagate() {
                PropagationStatusClausal::ConflictDetected { conflict_clause } => {
                    if self.assignments.is_at_the_root_level() {
                        return SatisfactionResult::Unsatisfiable;
                    }

                    self.counters.num_conflicts += 1;
                    let analysis_result = self.analyse_conflict(conflict_clause);
                    self.process_conflict_analysis_result(analysis_result);

                    self.variable_selector.decay_activities();
                    self.learned_clause_manager.decay_clause_activities();
                    self.restart_strategy.notify_conflict();

                    self.learned_clause_manager
                        .shrink_learned_clause_database_if_needed(
                            &self.assignments,
                            &mut self.clausal_propagator,
                            &mut self.clause_allocator,
                        );
                }
                PropagationStatusClausal::NoConflictDetected => {
                    if self.restart_strategy.should_restart() {
                        self.restart();
                        continue;
                    }

                    match self.variable_selector.peek_next_variable(&self.assignments) {
                        Some(variable) => {
                            let value = self.value_selector.select_value(variable);
                            self.counters.num_decisions += 1;
                            termination.decision_has_been_made();

                            self.assignments.increase_decision_level();
                            self.assignments
                                .enqueue_decision_literal(Literal::new(variable, value));
                        }
                        None => {
                            pb2cnf_assert_extreme!(self.debug_check_model());
                            return SatisfactionResult::Satisfiable(
                                self.assignments.create_solution(),
                            );
                        }
                    }
                }
            }
        }
    }

    fn propagate(&mut self) -> PropagationStatusClausal {
        let trail_length_before = self.assignments.num_trail_entries();
        let status = self
            .clausal_propagator
            .propagate(&mut self.assignments, &mut self.clause_allocator);
        self.counters.num_propagations +=
            (self.assignments.num_trail_entries() - trail_length_before) as u64;
        status
    }

    fn restart(&mut self) {
        if !self.assignments.is_at_the_root_level() {
            self.backtrack(0);
        }
        self.restart_strategy.notify_restart();
        self.counters.num_restarts += 1;
    }

    fn backtrack(&mut self, backtrack_level: usize) {
        pb2cnf_assert_simple!(backtrack_level < self.assignments.get_decision_level());

        for literal in self.assignments.synchronise(backtrack_level) {
            let variable = literal.get_propositional_variable();
            self.variable_selector.restore(variable);
            self.value_selector
                .update_if_not_frozen(variable, literal.is_positive());
        }

        self.clausal_propagator
            .synchronise(self.assignments.num_trail_entries());
    }

    /// First-UIP conflict analysis. The learned clause has the asserting literal at position 0
    /// and, if it has more literals, one with the highest remaining level at position 1.
    fn analyse_conflict(&mut self, conflict_clause: ClauseReference) -> ConflictAnalysisResult {
        pb2cnf_assert_moderate!(self.seen.iter().all(|seen| !seen));

        let current_level = self.assignments.get_decision_level();
        let mut learned_literals = vec![self.assignments.true_literal];
        let mut num_current_level_literals_to_resolve = 0;
        let mut next_trail_index = self.assignments.num_trail_entries();
        let mut clause_reference = conflict_clause;
        let mut is_conflict_clause = true;

        loop {
            self.learned_clause_manager.update_clause_lbd_and_bump_activity(
                clause_reference,
                &self.assignments,
                &mut self.clause_allocator,
            );

            // Position 0 of a reason clause is the literal it propagated, which is already seen.
            let start = if is_conflict_clause { 0 } else { 1 };
            let clause = &self.clause_allocator[clause_reference];
            for &literal in &clause.get_literal_slice()[start..] {
                let variable = literal.get_propositional_variable();
                let level = self.assignments.get_literal_assignment_level(literal);
                if self.seen[variable] || level == 0 {
                    continue;
                }

                self.seen[variable] = true;
                self.variable_selector.bump_activity(variable);
                if level == current_level {
                    num_current_level_literals_to_resolve += 1;
                } else {
                    learned_literals.push(literal);
                }
            }

            let next_literal = loop {
                next_trail_index -= 1;
                let trail_literal = self.assignments.get_trail_entry(next_trail_index);
                if self.seen[trail_literal.get_propositional_variable()] {
                    break trail_literal;
                }
            };
            self.seen[next_literal.get_propositional_variable()] = false;
            num_current_level_literals_to_resolve -= 1;

            if num_current_level_literals_to_resolve == 0 {
                learned_literals[0] = !next_literal;
                break;
            }

            clause_reference = self.assignments.get_literal_reason(next_literal);
            is_conflict_clause = false;
        }

        for literal in &learned_literals[1..] {
            self.seen[literal.get_propositional_variable()] = false;
        }

        if self.options.learning_options.minimise {
            self.learned_clause_minimiser.remove_dominated_literals(
                &mut learned_literals,
                &self.assignments,
                &self.clause_allocator,
            );
        } else if learned_literals.len() > 2 {
            let highest_position = (1..learned_literals.len())
                .max_by_key(|&i| {
                    self.assignments
                        .get_literal_assignment_level(learned_literals[i])
                })
                .unwrap_or(1);
            learned_literals.swap(1, highest_position);
        }

        let backjump_level = if learned_literals.len() > 1 {
            self.assignments
                .get_literal_assignment_level(learned_literals[1])
        } else {
            0
        };

        ConflictAnalysisResult {
            learned_literals,
            backjump_level,
        }
    }

    fn process_conflict_analysis_result(&mut self, analysis_result: ConflictAnalysisResult) {
        let ConflictAnalysisResult {
            learned_literals,
            backjump_level,
        } = analysis_result;

        self.backtrack(backjump_level);

        self.counters.num_learned_clauses += 1;
        self.counters.sum_of_learned_clause_lengths += learned_literals.len() as u64;

        if learned_literals.len() == 1 {
            self.counters.num_unit_clauses_learned += 1;
            self.assignments.enqueue_root_literal(learned_literals[0]);
            return;
        }

        let asserting_literal = learned_literals[0];
        let clause_reference = self.learned_clause_manager.add_learned_clause(
            learned_literals,
            &mut self.clausal_propagator,
            &self.assignments,
            &mut self.clause_allocator,
        );
        self.assignments
            .enqueue_propagated_literal(asserting_literal, clause_reference);
    }

    fn debug_check_model(&self) -> bool {
        for clause_reference in &self.permanent_clauses {
            let clause = &self.clause_allocator[*clause_reference];
            assert!(
                clause
                    .get_literal_slice()
                    .iter()
                    .any(|literal| self.assignments.is_literal_assigned_true(*literal)),
                "clause {clause} is not satisfied by the model"
            );
        }
        true
    }

    pub fn log_statistics(&self) {
        let counters = &self.counters;
        log_statistic("numberOfDecisions", counters.num_decisions);
        log_statistic("numberOfConflicts", counters.num_conflicts);
        log_statistic("numberOfPropagations", counters.num_propagations);
        log_statistic("numberOfRestarts", counters.num_restarts);
        log_statistic("numberOfLearnedClauses", counters.num_learned_clauses);
        log_statistic("numberOfLearnedUnitClauses", counters.num_unit_clauses_learned);
        log_statistic(
            "averageLearnedClauseLength",
            if counters.num_learned_clauses > 0 {
                counters.sum_of_learned_clause_lengths as f64 / counters.num_learned_clauses as f64
            } else {
                0.0
            },
        );
        log_statistic(
            "numberOfRemovedLearnedClauses",
            self.learned_clause_manager.num_removed_clauses(),
        );
        log_statistic(
            "numberOfLiteralsRemovedByMinimisation",
            self.learned_clause_minimiser.num_literals_removed_total(),
        );
        log_statistic(
            "fractionOfLiteralsKeptByMinimisation",
            self.learned_clause_minimiser.fraction_of_literals_kept(),
        );
        log_statistic("numberOfVariables", self.num_propositional_variables());
        log_statistic("numberOfClauses", self.num_clauses());
        log_statistic("numberOfSolveCalls", counters.num_solve_calls);
        log_statistic(
            "timeSpentInSolverInMilliseconds",
            counters.time_spent_in_solver.as_millis(),
        );
    }

    pub(crate) fn log_debug_summary(&self) {
        debug!(
            "solver has {} variables, {} clauses and {} learned clauses",
            self.num_propositional_variables(),
            self.num_clauses(),
            self.learned_clause_manager.num_learned_clauses()
        );
    }
}

/// Simplifies a clause against the root assignment:
/// * literals false at the root and duplicates are removed;
/// * a clause with a literal true at the root, or with both polarities of a variable, becomes the
///   unit clause of the true literal;
/// * a clause falsified at the root becomes empty.
pub(crate) fn preprocess_clause(
    mut literals: Vec<Literal>,
    assignments: &AssignmentsPropositional,
) -> Vec<Literal> {
    if literals
        .iter()
        .any(|literal| assignments.is_literal_assigned_true(*literal))
    {
        return vec![assignments.true_literal];
    }

    literals.retain(|literal| assignments.is_literal_unassigned(*literal));
    literals.sort_unstable();
    literals.dedup();

    let is_tautology = literals
        .windows(2)
        .any(|pair| pair[0].get_propositional_variable() == pair[1].get_propositional_variable());
    if is_tautology {
        return vec![assignments.true_literal];
    }

    literals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::termination::Indefinite;

    fn solver_with_variables(num_variables: u32) -> (SatSolver, Vec<Literal>) {
        let mut solver = SatSolver::default();
        let literals = (0..num_variables)
            .map(|_| Literal::new(solver.create_new_propositional_variable(), true))
            .collect();
        (solver, literals)
    }

    #[test]
    fn true_literal_is_fixed_at_the_root() {
        let solver = SatSolver::default();
        assert_eq!(
            Some(true),
            solver.get_literal_value_at_root(solver.get_true_literal())
        );
        assert_eq!(
            Some(false),
            solver.get_literal_value_at_root(solver.get_false_literal())
        );
    }

    #[test]
    fn unit_clauses_propagate_at_the_root() {
        let (mut solver, x) = solver_with_variables(3);
        solver.add_clause(vec![!x[0], x[1]]).unwrap();
        solver.add_clause(vec![!x[1], x[2]]).unwrap();
        solver.add_clause(vec![x[0]]).unwrap();

        assert_eq!(Some(true), solver.get_literal_value_at_root(x[2]));
        assert_eq!(3, solver.num_clauses());
    }

    #[test]
    fn root_conflict_is_reported_as_error() {
        let (mut solver, x) = solver_with_variables(2);
        solver.add_clause(vec![!x[0], x[1]]).unwrap();
        solver.add_clause(vec![!x[1]]).unwrap();

        assert_eq!(
            Err(ConstraintOperationError::InfeasibleClause),
            solver.add_clause(vec![x[0]])
        );
        assert_eq!(
            Err(ConstraintOperationError::InfeasibleState),
            solver.add_clause(vec![x[1], x[0]])
        );
        assert_eq!(
            SatisfactionResult::Unsatisfiable,
            solver.solve(&mut Indefinite)
        );
    }

    #[test]
    fn tautologies_and_satisfied_clauses_are_not_stored() {
        let (mut solver, x) = solver_with_variables(2);
        solver.add_clause(vec![x[0], !x[0], x[1]]).unwrap();
        solver.add_clause(vec![x[1], solver.get_true_literal()]).unwrap();

        assert_eq!(0, solver.num_clauses());
    }

    #[test]
    fn finds_a_model_of_a_satisfiable_formula() {
        let (mut solver, x) = solver_with_variables(4);
        let clauses = vec![
            vec![x[0], x[1]],
            vec![!x[0], x[2]],
            vec![!x[1], x[3]],
            vec![!x[2], !x[3]],
            vec![x[2], x[3]],
        ];
        for clause in &clauses {
            solver.add_clause(clause.clone()).unwrap();
        }

        match solver.solve(&mut Indefinite) {
            SatisfactionResult::Satisfiable(solution) => {
                for clause in &clauses {
                    assert!(clause
                        .iter()
                        .any(|literal| solution.get_literal_value(*literal)));
                }
            }
            other => panic!("expected a model, got {other:?}"),
        }
    }

    /// The pigeonhole principle with `n + 1` pigeons and `n` holes.
    fn add_pigeonhole_clauses(solver: &mut SatSolver, num_holes: usize) {
        let num_pigeons = num_holes + 1;
        let placed: Vec<Vec<Literal>> = (0..num_pigeons)
            .map(|_| {
                (0..num_holes)
                    .map(|_| Literal::new(solver.create_new_propositional_variable(), true))
                    .collect()
            })
            .collect();

        for pigeon in &placed {
            solver.add_clause(pigeon.clone()).unwrap();
        }
        for hole in 0..num_holes {
            for p1 in 0..num_pigeons {
                for p2 in (p1 + 1)..num_pigeons {
                    solver
                        .add_clause(vec![!placed[p1][hole], !placed[p2][hole]])
                        .unwrap();
                }
            }
        }
    }

    #[test]
    fn pigeonhole_is_unsatisfiable() {
        let mut solver = SatSolver::default();
        add_pigeonhole_clauses(&mut solver, 5);

        assert_eq!(
            SatisfactionResult::Unsatisfiable,
            solver.solve(&mut Indefinite)
        );
        assert!(solver.counters().num_conflicts > 0);
    }

    #[test]
    fn pigeonhole_without_minimisation_or_restarts() {
        let mut solver = SatSolver::new(SatSolverOptions {
            restart_options: RestartOptions {
                restarts_enabled: false,
                ..Default::default()
            },
            learning_options: LearningOptions {
                minimise: false,
                max_num_high_lbd_clauses: 10,
                ..Default::default()
            },
            random_seed: 7,
        });
        add_pigeonhole_clauses(&mut solver, 5);

        assert_eq!(
            SatisfactionResult::Unsatisfiable,
            solver.solve(&mut Indefinite)
        );
    }

    #[test]
    fn clauses_can_be_added_between_solve_calls() {
        let (mut solver, x) = solver_with_variables(2);
        solver.add_clause(vec![x[0], x[1]]).unwrap();
        assert!(matches!(
            solver.solve(&mut Indefinite),
            SatisfactionResult::Satisfiable(_)
        ));

        solver.add_clause(vec![!x[0]]).unwrap();
        match solver.solve(&mut Indefinite) {
            SatisfactionResult::Satisfiable(solution) => {
                assert!(!solution.get_literal_value(x[0]));
                assert!(solution.get_literal_value(x[1]));
            }
            other => panic!("expected a model, got {other:?}"),
        }

        assert!(solver.add_clause(vec![!x[1]]).is_err());
        assert_eq!(
            SatisfactionResult::Unsatisfiable,
            solver.solve(&mut Indefinite)
        );
    }

    #[test]
    fn exhausted_termination_gives_unknown() {
        let mut solver = SatSolver::default();
        add_pigeonhole_clauses(&mut solver, 6);

        let mut budget = crate::termination::DecisionBudget::new(0);
        assert_eq!(SatisfactionResult::Unknown, solver.solve(&mut budget));
    }
}
