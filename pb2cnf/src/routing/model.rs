use std::io::Write;

use log::debug;

use super::RoutingInstance;
use crate::basic_types::Function;
use crate::basic_types::Literal;
use crate::clause_databases::ClauseDatabase;
use crate::encoders::Comparator;
use crate::encoders::EncodingError;
use crate::encoders::Pb2Cnf;
use crate::encoders::PseudoBooleanConstraint;
use crate::parsers::opb::write_opb;
use crate::pb2cnf_assert_simple;

/// The pseudo-Boolean model of a [`RoutingInstance`], over the literals of
/// [`RoutingInstance::cell_literal`].
#[derive(Debug, Clone)]
pub struct RoutingModel {
    constraints: Vec<PseudoBooleanConstraint>,
    objective: Function,
    num_variables: u32,
}

impl RoutingModel {
    /// Builds the model, optionally bounding the total number of used cells by `max_cells`.
    pub fn new(instance: &RoutingInstance, max_cells: Option<u64>) -> RoutingModel {
        let mut constraints = vec![];
        let num_pairs = instance.pairs().len();

        for (pair, &(first, second)) in instance.pairs().iter().enumerate() {
            for endpoint in [first, second] {
                constraints.push(PseudoBooleanConstraint::new(
                    vec![(1, instance.cell_literal(endpoint, pair))],
                    Comparator::GreaterEqual,
                    1,
                ));
            }

            // an endpoint is the end of its path
            for endpoint in [first, second] {
                constraints.push(PseudoBooleanConstraint::new(
                    neighbour_terms(instance, endpoint, pair, 1),
                    Comparator::Equal,
                    1,
                ));
            }
        }

        for cell in instance.cells() {
            if !instance.is_endpoint(cell) {
                for pair in 0..num_pairs {
                    // a used cell has exactly two neighbours on the same path, the ~x term
                    // relaxes both constraints when the cell is not used
                    let slack = (3, !instance.cell_literal(cell, pair));

                    let mut at_most_two = neighbour_terms(instance, cell, pair, -1);
                    at_most_two.push(slack);
                    constraints.push(PseudoBooleanConstraint::new(
                        at_most_two,
                        Comparator::GreaterEqual,
                        -2,
                    ));

                    let mut at_least_two = neighbour_terms(instance, cell, pair, 1);
                    at_least_two.push(slack);
                    constraints.push(PseudoBooleanConstraint::new(
                        at_least_two,
                        Comparator::GreaterEqual,
                        2,
                    ));
                }
            }

            constraints.push(PseudoBooleanConstraint::new(
                (0..num_pairs)
                    .map(|pair| (-1, instance.cell_literal(cell, pair)))
                    .collect(),
                Comparator::GreaterEqual,
                -1,
            ));
        }

        let all_cells = || {
            instance
                .cells()
                .flat_map(move |cell| (0..num_pairs).map(move |pair| instance.cell_literal(cell, pair)))
        };

        if let Some(max_cells) = max_cells {
            constraints.push(PseudoBooleanConstraint::new(
                all_cells().map(|literal| (-1, literal)).collect(),
                Comparator::GreaterEqual,
                -i64::try_from(max_cells).unwrap_or(i64::MAX),
            ));
        }

        let mut objective = Function::default();
        for literal in all_cells() {
            objective.add_weighted_literal(literal, 1);
        }

        debug!(
            "Routing model has {} variables and {} constraints",
            instance.num_variables(),
            constraints.len()
        );

        RoutingModel {
            constraints,
            objective,
            num_variables: instance.num_variables(),
        }
    }

    pub fn constraints(&self) -> &[PseudoBooleanConstraint] {
        &self.constraints
    }

    /// The number of used cells.
    pub fn objective(&self) -> &Function {
        &self.objective
    }

    pub fn write_opb(&self, writer: &mut impl Write) -> std::io::Result<()> {
        write_opb(writer, Some(&self.objective), &self.constraints)
    }

    /// Encodes the model into an empty clause database, in which the variables of the model keep
    /// their index. Stops at the first constraint that cannot be satisfied.
    pub fn encode(
        &self,
        pb2cnf: Pb2Cnf,
        clause_database: &mut dyn ClauseDatabase,
    ) -> Result<(), EncodingError> {
        pb2cnf_assert_simple!(
            clause_database.num_variables() == 0,
            "the model is encoded into an empty database"
        );

        let _ = clause_database.new_literals(self.num_variables as usize);
        self.constraints
            .iter()
            .try_for_each(|constraint| pb2cnf.encode(constraint, clause_database))
    }
}

fn neighbour_terms(
    instance: &RoutingInstance,
    cell: super::Point,
    pair: usize,
    coefficient: i64,
) -> Vec<(i64, Literal)> {
    instance
        .neighbours(cell)
        .map(|neighbour| (coefficient, instance.cell_literal(neighbour, pair)))
        .collect()
}
