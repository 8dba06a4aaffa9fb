use log::debug;

use super::OpbHeader;
use super::OpbSink;
use crate::basic_types::Function;
use crate::basic_types::Literal;
use crate::basic_types::PropositionalVariable;
use crate::basic_types::Solution;
use crate::clause_databases::ClauseDatabase;
use crate::encoders::EncodingError;
use crate::encoders::Pb2Cnf;
use crate::encoders::PseudoBooleanConstraint;

/// Encodes every constraint of an OPB file into a clause database while it is parsed.
///
/// OPB variables are given a fresh variable of the database when they are first seen. When the
/// file has a header, the declared variables are created up front so that `xN` becomes variable
/// `N` of an empty database.
#[derive(Debug)]
pub struct EncodingOpbSink<Db> {
    clause_database: Db,
    pb2cnf: Pb2Cnf,
    variable_map: OpbVariableMap,
    objective: Option<Function>,
    num_constraints: usize,
}

/// The result of parsing with an [`EncodingOpbSink`].
#[derive(Debug)]
pub struct EncodedOpb<Db> {
    pub clause_database: Db,
    /// The objective over the literals of the clause database.
    pub objective: Option<Function>,
    pub variable_map: OpbVariableMap,
    pub num_constraints: usize,
}

/// Maps OPB variable indices to the literals which represent them in a clause database.
#[derive(Debug, Clone, Default)]
pub struct OpbVariableMap {
    literals: Vec<Option<Literal>>,
}

impl OpbVariableMap {
    pub fn get(&self, index: u32) -> Option<Literal> {
        self.literals.get(index as usize).copied().flatten()
    }

    pub fn num_instance_variables(&self) -> u32 {
        self.literals.len().saturating_sub(1) as u32
    }

    /// Translates a solution over the clause database into one indexed by OPB variable. Variables
    /// which never occurred in a statement are false.
    pub fn instance_solution(&self, solution: &Solution) -> Solution {
        Solution::new(
            self.literals
                .iter()
                .map(|literal| literal.is_some_and(|literal| solution.get_literal_value(literal)))
                .collect(),
        )
    }

    fn map_literal(&mut self, literal: Literal, clause_database: &mut dyn ClauseDatabase) -> Literal {
        let index = literal.get_propositional_variable().index() as usize;
        if self.literals.len() <= index {
            self.literals.resize(index + 1, None);
        }

        let mapped = *self.literals[index].get_or_insert_with(|| clause_database.new_literal());
        if literal.is_positive() {
            mapped
        } else {
            !mapped
        }
    }
}

impl<Db: ClauseDatabase> OpbSink for EncodingOpbSink<Db> {
    type ConstructorArgs = (Db, Pb2Cnf);
    type Formula = EncodedOpb<Db>;

    fn empty((mut clause_database, pb2cnf): Self::ConstructorArgs, header: Option<OpbHeader>) -> Self {
        let mut variable_map = OpbVariableMap::default();
        if let Some(header) = header {
            for index in 1..=header.num_variables {
                let literal = Literal::new(PropositionalVariable::new(index), true);
                let _ = variable_map.map_literal(literal, &mut clause_database);
            }
        }

        EncodingOpbSink {
            clause_database,
            pb2cnf,
            variable_map,
            objective: None,
            num_constraints: 0,
        }
    }

    fn set_objective(&mut self, objective: Function) {
        let mut mapped = Function::default();
        for weighted_literal in objective.get_function_as_weighted_literals_vector() {
            let literal = self
                .variable_map
                .map_literal(weighted_literal.literal, &mut self.clause_database);
            mapped.add_weighted_literal(literal, weighted_literal.weight);
        }
        mapped.add_constant_term(objective.get_constant_term());

        self.objective = Some(mapped);
    }

    fn add_constraint(&mut self, constraint: PseudoBooleanConstraint) -> Result<(), EncodingError> {
        self.num_constraints += 1;

        let terms = constraint
            .terms
            .iter()
            .map(|&(coefficient, literal)| {
                (
                    coefficient,
                    self.variable_map
                        .map_literal(literal, &mut self.clause_database),
                )
            })
            .collect();
        let constraint =
            PseudoBooleanConstraint::new(terms, constraint.comparator, constraint.rhs);

        self.pb2cnf
            .encode(&constraint, &mut self.clause_database)
            .inspect_err(|error| {
                debug!("constraint {} cannot be satisfied: {error}", self.num_constraints)
            })
    }

    fn into_formula(self) -> Self::Formula {
        EncodedOpb {
            clause_database: self.clause_database,
            objective: self.objective,
            variable_map: self.variable_map,
            num_constraints: self.num_constraints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause_databases::SatSolverClauseDatabase;
    use crate::clause_databases::VectorClauseDatabase;
    use crate::encoders::PseudoBooleanEncoding;
    use crate::parsers::opb::parse_opb;
    use crate::sat::SatSolverOptions;
    use crate::sat::SatisfactionResult;
    use crate::termination::Indefinite;

    type VectorSink = EncodingOpbSink<VectorClauseDatabase>;

    #[test]
    fn header_variables_keep_their_index() {
        let encoded = parse_opb::<VectorSink>(
            "* #variable= 4 #constraint= 1\n+1 x4 +1 x2 >= 1;\n".as_bytes(),
            (VectorClauseDatabase::new(0), Pb2Cnf::default()),
        )
        .expect("valid opb");

        for index in 1..=4 {
            assert_eq!(
                Some(index),
                encoded
                    .variable_map
                    .get(index)
                    .map(|literal| literal.to_dimacs() as u32)
            );
        }
        assert_eq!(4, encoded.variable_map.num_instance_variables());
        assert_eq!(1, encoded.num_constraints);
    }

    #[test]
    fn variables_are_created_on_first_use() {
        let encoded = parse_opb::<VectorSink>(
            "+1 x7 +1 ~x3 >= 1;\n".as_bytes(),
            (VectorClauseDatabase::new(0), Pb2Cnf::default()),
        )
        .expect("valid opb");

        assert_eq!(Some(1), encoded.variable_map.get(7).map(Literal::to_dimacs));
        assert_eq!(Some(2), encoded.variable_map.get(3).map(Literal::to_dimacs));
        assert_eq!(None, encoded.variable_map.get(5));

        assert!(encoded.clause_database.num_clauses() > 0);
    }

    #[test]
    fn encoding_accepts_exactly_the_models_of_the_constraint() {
        for (x7, x3) in [(false, false), (false, true), (true, false), (true, true)] {
            let encoded = parse_opb::<EncodingOpbSink<SatSolverClauseDatabase>>(
                "+1 x7 +1 ~x3 >= 1;\n".as_bytes(),
                (
                    SatSolverClauseDatabase::new(SatSolverOptions::default()),
                    Pb2Cnf::default(),
                ),
            )
            .expect("valid opb");
            let literal_x7 = encoded.variable_map.get(7).expect("mapped");
            let literal_x3 = encoded.variable_map.get(3).expect("mapped");

            let mut clause_database = encoded.clause_database;
            let fixed = clause_database
                .add_clause(vec![if x7 { literal_x7 } else { !literal_x7 }])
                .and_then(|_| {
                    clause_database.add_clause(vec![if x3 { literal_x3 } else { !literal_x3 }])
                });

            let is_satisfiable = fixed.is_ok()
                && matches!(
                    clause_database.solver_mut().solve(&mut Indefinite),
                    SatisfactionResult::Satisfiable(_)
                );
            assert_eq!(x7 || !x3, is_satisfiable, "x7 = {x7}, x3 = {x3}");
        }
    }

    #[test]
    fn encoded_instance_is_solved() {
        let source = "min: +1 x1 +1 x2 +1 x3;\n\
                      +1 x1 +1 x2 >= 1;\n\
                      +1 x2 +1 x3 >= 1;\n\
                      +2 x1 -1 x2 >= 0;\n";

        for encoding in [
            PseudoBooleanEncoding::GTE,
            PseudoBooleanEncoding::CNE,
            PseudoBooleanEncoding::Sequential,
        ] {
            let encoded = parse_opb::<EncodingOpbSink<SatSolverClauseDatabase>>(
                source.as_bytes(),
                (
                    SatSolverClauseDatabase::new(SatSolverOptions::default()),
                    Pb2Cnf::new(encoding),
                ),
            )
            .expect("valid opb");

            let mut solver = encoded.clause_database.into_solver();
            let SatisfactionResult::Satisfiable(solution) = solver.solve(&mut Indefinite) else {
                panic!("instance is satisfiable");
            };

            let instance_solution = encoded.variable_map.instance_solution(&solution);
            let instance = parse_opb::<crate::parsers::opb::OpbInstance>(source.as_bytes(), ())
                .expect("valid opb");
            assert_eq!(0, instance.violated_constraints(&instance_solution).count());
        }
    }

    #[test]
    fn infeasible_constraint_does_not_stop_parsing() {
        let encoded = parse_opb::<VectorSink>(
            "+1 x1 >= 2;\n+1 x2 >= 1;\n".as_bytes(),
            (VectorClauseDatabase::new(0), Pb2Cnf::default()),
        )
        .expect("valid opb");

        assert!(encoded.clause_database.is_infeasible());
        assert_eq!(2, encoded.num_constraints);
    }
}
