use super::OpbHeader;
use super::OpbSink;
use crate::basic_types::Function;
use crate::basic_types::Solution;
use crate::encoders::EncodingError;
use crate::encoders::PseudoBooleanConstraint;

/// An OPB file as it was written, without any encoding.
#[derive(Debug, Clone, Default)]
pub struct OpbInstance {
    pub header: Option<OpbHeader>,
    /// The objective in minimisation form.
    pub objective: Option<Function>,
    pub constraints: Vec<PseudoBooleanConstraint>,
    /// The largest variable index that is declared in the header or used in the file.
    pub num_variables: u32,
}

impl OpbInstance {
    /// The constraints which `solution` violates, with their position in the file. The solution
    /// is indexed by OPB variable.
    pub fn violated_constraints<'a>(
        &'a self,
        solution: &'a Solution,
    ) -> impl Iterator<Item = (usize, &'a PseudoBooleanConstraint)> + 'a {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, constraint)| !constraint.is_satisfied_by(solution))
    }

    pub fn evaluate_objective(&self, solution: &Solution) -> Option<i64> {
        self.objective
            .as_ref()
            .map(|objective| objective.evaluate_solution(solution))
    }

    fn register_variable(&mut self, index: u32) {
        self.num_variables = self.num_variables.max(index);
    }
}

impl OpbSink for OpbInstance {
    type ConstructorArgs = ();
    type Formula = OpbInstance;

    fn empty(_: Self::ConstructorArgs, header: Option<OpbHeader>) -> Self {
        OpbInstance {
            header,
            num_variables: header.map_or(0, |header| header.num_variables),
            ..Default::default()
        }
    }

    fn set_objective(&mut self, objective: Function) {
        for (literal, _) in objective.get_weighted_literals() {
            self.register_variable(literal.get_propositional_variable().index());
        }
        self.objective = Some(objective);
    }

    fn add_constraint(&mut self, constraint: PseudoBooleanConstraint) -> Result<(), EncodingError> {
        for (_, literal) in &constraint.terms {
            self.register_variable(literal.get_propositional_variable().index());
        }
        self.constraints.push(constraint);
        Ok(())
    }

    fn into_formula(self) -> Self::Formula {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::opb::parse_opb;

    #[test]
    fn violated_constraints_are_reported_by_position() {
        let instance = parse_opb::<OpbInstance>(
            "min: +1 x1 +1 x2;\n+1 x1 +1 x2 >= 1;\n+1 x1 -1 x2 = 0;\n".as_bytes(),
            (),
        )
        .expect("valid opb");

        let solution = Solution::new(vec![false, true, false]);
        let violated = instance
            .violated_constraints(&solution)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        assert_eq!(vec![1], violated);
        assert_eq!(Some(1), instance.evaluate_objective(&solution));
    }
}
