use std::io::Write;

use crate::basic_types::Function;
use crate::basic_types::Literal;
use crate::encoders::PseudoBooleanConstraint;

/// Writes an OPB file with a header. The constant term of the objective cannot be expressed in
/// OPB and is written as a comment.
pub fn write_opb(
    writer: &mut impl Write,
    objective: Option<&Function>,
    constraints: &[PseudoBooleanConstraint],
) -> std::io::Result<()> {
    let num_variables = constraints
        .iter()
        .flat_map(|constraint| constraint.terms.iter().map(|(_, literal)| *literal))
        .chain(
            objective
                .into_iter()
                .flat_map(|objective| objective.get_weighted_literals().map(|(literal, _)| *literal)),
        )
        .map(|literal| literal.get_propositional_variable().index())
        .max()
        .unwrap_or(0);

    writeln!(
        writer,
        "* #variable= {num_variables} #constraint= {}",
        constraints.len()
    )?;

    if let Some(objective) = objective {
        if objective.get_constant_term() != 0 {
            writeln!(writer, "* objective offset {}", objective.get_constant_term())?;
        }

        write!(writer, "min:")?;
        for term in objective.get_function_as_weighted_literals_vector() {
            write!(writer, " +{} {}", term.weight, OpbLiteral(term.literal))?;
        }
        writeln!(writer, " ;")?;
    }

    for constraint in constraints {
        for (coefficient, literal) in &constraint.terms {
            write!(writer, "{coefficient:+} {} ", OpbLiteral(*literal))?;
        }
        writeln!(writer, "{} {} ;", constraint.comparator, constraint.rhs)?;
    }

    Ok(())
}

struct OpbLiteral(Literal);

impl std::fmt::Display for OpbLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = if self.0.is_negative() { "~" } else { "" };
        write!(f, "{prefix}x{}", self.0.get_propositional_variable().index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::PropositionalVariable;
    use crate::encoders::Comparator;
    use crate::parsers::opb::parse_opb;
    use crate::parsers::opb::OpbInstance;

    fn x(index: u32) -> Literal {
        Literal::new(PropositionalVariable::new(index), true)
    }

    #[test]
    fn written_file_has_header_and_statements() {
        let mut objective = Function::default();
        objective.add_weighted_literal(x(1), 1);
        objective.add_weighted_literal(x(2), 1);
        let constraints = vec![
            PseudoBooleanConstraint::new(vec![(1, x(1))], Comparator::GreaterEqual, 1),
            PseudoBooleanConstraint::new(
                vec![(-1, x(1)), (3, !x(3))],
                Comparator::GreaterEqual,
                -2,
            ),
        ];

        let mut output = vec![];
        write_opb(&mut output, Some(&objective), &constraints).expect("writing to a vector");

        assert_eq!(
            "* #variable= 3 #constraint= 2\n\
             min: +1 x1 +1 x2 ;\n\
             +1 x1 >= 1 ;\n\
             -1 x1 +3 ~x3 >= -2 ;\n",
            String::from_utf8(output.clone()).expect("ascii")
        );

        let instance = parse_opb::<OpbInstance>(output.as_slice(), ()).expect("valid opb");
        assert_eq!(constraints, instance.constraints);
    }
}
