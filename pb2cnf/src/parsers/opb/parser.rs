use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;

use thiserror::Error;

use crate::basic_types::Function;
use crate::basic_types::Literal;
use crate::basic_types::PropositionalVariable;
use crate::encoders::Comparator;
use crate::encoders::EncodingError;
use crate::encoders::PseudoBooleanConstraint;

/// Receives the contents of an OPB file. Variable `xN` is reported as the positive literal of
/// [`PropositionalVariable`] `N`.
pub trait OpbSink {
    /// The arguments to the sink.
    type ConstructorArgs;

    /// The type that the parsed file is turned into.
    type Formula;

    /// Create an empty formula. The header is the `#variable= ... #constraint= ...` comment at
    /// the start of the file, if there is one.
    fn empty(args: Self::ConstructorArgs, header: Option<OpbHeader>) -> Self;

    /// The objective, to be minimised. A `max:` objective is negated before it is reported.
    fn set_objective(&mut self, objective: Function);

    /// Errors other than [`EncodingError::CoefficientOverflow`] mean that the formula has become
    /// infeasible, which does not stop the parser.
    fn add_constraint(&mut self, constraint: PseudoBooleanConstraint) -> Result<(), EncodingError>;

    fn into_formula(self) -> Self::Formula;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpbHeader {
    pub num_variables: u32,
    pub num_constraints: usize,
}

#[derive(Debug, Error)]
pub enum OpbParseError {
    #[error("failed to read file")]
    Io(#[from] std::io::Error),

    #[error("line {line}: unexpected character '{character}'")]
    UnexpectedCharacter { line: usize, character: char },

    #[error("line {line}: '{name}' is not a valid variable")]
    InvalidVariable { line: usize, name: String },

    #[error("line {line}: coefficient {coefficient} is not followed by a literal")]
    CoefficientWithoutLiteral { line: usize, coefficient: i64 },

    #[error("line {line}: non-linear terms are not supported")]
    NonLinearTerm { line: usize },

    #[error("line {line}: constraint without relation")]
    MissingRelation { line: usize },

    #[error("line {line}: constraint without right-hand side")]
    MissingRightHandSide { line: usize },

    #[error("line {line}: unexpected '{token}' after the right-hand side")]
    TrailingInput { line: usize, token: String },

    #[error("line {line}: integer does not fit in 64 bits")]
    IntegerOverflow { line: usize },

    #[error("line {line}: statement is not terminated with ';'")]
    UnterminatedStatement { line: usize },

    #[error("line {line}: the objective is declared a second time")]
    DuplicateObjective { line: usize },

    #[error("expected {expected} constraints according to the header, but parsed {parsed}")]
    IncorrectConstraintCount { expected: usize, parsed: usize },
}

pub fn parse_opb<Sink: OpbSink>(
    source: impl Read,
    sink_constructor_args: Sink::ConstructorArgs,
) -> Result<Sink::Formula, OpbParseError> {
    let mut reader = BufReader::new(source);

    // the header is only recognised in the comments that precede the first statement, so those
    // are read before the sink is created
    let mut header = None;
    let mut line = String::new();
    let mut line_number = 0;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_number += 1;

        match line.trim_start().strip_prefix('*') {
            Some(comment) => {
                if header.is_none() {
                    header = parse_header(comment);
                }
            }
            None if line.trim().is_empty() => {}
            None => break,
        }
    }

    let mut parser = OpbParser::new(Sink::empty(sink_constructor_args, header), header);
    parser.line = line_number.max(1);
    parser.parse_chunk(line.as_bytes())?;

    loop {
        let num_bytes = {
            let data = reader.fill_buf()?;

            if data.is_empty() {
                return parser.complete();
            }

            parser.parse_chunk(data)?;
            data.len()
        };

        reader.consume(num_bytes);
    }
}

/// Recognises `#variable= N #constraint= M`.
fn parse_header(comment: &str) -> Option<OpbHeader> {
    let mut num_variables = None;
    let mut num_constraints = None;

    let mut components = comment.split_ascii_whitespace();
    while let Some(component) = components.next() {
        match component {
            "#variable=" => num_variables = components.next()?.parse().ok(),
            "#constraint=" => num_constraints = components.next()?.parse().ok(),
            _ => {}
        }
    }

    Some(OpbHeader {
        num_variables: num_variables?,
        num_constraints: num_constraints?,
    })
}

/// Splits the input into statements terminated by `;`, skipping comment lines.
struct OpbParser<Sink> {
    sink: Sink,
    header: Option<OpbHeader>,
    state: ParseState,
    /// The current line, starting at 1.
    line: usize,
    statement: String,
    statement_line: usize,
    has_objective: bool,
    parsed_constraints: usize,
}

enum ParseState {
    StartLine,
    Comment,
    Statement,
}

impl<Sink: OpbSink> OpbParser<Sink> {
    fn new(sink: Sink, header: Option<OpbHeader>) -> Self {
        OpbParser {
            sink,
            header,
            state: ParseState::StartLine,
            line: 1,
            statement: String::new(),
            statement_line: 1,
            has_objective: false,
            parsed_constraints: 0,
        }
    }

    fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), OpbParseError> {
        for &byte in chunk {
            match self.state {
                ParseState::StartLine => match byte {
                    b'\n' => self.line += 1,
                    b if b.is_ascii_whitespace() => {}
                    b'*' => self.state = ParseState::Comment,
                    b => {
                        self.state = ParseState::Statement;
                        self.push_statement_byte(b)?;
                    }
                },

                ParseState::Comment => {
                    if byte == b'\n' {
                        self.line += 1;
                        self.state = ParseState::StartLine;
                    }
                }

                // a statement may span several lines, with comment lines in between
                ParseState::Statement => match byte {
                    b'\n' => {
                        self.line += 1;
                        self.statement.push(' ');
                        self.state = ParseState::StartLine;
                    }
                    b => self.push_statement_byte(b)?,
                },
            }
        }

        Ok(())
    }

    fn push_statement_byte(&mut self, byte: u8) -> Result<(), OpbParseError> {
        if self.statement.trim().is_empty() {
            self.statement_line = self.line;
        }

        if byte == b';' {
            self.finish_statement()?;
            self.state = ParseState::StartLine;
        } else {
            self.statement.push(byte as char);
        }

        Ok(())
    }

    fn finish_statement(&mut self) -> Result<(), OpbParseError> {
        let line = self.statement_line;
        let tokens = tokenize(&self.statement, line)?;
        self.statement.clear();

        match parse_statement(tokens, line)? {
            Statement::Objective(objective) => {
                if self.has_objective {
                    return Err(OpbParseError::DuplicateObjective { line });
                }
                self.has_objective = true;
                self.sink.set_objective(objective);
            }
            Statement::Constraint(constraint) => {
                self.parsed_constraints += 1;
                match self.sink.add_constraint(constraint) {
                    Err(EncodingError::CoefficientOverflow) => {
                        return Err(OpbParseError::IntegerOverflow { line });
                    }
                    Ok(()) | Err(_) => {}
                }
            }
            Statement::Empty => {}
        }

        Ok(())
    }

    fn complete(self) -> Result<Sink::Formula, OpbParseError> {
        if !self.statement.trim().is_empty() {
            return Err(OpbParseError::UnterminatedStatement {
                line: self.statement_line,
            });
        }

        if let Some(header) = self.header {
            if header.num_constraints != self.parsed_constraints {
                return Err(OpbParseError::IncorrectConstraintCount {
                    expected: header.num_constraints,
                    parsed: self.parsed_constraints,
                });
            }
        }

        Ok(self.sink.into_formula())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Minimise,
    Maximise,
    Integer(i64),
    Literal(Literal),
    Relation(Comparator),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Minimise => write!(f, "min:"),
            Token::Maximise => write!(f, "max:"),
            Token::Integer(value) => write!(f, "{value}"),
            Token::Literal(literal) => {
                let prefix = if literal.is_negative() { "~" } else { "" };
                write!(f, "{prefix}x{}", literal.get_propositional_variable().index())
            }
            Token::Relation(comparator) => write!(f, "{comparator}"),
        }
    }
}

fn tokenize(statement: &str, line: usize) -> Result<Vec<Token>, OpbParseError> {
    let bytes = statement.as_bytes();
    let mut tokens = vec![];
    let mut position = 0;

    let skip_digits = |mut position: usize| {
        while position < bytes.len() && bytes[position].is_ascii_digit() {
            position += 1;
        }
        position
    };

    while position < bytes.len() {
        let rest = &statement[position..];

        match bytes[position] {
            b if b.is_ascii_whitespace() => position += 1,

            _ if rest.starts_with("min:") => {
                tokens.push(Token::Minimise);
                position += 4;
            }
            _ if rest.starts_with("max:") => {
                tokens.push(Token::Maximise);
                position += 4;
            }

            b'>' | b'<' => {
                if bytes.get(position + 1) != Some(&b'=') {
                    return Err(unexpected_character(statement, position + 1, line));
                }
                let comparator = if bytes[position] == b'>' {
                    Comparator::GreaterEqual
                } else {
                    Comparator::LessEqual
                };
                tokens.push(Token::Relation(comparator));
                position += 2;
            }
            b'=' => {
                tokens.push(Token::Relation(Comparator::Equal));
                position += 1;
            }

            b'+' | b'-' | b'0'..=b'9' => {
                let is_negative = bytes[position] == b'-';
                let mut start = position;
                if !bytes[position].is_ascii_digit() {
                    start += 1;
                    while start < bytes.len() && bytes[start] == b' ' {
                        start += 1;
                    }
                }
                let end = skip_digits(start);
                if end == start {
                    return Err(unexpected_character(statement, start, line));
                }

                let magnitude = statement[start..end]
                    .parse::<i64>()
                    .map_err(|_| OpbParseError::IntegerOverflow { line })?;
                tokens.push(Token::Integer(if is_negative {
                    -magnitude
                } else {
                    magnitude
                }));
                position = end;
            }

            b'~' | b'x' => {
                let is_negated = bytes[position] == b'~';
                let name_start = position;
                let mut start = position + usize::from(is_negated);
                if bytes.get(start) != Some(&b'x') {
                    return Err(unexpected_character(statement, start, line));
                }
                start += 1;
                let end = skip_digits(start);

                let index = statement[start..end]
                    .parse::<u32>()
                    .ok()
                    .filter(|index| *index > 0)
                    .ok_or_else(|| OpbParseError::InvalidVariable {
                        line,
                        name: statement[name_start..end].to_owned(),
                    })?;
                tokens.push(Token::Literal(Literal::new(
                    PropositionalVariable::new(index),
                    !is_negated,
                )));
                position = end;
            }

            _ => return Err(unexpected_character(statement, position, line)),
        }
    }

    Ok(tokens)
}

fn unexpected_character(statement: &str, position: usize, line: usize) -> OpbParseError {
    match statement[position..].chars().next() {
        Some(character) => OpbParseError::UnexpectedCharacter { line, character },
        None => OpbParseError::UnterminatedStatement { line },
    }
}

enum Statement {
    Objective(Function),
    Constraint(PseudoBooleanConstraint),
    Empty,
}

fn parse_statement(tokens: Vec<Token>, line: usize) -> Result<Statement, OpbParseError> {
    let mut tokens = tokens.into_iter().peekable();

    let sense = match tokens.peek() {
        None => return Ok(Statement::Empty),
        Some(Token::Minimise) => Some(1),
        Some(Token::Maximise) => Some(-1),
        Some(_) => None,
    };
    if sense.is_some() {
        let _ = tokens.next();
    }

    let mut terms = vec![];
    loop {
        let coefficient = match tokens.peek() {
            Some(&Token::Integer(coefficient)) => {
                let _ = tokens.next();
                match tokens.peek() {
                    Some(Token::Literal(_)) => coefficient,
                    _ => return Err(OpbParseError::CoefficientWithoutLiteral { line, coefficient }),
                }
            }
            Some(Token::Literal(_)) => 1,
            _ => break,
        };

        if let Some(Token::Literal(literal)) = tokens.next() {
            terms.push((coefficient, literal));
        }
        if let Some(Token::Literal(_)) = tokens.peek() {
            return Err(OpbParseError::NonLinearTerm { line });
        }
    }

    if let Some(sense) = sense {
        if let Some(token) = tokens.next() {
            return Err(OpbParseError::TrailingInput {
                line,
                token: token.to_string(),
            });
        }

        let mut objective = Function::default();
        for (coefficient, literal) in terms {
            let coefficient = coefficient
                .checked_mul(sense)
                .ok_or(OpbParseError::IntegerOverflow { line })?;
            objective.add_term(coefficient, literal);
        }
        return Ok(Statement::Objective(objective));
    }

    let comparator = match tokens.next() {
        Some(Token::Relation(comparator)) => comparator,
        None => return Err(OpbParseError::MissingRelation { line }),
        Some(token) => {
            return Err(OpbParseError::TrailingInput {
                line,
                token: token.to_string(),
            })
        }
    };

    let rhs = match tokens.next() {
        Some(Token::Integer(rhs)) => rhs,
        _ => return Err(OpbParseError::MissingRightHandSide { line }),
    };

    if let Some(token) = tokens.next() {
        return Err(OpbParseError::TrailingInput {
            line,
            token: token.to_string(),
        });
    }

    Ok(Statement::Constraint(PseudoBooleanConstraint::new(
        terms, comparator, rhs,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::opb::OpbInstance;

    fn x(index: u32) -> Literal {
        Literal::new(PropositionalVariable::new(index), true)
    }

    fn parse(source: &str) -> OpbInstance {
        parse_opb::<OpbInstance>(source.as_bytes(), ()).expect("valid opb")
    }

    fn parse_error(source: &str) -> OpbParseError {
        parse_opb::<OpbInstance>(source.as_bytes(), ()).expect_err("invalid opb")
    }

    #[test]
    fn constraints_are_read() {
        let instance = parse("+1 x1 +2 ~x2 >= 1;\n-3 x3 <= -1;\n+1 x1 = 1;\n");

        assert_eq!(
            vec![
                PseudoBooleanConstraint::new(
                    vec![(1, x(1)), (2, !x(2))],
                    Comparator::GreaterEqual,
                    1
                ),
                PseudoBooleanConstraint::new(vec![(-3, x(3))], Comparator::LessEqual, -1),
                PseudoBooleanConstraint::new(vec![(1, x(1))], Comparator::Equal, 1),
            ],
            instance.constraints
        );
        assert!(instance.objective.is_none());
        assert_eq!(3, instance.num_variables);
    }

    #[test]
    fn header_and_comments_are_read() {
        let instance = parse(
            "* #variable= 5 #constraint= 1\n* another comment\n\n+1 x1 +1 x2 >= 1;\n* done\n",
        );

        assert_eq!(
            Some(OpbHeader {
                num_variables: 5,
                num_constraints: 1
            }),
            instance.header
        );
        assert_eq!(5, instance.num_variables);
        assert_eq!(1, instance.constraints.len());
    }

    #[test]
    fn objective_is_read() {
        let instance = parse("min: +2 x1 -1 x2;\n+1 x1 +1 x2 >= 1;\n");
        let objective = instance.objective.expect("objective");

        // 2 x1 - x2 = 2 x1 + ~x2 - 1
        assert_eq!(-1, objective.get_constant_term());
        assert_eq!(
            vec![
                crate::basic_types::WeightedLiteral::new(x(1), 2),
                crate::basic_types::WeightedLiteral::new(!x(2), 1)
            ],
            objective.get_function_as_weighted_literals_vector()
        );
    }

    #[test]
    fn maximisation_is_negated() {
        let instance = parse("max: +3 x1;\n");
        let objective = instance.objective.expect("objective");

        assert_eq!(-3, objective.get_constant_term());
        assert_eq!(
            vec![crate::basic_types::WeightedLiteral::new(!x(1), 3)],
            objective.get_function_as_weighted_literals_vector()
        );
    }

    #[test]
    fn tokens_need_not_be_separated() {
        let instance = parse("-1 x3>= -5;+1 x1 +1 x2<=1;");

        assert_eq!(
            vec![
                PseudoBooleanConstraint::new(vec![(-1, x(3))], Comparator::GreaterEqual, -5),
                PseudoBooleanConstraint::new(vec![(1, x(1)), (1, x(2))], Comparator::LessEqual, 1),
            ],
            instance.constraints
        );
    }

    #[test]
    fn statements_may_span_lines() {
        let instance = parse("+1 x1\n* in between\n +1 x2\n>= 1\n;\n");

        assert_eq!(
            vec![PseudoBooleanConstraint::new(
                vec![(1, x(1)), (1, x(2))],
                Comparator::GreaterEqual,
                1
            )],
            instance.constraints
        );
    }

    #[test]
    fn errors_report_their_line() {
        assert!(matches!(
            parse_error("+1 x1 >= 1;\n+1 y1 >= 1;\n"),
            OpbParseError::UnexpectedCharacter {
                line: 2,
                character: 'y'
            }
        ));
        assert!(matches!(
            parse_error("+1 x0 >= 1;"),
            OpbParseError::InvalidVariable { line: 1, .. }
        ));
        assert!(matches!(
            parse_error("\n\n+1 x1 +2 >= 1;"),
            OpbParseError::CoefficientWithoutLiteral {
                line: 3,
                coefficient: 2
            }
        ));
        assert!(matches!(
            parse_error("+1 x1 x2 >= 1;"),
            OpbParseError::NonLinearTerm { line: 1 }
        ));
        assert!(matches!(
            parse_error("+1 x1 1;"),
            OpbParseError::CoefficientWithoutLiteral { line: 1, .. }
        ));
        assert!(matches!(
            parse_error("+1 x1 ;"),
            OpbParseError::MissingRelation { line: 1 }
        ));
        assert!(matches!(
            parse_error("+1 x1 >= ;"),
            OpbParseError::MissingRightHandSide { line: 1 }
        ));
        assert!(matches!(
            parse_error("+99999999999999999999 x1 >= 1;"),
            OpbParseError::IntegerOverflow { line: 1 }
        ));
        assert!(matches!(
            parse_error("+1 x1 >= 1;\n+1 x2 >= 1"),
            OpbParseError::UnterminatedStatement { line: 2 }
        ));
        assert!(matches!(
            parse_error("min: +1 x1;\nmin: +1 x2;"),
            OpbParseError::DuplicateObjective { line: 2 }
        ));
        assert!(matches!(
            parse_error("* #variable= 1 #constraint= 2\n+1 x1 >= 1;\n"),
            OpbParseError::IncorrectConstraintCount {
                expected: 2,
                parsed: 1
            }
        ));
    }

    #[test]
    fn header_requires_both_counts() {
        assert_eq!(None, parse_header(" #variable= 3"));
        assert_eq!(
            Some(OpbHeader {
                num_variables: 3,
                num_constraints: 4
            }),
            parse_header(" #variable= 3 #constraint= 4 #product= 0")
        );
    }
}
