//! This module provides parsers for the DIMACS CNF and WCNF file formats. Given that DIMACS files
//! can be very large, the implementation is designed to read the file in chunks. The parser also
//! will not allocate for every encountered clause, but rather re-use its buffers.
//!
//! To invoke the parser, there are two options:
//!  - For a CNF file, the [`parse_cnf`] function can be called,
//!  - For a WCNF file, the [`parse_wcnf`] function can be called.
//!
//! Both these functions operate on a type that implements the [`DimacsSink`] trait, which serves
//! as an interface to the consumer of the parsed contents of the file.
//!
//! The parsers should not be used as DIMACS validators. Even though they should only accept valid
//! DIMACS files, the errors are not extremely detailed.
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::num::NonZeroI32;
use std::str::FromStr;

use thiserror::Error;

use crate::basic_types::Function;
use crate::basic_types::Literal;
use crate::clause_databases::ClauseDatabase;
use crate::clause_databases::VectorClauseDatabase;
use crate::sat::preprocess_clause;
use crate::sat::SatSolver;
use crate::sat::SatSolverOptions;

/// A dimacs sink stores a set of clauses and allows for new variables to be created.
pub trait DimacsSink {
    /// The arguments to the dimacs sink.
    type ConstructorArgs;

    /// The underlying formula type.
    type Formula;

    /// Create an empty formula.
    fn empty(args: Self::ConstructorArgs, num_variables: usize) -> Self;

    /// Add a new hard clause to the formula. Consistency does not have to be checked at every
    /// insertion. As such, after the formula is constructed from the file format, consistency
    /// needs to be evaluated if appropriate.
    fn add_hard_clause(&mut self, clause: &[NonZeroI32]);

    /// Add a new soft clause to the formula. This supports non-unit soft clauses, and returns the
    /// literal which can be used in the objective function.
    fn add_soft_clause(&mut self, clause: &[NonZeroI32]) -> SoftClauseAddition;

    /// Take the collected clauses and turn it into the underlying formula type.
    fn into_formula(self) -> Self::Formula;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftClauseAddition {
    /// The soft clause is violated at the root. Its weight becomes a constant term of the
    /// objective function.
    RootViolated,
    /// The soft clause is satisfied at the root and can be ignored for the objective function.
    RootSatisfied,
    /// The soft clause is added to the formula. The literal is true whenever the soft clause is
    /// violated, and is added to the objective function.
    Added(Literal),
}

#[derive(Debug, Error)]
pub enum DimacsParseError {
    #[error("failed to read file")]
    Io(#[from] std::io::Error),

    #[error("missing dimacs header")]
    MissingHeader,

    #[error("'{0}' is an invalid header")]
    InvalidHeader(String),

    #[error("multiple dimacs headers found")]
    DuplicateHeader,

    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("'{0}' is an invalid DIMACS literal")]
    InvalidLiteral(String),

    #[error("the last clause in the source is not terminated with a '0'")]
    UnterminatedClause,

    #[error("expected to parse {expected} clauses, but parsed {parsed}")]
    IncorrectClauseCount { expected: usize, parsed: usize },
}

/// A parsed WCNF file: the hard clauses in `formula` and the soft clauses as an objective to
/// minimise.
#[derive(Debug)]
pub struct WcnfInstance<Formula> {
    pub formula: Formula,
    pub objective: Function,
    /// The number of variables declared in the header.
    pub last_instance_variable: usize,
}

pub fn parse_cnf<Sink: DimacsSink>(
    source: impl Read,
    sink_constructor_args: Sink::ConstructorArgs,
) -> Result<Sink::Formula, DimacsParseError> {
    let mut parser =
        DimacsParser::<Sink, _, CNFHeader>::new(sink_constructor_args, |sink, clause, _| {
            sink.add_hard_clause(clause);
        });

    parse_chunks(source, &mut parser)?;
    parser.complete().map(|(formula, _)| formula)
}

pub fn parse_wcnf<Sink: DimacsSink>(
    source: impl Read,
    sink_constructor_args: Sink::ConstructorArgs,
) -> Result<WcnfInstance<Sink::Formula>, DimacsParseError> {
    let mut objective = Function::default();

    let mut parser =
        DimacsParser::<Sink, _, WCNFHeader>::new(sink_constructor_args, |sink, clause, header| {
            let weight = clause[0].get() as u64;

            if weight >= header.top_weight {
                sink.add_hard_clause(&clause[1..]);
            } else {
                match sink.add_soft_clause(&clause[1..]) {
                    SoftClauseAddition::RootViolated => objective.add_constant_term(weight as i64),
                    SoftClauseAddition::RootSatisfied => {}
                    SoftClauseAddition::Added(literal) => {
                        objective.add_weighted_literal(literal, weight)
                    }
                }
            }
        });

    parse_chunks(source, &mut parser)?;
    let (formula, header) = parser.complete()?;

    Ok(WcnfInstance {
        formula,
        objective,
        last_instance_variable: header.num_variables,
    })
}

fn parse_chunks<Sink, OnClause, Header>(
    source: impl Read,
    parser: &mut DimacsParser<Sink, OnClause, Header>,
) -> Result<(), DimacsParseError>
where
    OnClause: FnMut(&mut Sink, &[NonZeroI32], &Header),
    Sink: DimacsSink,
    Header: DimacsHeader,
{
    let mut reader = BufReader::new(source);

    loop {
        let num_bytes = {
            let data = reader.fill_buf()?;

            if data.is_empty() {
                return Ok(());
            }

            parser.parse_chunk(data)?;
            data.len()
        };

        reader.consume(num_bytes);
    }
}

/// The core DIMACS parser. New clauses are not directly added to the sink, but rather a callback
/// `OnClause` is used. This allows the WCNF and CNF parser to reuse the same logic.
struct DimacsParser<Sink: DimacsSink, OnClause, Header> {
    sink_constructor_args: Option<Sink::ConstructorArgs>,
    formula: Option<(Sink, Header)>,
    buffer: String,
    clause: Vec<NonZeroI32>,
    state: ParseState,
    on_clause: OnClause,
    parsed_clauses: usize,
}

enum ParseState {
    StartLine,
    Header,
    Comment,
    Literal,
    NegativeLiteral,
    Clause,
}

impl<Sink, OnClause, Header> DimacsParser<Sink, OnClause, Header>
where
    OnClause: FnMut(&mut Sink, &[NonZeroI32], &Header),
    Sink: DimacsSink,
    Header: DimacsHeader,
{
    fn new(sink_constructor_args: Sink::ConstructorArgs, on_clause: OnClause) -> Self {
        DimacsParser {
            sink_constructor_args: Some(sink_constructor_args),
            formula: None,
            buffer: String::new(),
            clause: vec![],
            state: ParseState::StartLine,
            on_clause,
            parsed_clauses: 0,
        }
    }

    /// Parse the next chunk of bytes. This may start in the middle of parsing a clause or file
    /// header, and may end in such a state as well.
    fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), DimacsParseError> {
        for &byte in chunk {
            match self.state {
                ParseState::StartLine => match byte {
                    b if b.is_ascii_whitespace() => {}

                    b'p' => {
                        self.state = ParseState::Header;
                        self.buffer.clear();
                        self.buffer.push('p');
                    }

                    b'c' => self.state = ParseState::Comment,

                    b'1'..=b'9' => self.start_literal(byte, true),

                    // an empty clause, or the terminator of a clause spanning several lines
                    b'0' => self.finish_clause()?,

                    b'-' => self.start_literal(byte, false),

                    b => return Err(DimacsParseError::UnexpectedCharacter(b as char)),
                },

                ParseState::Header => match byte {
                    b'\n' => {
                        self.init_formula()?;
                        self.state = ParseState::StartLine;
                    }

                    b => self.buffer.push(b as char),
                },

                ParseState::Comment => {
                    if byte == b'\n' {
                        self.state = ParseState::StartLine;
                    }
                }

                ParseState::Literal => match byte {
                    b if b.is_ascii_whitespace() => {
                        self.finish_literal()?;
                        if b == b'\n' {
                            self.state = ParseState::StartLine;
                        }
                    }

                    b'0'..=b'9' => self.buffer.push(byte as char),

                    b => return Err(DimacsParseError::UnexpectedCharacter(b as char)),
                },

                ParseState::NegativeLiteral => match byte {
                    b'1'..=b'9' => {
                        self.buffer.push(byte as char);
                        self.state = ParseState::Literal;
                    }

                    b => return Err(DimacsParseError::UnexpectedCharacter(b as char)),
                },

                ParseState::Clause => match byte {
                    b'0' => self.finish_clause()?,

                    // A new-line does not terminate the clause. The clause buffer is kept, and
                    // parsing continues as soon as the next literal is encountered.
                    b'\n' => self.state = ParseState::StartLine,
                    b if b.is_ascii_whitespace() => {}

                    b'1'..=b'9' => self.start_literal(byte, true),
                    b'-' => self.start_literal(byte, false),

                    b => return Err(DimacsParseError::UnexpectedCharacter(b as char)),
                },
            }
        }

        Ok(())
    }

    fn start_literal(&mut self, byte: u8, is_positive: bool) {
        self.state = if is_positive {
            ParseState::Literal
        } else {
            ParseState::NegativeLiteral
        };

        self.buffer.clear();
        self.buffer.push(byte as char);
    }

    fn complete(mut self) -> Result<(Sink::Formula, Header), DimacsParseError> {
        // the last literal may be followed directly by the end of the input
        if let ParseState::Literal = self.state {
            self.finish_literal()?;
        }

        let (sink, header) = self.formula.ok_or(DimacsParseError::MissingHeader)?;

        if !self.clause.is_empty() {
            Err(DimacsParseError::UnterminatedClause)
        } else if header.num_clauses() != self.parsed_clauses {
            Err(DimacsParseError::IncorrectClauseCount {
                expected: header.num_clauses(),
                parsed: self.parsed_clauses,
            })
        } else {
            Ok((sink.into_formula(), header))
        }
    }

    fn init_formula(&mut self) -> Result<(), DimacsParseError> {
        let header = self.buffer.trim().parse::<Header>()?;

        let sink = Sink::empty(
            self.sink_constructor_args
                .take()
                .ok_or(DimacsParseError::DuplicateHeader)?,
            header.num_variables(),
        );
        self.formula = Some((sink, header));

        Ok(())
    }

    fn finish_literal(&mut self) -> Result<(), DimacsParseError> {
        let literal = self
            .buffer
            .parse::<i32>()
            .ok()
            .and_then(NonZeroI32::new)
            .ok_or_else(|| DimacsParseError::InvalidLiteral(self.buffer.clone()))?;

        self.clause.push(literal);
        self.state = ParseState::Clause;

        Ok(())
    }

    fn finish_clause(&mut self) -> Result<(), DimacsParseError> {
        let (sink, header) = self
            .formula
            .as_mut()
            .ok_or(DimacsParseError::MissingHeader)?;

        self.parsed_clauses += 1;
        (self.on_clause)(sink, &self.clause, header);
        self.clause.clear();

        Ok(())
    }
}

trait DimacsHeader: FromStr<Err = DimacsParseError> {
    fn num_variables(&self) -> usize;
    fn num_clauses(&self) -> usize;
}

struct WCNFHeader {
    num_variables: usize,
    num_clauses: usize,
    top_weight: u64,
}

struct CNFHeader {
    num_variables: usize,
    num_clauses: usize,
}

impl FromStr for WCNFHeader {
    type Err = DimacsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = header_components(s, "wcnf")?;

        let num_variables = next_header_component::<usize>(&mut components, s)?;
        let num_clauses = next_header_component::<usize>(&mut components, s)?;
        let top_weight = next_header_component::<u64>(&mut components, s)?;

        if components.next().is_some() {
            return Err(DimacsParseError::InvalidHeader(s.to_owned()));
        }

        Ok(Self {
            num_variables,
            num_clauses,
            top_weight,
        })
    }
}

impl FromStr for CNFHeader {
    type Err = DimacsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = header_components(s, "cnf")?;

        let num_variables = next_header_component::<usize>(&mut components, s)?;
        let num_clauses = next_header_component::<usize>(&mut components, s)?;

        if components.next().is_some() {
            return Err(DimacsParseError::InvalidHeader(s.to_owned()));
        }

        Ok(Self {
            num_variables,
            num_clauses,
        })
    }
}

impl DimacsHeader for CNFHeader {
    fn num_variables(&self) -> usize {
        self.num_variables
    }

    fn num_clauses(&self) -> usize {
        self.num_clauses
    }
}

impl DimacsHeader for WCNFHeader {
    fn num_variables(&self) -> usize {
        self.num_variables
    }

    fn num_clauses(&self) -> usize {
        self.num_clauses
    }
}

/// The components of a header `p <format> ...` after the format.
fn header_components<'a>(
    header: &'a str,
    format: &str,
) -> Result<impl Iterator<Item = &'a str>, DimacsParseError> {
    let mut components = header.split_ascii_whitespace();

    if components.next() != Some("p") || components.next() != Some(format) {
        return Err(DimacsParseError::InvalidHeader(header.to_owned()));
    }

    Ok(components)
}

fn next_header_component<'a, Num: FromStr>(
    components: &mut impl Iterator<Item = &'a str>,
    header: &str,
) -> Result<Num, DimacsParseError> {
    components
        .next()
        .ok_or_else(|| DimacsParseError::InvalidHeader(header.to_owned()))?
        .parse::<Num>()
        .map_err(|_| DimacsParseError::InvalidHeader(header.to_owned()))
}

fn map_clause(clause: &[NonZeroI32]) -> Vec<Literal> {
    clause.iter().map(|&code| Literal::from_dimacs(code)).collect()
}

fn max_variable(clause: &[NonZeroI32]) -> u32 {
    clause
        .iter()
        .map(|code| code.unsigned_abs().get())
        .max()
        .unwrap_or(0)
}

/// A dimacs sink that creates a fresh [`SatSolver`] when reading DIMACS files. The DIMACS
/// variables keep their index in the solver.
#[derive(Debug)]
pub struct SolverDimacsSink {
    solver: SatSolver,
}

impl DimacsSink for SolverDimacsSink {
    type ConstructorArgs = SatSolverOptions;
    type Formula = SatSolver;

    fn empty(args: Self::ConstructorArgs, num_variables: usize) -> Self {
        let mut solver = SatSolver::new(args);
        solver.ensure_num_variables(num_variables as u32);

        SolverDimacsSink { solver }
    }

    fn add_hard_clause(&mut self, clause: &[NonZeroI32]) {
        self.solver.ensure_num_variables(max_variable(clause));
        // an infeasible formula is reported when solving
        let _ = self.solver.add_clause(map_clause(clause));
    }

    fn add_soft_clause(&mut self, clause: &[NonZeroI32]) -> SoftClauseAddition {
        self.solver.ensure_num_variables(max_variable(clause));

        let mut clause = preprocess_clause(map_clause(clause), self.solver.assignments());

        if clause.is_empty() {
            SoftClauseAddition::RootViolated
        } else if clause
            .iter()
            .any(|&literal| self.solver.get_literal_value_at_root(literal) == Some(true))
        {
            SoftClauseAddition::RootSatisfied
        } else if clause.len() == 1 {
            // a unit soft clause is violated exactly when its negation holds, so no selector
            // variable is needed
            SoftClauseAddition::Added(!clause[0])
        } else {
            let soft_literal = Literal::new(self.solver.create_new_propositional_variable(), true);

            clause.push(soft_literal);
            let _ = self.solver.add_clause(clause);

            SoftClauseAddition::Added(soft_literal)
        }
    }

    fn into_formula(self) -> Self::Formula {
        self.solver
    }
}

/// Collects the clauses, e.g. to verify a solution against them.
impl DimacsSink for VectorClauseDatabase {
    type ConstructorArgs = ();
    type Formula = VectorClauseDatabase;

    fn empty(_: Self::ConstructorArgs, num_variables: usize) -> Self {
        VectorClauseDatabase::new(num_variables as u32)
    }

    fn add_hard_clause(&mut self, clause: &[NonZeroI32]) {
        self.ensure_num_variables(max_variable(clause));
        let _ = self.add_clause(map_clause(clause));
    }

    fn add_soft_clause(&mut self, clause: &[NonZeroI32]) -> SoftClauseAddition {
        self.ensure_num_variables(max_variable(clause));
        let mut clause = map_clause(clause);

        if let [literal] = clause[..] {
            return SoftClauseAddition::Added(!literal);
        }

        let soft_literal = self.new_literal();
        clause.push(soft_literal);
        let _ = self.add_clause(clause);

        SoftClauseAddition::Added(soft_literal)
    }

    fn into_formula(self) -> Self::Formula {
        self
    }
}
