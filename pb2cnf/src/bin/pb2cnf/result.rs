use pb2cnf::parsers::dimacs::DimacsParseError;
use pb2cnf::parsers::opb::OpbParseError;
use pb2cnf::routing::RoutingError;
use thiserror::Error;

pub(crate) type Pb2CnfResult<T> = Result<T, Pb2CnfError>;

#[derive(Error, Debug)]
pub(crate) enum Pb2CnfError {
    #[error("Hard constraints violated")]
    InconsistentSolution,
    #[error("Reported objective value {reported} differs from the actual value {actual}")]
    InconsistentObjective { reported: i64, actual: i64 },
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("The instance {0} is not a .cnf, .wcnf or .opb file (optionally gzipped)")]
    InvalidInstanceFile(String),
    #[cfg_attr(
        feature = "gzip",
        allow(dead_code, reason = "only constructed without the gzip feature")
    )]
    #[error("Reading and writing gzipped files requires the 'gzip' feature")]
    GzipDisabled,
    #[error("The dimacs file was invalid: {0}")]
    InvalidDimacs(#[from] DimacsParseError),
    #[error("The opb file was invalid: {0}")]
    InvalidOpb(#[from] OpbParseError),
    #[error("Routing failed: {0}")]
    Routing(#[from] RoutingError),
}

impl Pb2CnfError {
    pub(crate) fn invalid_instance(path: impl std::fmt::Display) -> Pb2CnfError {
        Pb2CnfError::InvalidInstanceFile(path.to_string())
    }
}
