//! The OPB format of the pseudo-Boolean competitions.
//!
//! ```text
//! * #variable= 3 #constraint= 2
//! min: +2 x1 -1 x2 +1 ~x3;
//! +1 x1 +1 x2 +1 x3 >= 2;
//! -1 x1 +2 ~x2 = 1;
//! ```
//!
//! [`parse_opb`] reads a file and reports the objective and every constraint to an [`OpbSink`].
//! [`OpbInstance`] simply collects them, [`EncodingOpbSink`] encodes every constraint into a
//! clause database while parsing. [`write_opb`] goes the other way.

mod encoding_sink;
mod instance;
mod parser;
mod writer;

pub use encoding_sink::EncodedOpb;
pub use encoding_sink::EncodingOpbSink;
pub use encoding_sink::OpbVariableMap;
pub use instance::OpbInstance;
pub use parser::parse_opb;
pub use parser::OpbHeader;
pub use parser::OpbParseError;
pub use parser::OpbSink;
pub use writer::write_opb;
