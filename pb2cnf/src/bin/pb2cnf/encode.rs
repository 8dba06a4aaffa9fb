use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use log::info;
use log::warn;
use pb2cnf::clause_databases::ClauseDatabase;
use pb2cnf::clause_databases::VectorClauseDatabase;
use pb2cnf::encoders::Pb2Cnf;
use pb2cnf::parsers::opb::parse_opb;
use pb2cnf::parsers::opb::EncodedOpb;
use pb2cnf::parsers::opb::EncodingOpbSink;

use crate::file_format::create_output;
use crate::file_format::open_instance;
use crate::file_format::FileFormat;
use crate::result::Pb2CnfError;
use crate::result::Pb2CnfResult;

#[derive(Debug, Args)]
pub(crate) struct EncodeArgs {
    /// The OPB instance to encode, optionally gzipped.
    instance_path: PathBuf,

    /// Where to write the encoding; a path ending in '.gz' is compressed. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    output_path: Option<PathBuf>,
}

pub(crate) fn encode(args: EncodeArgs, pb2cnf: Pb2Cnf) -> Pb2CnfResult<()> {
    let instance_path = args.instance_path.as_path();
    if FileFormat::from_path(instance_path) != Some(FileFormat::Opb) {
        return Err(Pb2CnfError::invalid_instance(instance_path.display()));
    }

    let EncodedOpb {
        clause_database,
        objective,
        variable_map,
        num_constraints,
    } = parse_opb::<EncodingOpbSink<VectorClauseDatabase>>(
        open_instance(instance_path)?,
        (VectorClauseDatabase::new(0), pb2cnf),
    )?;

    info!(
        "Encoded {num_constraints} constraints with the {} encoding: {} instance variables, {} \
         variables and {} clauses in total",
        pb2cnf.encoding(),
        variable_map.num_instance_variables(),
        clause_database.num_variables(),
        clause_database.num_clauses()
    );
    if clause_database.is_infeasible() {
        warn!("The instance is infeasible, the encoding contains the empty clause");
    }

    let mut writer: Box<dyn Write> = match &args.output_path {
        Some(output_path) => create_output(output_path)?,
        None => Box::new(std::io::stdout().lock()),
    };

    match objective {
        Some(objective) => clause_database.write_dimacs_wcnf(&objective, &mut writer)?,
        None => clause_database.write_dimacs_cnf(&mut writer)?,
    }
    writer.flush()?;

    Ok(())
}
