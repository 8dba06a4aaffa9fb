use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use log::debug;
use log::info;
use pb2cnf::basic_types::Solution;
use pb2cnf::clause_databases::SatSolverClauseDatabase;
use pb2cnf::routing::RoutingInstance;
use pb2cnf::routing::RoutingModel;
use pb2cnf::routing::RoutingSolution;
use pb2cnf::termination::TerminationCondition;

use crate::file_format::create_output;
use crate::result::Pb2CnfResult;
use crate::solve::optimise;
use crate::solve::satisfy;
use crate::SolverArgs;

#[derive(Debug, Args)]
pub(crate) struct RouteArgs {
    /// The routing instance: 'n m', the number of pairs 'p', and 'p' lines 'x1 y1 x2 y2'. Read
    /// from stdin when no path is given.
    instance_path: Option<PathBuf>,

    /// An upper bound on the total number of cells used by the paths.
    #[arg(long = "max-cells")]
    max_cells: Option<u64>,

    /// Stop at the first routing instead of minimising the number of used cells.
    #[arg(long = "satisfy", default_value_t = false)]
    satisfy: bool,

    /// Also write the pseudo-Boolean model to this path in the OPB format.
    #[arg(long = "opb-out")]
    opb_path: Option<PathBuf>,
}

pub(crate) fn route(
    args: RouteArgs,
    options: &SolverArgs,
    termination: &mut impl TerminationCondition,
) -> Pb2CnfResult<()> {
    let instance = match &args.instance_path {
        Some(path) => RoutingInstance::parse(std::fs::File::open(path)?)?,
        None => RoutingInstance::parse(std::io::stdin().lock())?,
    };

    println!("c input grid");
    for line in instance.to_string().lines() {
        println!("c {line}");
    }
    let min_num_cells = instance.min_num_cells();
    info!(
        "At least {min_num_cells} cells are needed to connect the {} pairs",
        instance.pairs().len()
    );

    let model = RoutingModel::new(&instance, args.max_cells);
    if let Some(opb_path) = &args.opb_path {
        let mut writer = create_output(opb_path)?;
        model.write_opb(&mut writer)?;
        writer.flush()?;
    }

    let mut clause_database = SatSolverClauseDatabase::new(options.solver_options());
    if let Err(error) = model.encode(options.pb2cnf(), &mut clause_database) {
        debug!("Encoding the routing model failed: {error}");
        println!("s UNSATISFIABLE");
        return Ok(());
    }
    let mut solver = clause_database.into_solver();

    let solution = if args.satisfy {
        let result = satisfy(&mut solver, termination);
        solver.log_statistics();
        result
    } else {
        // every used cell adds one to the objective
        let lower_bound = i64::try_from(min_num_cells).ok();
        optimise(
            options,
            termination,
            solver,
            model.objective().clone(),
            lower_bound,
        )
        .map(|(solution, _)| solution)
    };

    if let Some(solution) = solution {
        print_routing(&instance, &solution)?;
    }

    Ok(())
}

/// Without optimisation a solution may contain cycles next to the paths, only the paths are
/// printed.
fn print_routing(instance: &RoutingInstance, solution: &Solution) -> Pb2CnfResult<()> {
    let routing = RoutingSolution::from_solution(instance, solution).trace_paths(instance)?;
    routing.check(instance)?;

    info!("The paths use {} cells", routing.num_used_cells());
    print!("{routing}");

    Ok(())
}
