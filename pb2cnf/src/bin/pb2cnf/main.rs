mod checker;
mod encode;
mod file_format;
mod result;
mod route;
mod solve;

use std::io::Write;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use convert_case::Case;
use log::error;
use log::info;
use log::Level;
use log::LevelFilter;
use pb2cnf::basic_types::sequence_generators::SequenceGeneratorType;
use pb2cnf::encoders::Pb2Cnf;
use pb2cnf::encoders::PseudoBooleanEncoding;
use pb2cnf::sat::LearnedClauseSortingStrategy;
use pb2cnf::sat::LearningOptions;
use pb2cnf::sat::RestartOptions;
use pb2cnf::sat::SatSolverOptions;
use pb2cnf::statistics;
use pb2cnf::termination::Combinator;
use pb2cnf::termination::OsSignal;
use pb2cnf::termination::TimeBudget;
use result::Pb2CnfResult;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: SolverArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve an instance. The file should have one of the following extensions, optionally
    /// followed by '.gz':
    ///  * '.opb' for pseudo-Boolean instances, optimised when they have an objective,
    ///  * '.cnf' for SAT instances, given in the DIMACS format,
    ///  * '.wcnf' for MaxSAT instances, given in the WDIMACS format.
    #[clap(verbatim_doc_comment)]
    Solve(solve::SolveArgs),

    /// Encode an OPB instance into DIMACS CNF, or WCNF when it has an objective.
    Encode(encode::EncodeArgs),

    /// Route pairs of points through a grid without crossings, minimising the number of used
    /// cells.
    Route(route::RouteArgs),
}

#[derive(Debug, Args)]
struct SolverArgs {
    /// The encoding used for every pseudo-Boolean constraint, including the bound on the
    /// objective during optimisation.
    #[arg(long, value_enum, default_value_t, global = true)]
    encoding: PseudoBooleanEncoding,

    /// The time budget for the solver, given in milliseconds.
    #[arg(short = 't', long = "time-limit", global = true)]
    time_limit: Option<u64>,

    /// The random seed to use for the PRNG. This influences the initial order of the variables.
    #[arg(short = 'r', long = "random-seed", default_value_t = 42, global = true)]
    random_seed: u64,

    /// Decides the sequence based on which the restarts are performed.
    /// To be used in combination with "restart-base-interval".
    #[arg(long = "restart-sequence", value_enum, default_value_t, global = true)]
    restart_sequence_generator_type: SequenceGeneratorType,

    /// The base interval length is used as a multiplier to the restart sequence.
    /// For example, constant restarts with base interval 100 means a restart is triggered every
    /// 100 conflicts.
    #[arg(long = "restart-base-interval", default_value_t = 100, global = true)]
    restart_base_interval: u64,

    /// The factor by which the geometric restart sequence grows.
    #[arg(long = "restart-geometric-coef", default_value_t = 1.5, global = true)]
    restart_geometric_coef: f64,

    /// Disables restarts altogether.
    #[arg(long = "no-restarts", default_value_t = false, global = true)]
    no_restarts: bool,

    /// Disables the minimisation of learned clauses, which removes literals that are implied by
    /// the rest of the clause.
    #[arg(long = "no-learning-minimise", default_value_t = false, global = true)]
    no_learning_minimise: bool,

    /// The number of high lbd learned clauses that are kept in the database.
    /// Learned clauses are kept based on the tiered system introduced by Chanseok Oh.
    #[arg(long = "learning-max-num-clauses", default_value_t = 4000, global = true)]
    learning_max_num_clauses: u64,

    /// Learned clauses with this threshold LBD or lower are kept permanently.
    #[arg(long = "learning-lbd-threshold", default_value_t = 5, global = true)]
    learning_lbd_threshold: u32,

    /// Decides which clauses will be removed when cleaning up the learned clauses.
    #[arg(
        long = "learning-sorting-strategy",
        value_enum,
        default_value_t,
        global = true
    )]
    learning_sorting_strategy: LearnedClauseSortingStrategy,

    /// Enables log message output from the solver
    #[arg(short = 'v', long = "verbose", default_value_t = false, global = true)]
    verbose: bool,

    /// Enables logging of statistics from the solver
    #[arg(short = 's', long = "log-statistics", default_value_t = false, global = true)]
    log_statistics: bool,

    /// If `--verbose` is enabled removes the timestamp information from the log messages
    #[arg(long = "omit-timestamp", default_value_t = false, global = true)]
    omit_timestamp: bool,

    /// If `--verbose` is enabled removes the call site information from the log messages.
    /// Call site is the file and line in it that originated the message.
    #[arg(long = "omit-call-site", default_value_t = false, global = true)]
    omit_call_site: bool,
}

impl SolverArgs {
    fn solver_options(&self) -> SatSolverOptions {
        SatSolverOptions {
            restart_options: RestartOptions {
                restarts_enabled: !self.no_restarts,
                sequence_generator_type: self.restart_sequence_generator_type,
                base_interval: self.restart_base_interval,
                geometric_coef: self.restart_geometric_coef,
            },
            learning_options: LearningOptions {
                lbd_threshold: self.learning_lbd_threshold,
                max_num_high_lbd_clauses: self.learning_max_num_clauses,
                high_lbd_sorting_strategy: self.learning_sorting_strategy,
                minimise: !self.no_learning_minimise,
                ..Default::default()
            },
            random_seed: self.random_seed,
        }
    }

    fn pb2cnf(&self) -> Pb2Cnf {
        Pb2Cnf::new(self.encoding)
    }

    /// Stops on SIGINT/SIGTERM, or when the time limit runs out.
    fn termination(&self) -> std::io::Result<Combinator<OsSignal, Option<TimeBudget>>> {
        let time_budget = self
            .time_limit
            .map(|time_limit| TimeBudget::starting_now(Duration::from_millis(time_limit)));

        Ok(Combinator::new(OsSignal::install()?, time_budget))
    }
}

fn configure_logging(
    verbose: bool,
    log_statistics: bool,
    omit_timestamp: bool,
    omit_call_site: bool,
) {
    statistics::configure(log_statistics, "c STAT", Some(Case::Snake));
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "c ")?;
            if record.level() != Level::Info && !omit_timestamp {
                write!(buf, "{} ", buf.timestamp())?;
            }
            write!(buf, "{} ", record.level())?;
            if record.level() != Level::Info && !omit_call_site {
                write!(
                    buf,
                    "[{}:{}] ",
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0)
                )?;
            }
            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Pb2CnfResult<()> {
    let cli = Cli::parse();
    let options = &cli.options;

    configure_logging(
        options.verbose,
        options.log_statistics,
        options.omit_timestamp,
        options.omit_call_site,
    );

    let mut termination = options.termination()?;

    match cli.command {
        Command::Solve(args) => solve::solve(args, options, &mut termination),
        Command::Encode(args) => encode::encode(args, options.pb2cnf()),
        Command::Route(args) => route::route(args, options, &mut termination),
    }
}

