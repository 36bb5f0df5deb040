//! Governance sweep CLI
//!
//! Runs a parameter grid of governance simulations and writes JSONL results.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use sweep::{default_sweep_toml, OutputWriter, SweepConfig, SweepError, SweepPlan, SweepRunner};

#[derive(Parser, Debug)]
#[command(name = "gov-sweep")]
#[command(about = "Run parameter sweeps of the network governance simulation", long_about = None)]
struct Args {
    /// Sweep configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for runs.jsonl, steps.jsonl and summary.json
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Seeds per grid point, overriding the config file
    #[arg(short, long)]
    seeds: Option<u64>,

    /// First seed, overriding the config file
    #[arg(long)]
    base_seed: Option<u64>,

    /// Worker threads, overriding the config file
    #[arg(short, long)]
    threads: Option<usize>,

    /// Also write one row per timestep
    #[arg(long)]
    record_steps: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the default sweep configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if args.print_default_config {
        print!("{}", default_sweep_toml());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SweepError> {
    let mut config = match &args.config {
        Some(path) => SweepConfig::from_file(path)?,
        None => SweepConfig::from_str(&default_sweep_toml())?,
    };
    if let Some(seeds) = args.seeds {
        config.sweep.seeds = seeds;
    }
    if let Some(base_seed) = args.base_seed {
        config.sweep.base_seed = base_seed;
    }
    if args.threads.is_some() {
        config.sweep.threads = args.threads;
    }
    if args.record_steps {
        config.sweep.record_steps = true;
    }

    let plan = SweepPlan::from_config(&config)?;
    let report = SweepRunner::new(plan)
        .with_threads(config.sweep.threads)
        .run()?;

    let mut writer = OutputWriter::new(&args.output_dir, config.sweep.record_steps)?;
    writer.write_report(&report)?;

    for (label, summary) in report.summaries() {
        info!(
            label = %label,
            runs = summary.runs,
            convergence_rate = summary.convergence_rate,
            acceptance_rate = summary.acceptance_rate,
            mean_final_fraction_satisfied = ?summary.mean_final_fraction_satisfied,
            "point summary"
        );
    }
    info!(
        runs = writer.runs_written(),
        output = %writer.output_dir().display(),
        "wrote sweep output"
    );
    Ok(())
}
