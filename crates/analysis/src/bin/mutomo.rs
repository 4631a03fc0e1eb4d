//! Command line tool for running mutomo analyses

// standard library
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// mutomo crates
use mutomo_analysis::{check_file, inspect, run_file};

// external crates
use clap::{Parser, Subcommand};
use log::error;

/// Voxelised muon tomography discriminator analyses
#[derive(Parser, Debug)]
#[command(name = "mutomo", version, arg_required_else_help(true))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every analysis in a JSON configuration
    Run {
        /// Path to the configuration file
        config: PathBuf,

        /// Only check the configuration, nothing is read or written
        #[arg(long)]
        check: bool,
    },
    /// Summarise the grids and tables of a container
    Inspect {
        /// Path to a .bin or .json container
        container: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match &cli.command {
        Command::Run { config, check } => run_config(config, *check),
        Command::Inspect { container } => inspect(container).map(|text| print!("{text}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_config(path: &Path, check: bool) -> mutomo_analysis::Result<()> {
    if check {
        let n = check_file(path)?;
        log::info!("{path:?} is valid, {n} analyses");
        return Ok(());
    }
    run_file(path)?.into_result()
}

fn init_logging(cli: &Cli) {
    // info by default, -v for debug and -vv for trace
    let result = stderrlog::new()
        .modules(vec![
            module_path!(),
            "mutomo_analysis",
            "mutomo_grid",
            "mutomo_reduce",
            "mutomo_region",
        ])
        .quiet(cli.quiet)
        .verbosity(cli.verbose as usize + 2)
        .show_level(true)
        .timestamp(stderrlog::Timestamp::Off)
        .init();

    if let Err(e) = result {
        eprintln!("Unable to initialise logging: {e}");
    }
}
