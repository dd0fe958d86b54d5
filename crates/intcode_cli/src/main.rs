use clap::{Parser, Subcommand};
use colored::Colorize;
use intcode::{VmConfig, VmError};
use std::io;
use std::process;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;

/// Standardized exit codes for CLI.
/// 0 = OK, 2 = input/parse error, 3 = decode error, 4 = runtime error, 1 = other.
const EXIT_OTHER: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_DECODE: i32 = 3;
const EXIT_RUNTIME: i32 = 4;

#[derive(Parser)]
#[command(name = "intcode", version, about = "Intcode computer — run, restore, search, diagnose")]
struct Cli {
    /// Maximum instructions per run (unlimited when unset)
    #[arg(long, env = "INTCODE_FUEL", global = true)]
    fuel: Option<u64>,

    /// Log at debug level; RUST_LOG directives still apply
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program once and print its result
    Run {
        /// Path to program text
        file: String,
        /// Value supplied to every input instruction
        #[arg(long, allow_hyphen_values = true)]
        input: Option<i64>,
        /// Print a JSON run report instead of diagnostics
        #[arg(long)]
        json: bool,
    },
    /// Patch noun/verb into addresses 1 and 2, run, print address 0
    Restore {
        file: String,
        #[arg(long, default_value_t = 12)]
        noun: i64,
        #[arg(long, default_value_t = 2)]
        verb: i64,
    },
    /// Search noun/verb in 0..100 for a target result, print 100*noun+verb
    Search {
        file: String,
        #[arg(long, default_value_t = 19_690_720)]
        target: i64,
    },
    /// One independent run per diagnostic id
    Diagnose {
        file: String,
        /// Diagnostic id (repeatable)
        #[arg(long = "id", default_values_t = [1, 5])]
        ids: Vec<i64>,
    },
    /// Print every executed instruction
    Trace {
        file: String,
        #[arg(long, allow_hyphen_values = true)]
        input: Option<i64>,
    },
}

/// Map the root VM error kind to an exit code.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<VmError>() {
        Some(VmError::Parse(_)) => EXIT_INPUT,
        Some(VmError::Decode(_)) => EXIT_DECODE,
        Some(VmError::Runtime(_)) => EXIT_RUNTIME,
        None if err.downcast_ref::<std::io::Error>().is_some() => EXIT_INPUT,
        None => EXIT_OTHER,
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn dispatch(command: Commands, cfg: &VmConfig) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Run { file, input, json } => {
            commands::run(cfg, commands::load(&file)?, input, json, &mut out)
        }
        Commands::Restore { file, noun, verb } => {
            commands::restore(cfg, &commands::load(&file)?, noun, verb, &mut out)
        }
        Commands::Search { file, target } => {
            commands::search(cfg, &commands::load(&file)?, target, &mut out)
        }
        Commands::Diagnose { file, ids } => {
            commands::diagnose(cfg, &commands::load(&file)?, &ids, &mut out)
        }
        Commands::Trace { file, input } => {
            commands::trace(cfg, commands::load(&file)?, input, &mut out)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cfg = VmConfig { fuel_limit: cli.fuel };

    let result = dispatch(cli.command, &cfg);

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(exit_code_for(&e));
    }
}
