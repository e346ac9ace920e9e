//! Command-line driver for the dependency solver. Deliberately thin:
//! everything it prints comes straight out of `solv-core`'s public API.
//! Uses a one-file-per-subcommand layout
//! (`Args` struct + `execute()` function per module), trimmed to the three
//! entry points this crate needs exercised: loading a testcase file and
//! running `solve`, `problems`, or `why`.

mod commands;
mod loader;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "solv")]
#[command(about = "Package dependency resolution over testcase fixtures")]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a testcase file's jobs and print the resulting transaction
    Solve(commands::solve::SolveArgs),

    /// Resolve a testcase file's jobs and report why it is unsatisfiable
    Problems(commands::problems::ProblemsArgs),

    /// Show which installed or candidate packages depend on a given name
    Why(commands::why::WhyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Solve(args) => commands::solve::execute(args),
        Commands::Problems(args) => commands::problems::execute(args),
        Commands::Why(args) => commands::why::execute(args),
    };

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("{} {err:#}", console::style("error:").red().bold());
            ExitCode::from(1)
        }
    }
}
