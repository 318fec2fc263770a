//! Usecheck CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use usecheck::cli::{self, Cli, Commands, EXIT_ERROR};

/// Log filter variable; `--verbose` raises the default to debug.
const LOG_ENV: &str = "USECHECK_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose { "usecheck=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Lint(args) if args.verbose);
    init_logging(verbose);

    let result = match &cli.command {
        Commands::Lint(args) => cli::run_lint(args),
        Commands::Init(args) => cli::run_init(args),
        Commands::Rules(args) => cli::run_rules(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
