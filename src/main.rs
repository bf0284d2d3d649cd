use clap::Parser;
use colored::*;
use iris::cli::{Cli, Commands};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize logging with IRIS_LOG environment variable support;
    // repeated --verbose flags override the default level.
    let log_level = match cli.verbose {
        0 => std::env::var("IRIS_LOG").unwrap_or_else(|_| "info".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        // Use appropriate exit codes based on error type
        let exit_code = match e.downcast_ref::<iris::IrisError>() {
            Some(iris::IrisError::InvalidInput(_)) => 2,
            Some(iris::IrisError::Io(_)) => 3,
            Some(iris::IrisError::Parse(_)) => 4,
            Some(iris::IrisError::Status(_)) | Some(iris::IrisError::Network(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Align(args) => iris::cli::commands::align::run(args),
        Commands::Map(args) => iris::cli::commands::map::run(args),
        Commands::Releases(args) => iris::cli::commands::releases::run(args),
        Commands::Databases(args) => iris::cli::commands::databases::run(args),
    }
}
