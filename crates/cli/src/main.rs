mod analyze;
mod cli;
mod config;
mod error;
mod fetch;
mod mode;
mod parse;
mod publish;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use cli::Commands;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = init_tracing(cli.verbose) {
        eprintln!("failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Analyze(args) => analyze::run(args),
        Commands::Parse(args) => parse::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) -> Result<(), tracing_subscriber::filter::ParseError> {
    let directive = if verbose { "topicrank=debug" } else { "topicrank=info" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
