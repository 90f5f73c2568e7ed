use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use trend2csv::ConvertError;
use trend2csv::cli::{Cli, Command};

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Watch(args)) => {
            let config = args.config()?;
            trend2csv::watch::watch(&config)?;
        }
        None => {
            let summary = cli.convert.request().run()?;
            println!("CSV file written to {}", summary.output.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse CLI flags
    let cli = Cli::parse();
    info!(
        "JSON trend export to CSV converter v{}",
        env!("CARGO_PKG_VERSION")
    );

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            if err
                .downcast_ref::<ConvertError>()
                .is_some_and(ConvertError::wants_usage)
            {
                eprintln!();
                let _ = Cli::command().print_help();
            }
            ExitCode::FAILURE
        }
    }
}
