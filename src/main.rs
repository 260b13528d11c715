//! Opsdeck - An operator console for multi-account cloud infrastructure.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opsdeck::cli::output;
use opsdeck::cli::{execute, Cli};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("OPSDECK_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("opsdeck=debug")
        } else {
            EnvFilter::new("opsdeck=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli.command) {
        // Format error with suggestion if available
        let error_msg = e.to_string();
        let suggestion = match &e {
            opsdeck::error::Error::Config(opsdeck::error::ConfigError::NotInitialized) => {
                Some("run: opsdeck init")
            }
            opsdeck::error::Error::Config(opsdeck::error::ConfigError::AlreadyInitialized) => {
                Some("pass --force to overwrite")
            }
            opsdeck::error::Error::Session(opsdeck::error::SessionError::InvalidRegion(_)) => {
                Some("pass a concrete region, e.g. --region us-east-1")
            }
            opsdeck::error::Error::Registry(opsdeck::error::RegistryError::NotFound(_)) => {
                Some("run: opsdeck deploy list")
            }
            _ => None,
        };

        output::error(&error_msg);
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
