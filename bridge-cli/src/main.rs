//! # portbridge
//!
//! Drive portbridge operations from a shell, with the same dispatch path
//! the Dart library uses. Each call prints the response envelope that
//! would have been posted to the port.
//!
//! ## Commands
//!
//! - `call`: Run one operation and print its envelope
//! - `operations`: List operations and their arguments
//!
//! ## Example
//!
//! ```bash
//! # Create a remote in a file-backed store
//! portbridge --store remotes.toml call createRemote nas '{"type":"sftp","host":"10.0.0.2"}'
//!
//! # Read it back on port 7
//! portbridge --store remotes.toml call getRemoteConfig --token 7 nas
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod sink;

use commands::{call, operations};

/// Command-line driver for portbridge operations.
#[derive(Parser, Debug)]
#[command(name = "portbridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML file backing the remote store (in memory if omitted)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log dispatch details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one operation and print its response envelope
    Call {
        /// Operation name, e.g. getRemoteConfig
        operation: String,

        /// Port number the response is addressed to
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        token: i64,

        /// Pretty-print the envelope
        #[arg(long)]
        pretty: bool,

        /// Operation arguments, in order
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List operations and their arguments
    Operations,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Call {
            operation,
            token,
            pretty,
            args,
        } => {
            let envelope = call::run(cli.store.as_deref(), &operation, token, args)?;
            println!("{}", call::render(&envelope, pretty).context("Failed to render envelope")?);
            if envelope.success {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Operations => {
            operations::run();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
