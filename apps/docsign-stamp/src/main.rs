//! docsign-stamp
//!
//! Command-line front end for the signature placement engine:
//!
//! - `sign` stamps a drawn signature onto a page and writes audit records
//! - `verify` re-hashes a signed PDF against its audit records
//! - `inspect` lists page sizes, useful for choosing a viewport
//!
//! Limits come from an optional TOML file and `DOCSIGN_*` variables,
//! which may also be set in a `.env` file.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
mod commands;

use args::{Args, Command};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Sign(sign) => commands::run_sign(sign),
        Command::Verify(verify) => commands::run_verify(verify),
        Command::Inspect(inspect) => commands::run_inspect(inspect),
    }
}
