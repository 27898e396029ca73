#![warn(missing_docs)]

//! Entry point for the `notchdesk` binary.

mod cli;
mod commands;
mod error;
mod host;
mod watch;

use std::{io, process, sync::Arc};

use clap::Parser;
use prefs::{JsonFileStore, resolve_prefs_path};
use tracing::{debug, error};

use crate::{
    cli::{Cli, Commands},
    commands::Context,
    error::Result,
    host::MacSpaceHost,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli {
        log,
        prefs,
        command,
    } = Cli::parse();
    logging::init(&log);

    let path = resolve_prefs_path(prefs.as_deref());
    debug!(path = %path.display(), "using preferences");
    let store = Arc::new(JsonFileStore::open(path)?);

    if let Commands::Watch(args) = &command {
        return watch::run(store, args);
    }

    let ctx = Context {
        host: Arc::new(MacSpaceHost),
        store,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Commands::Current => commands::current(&ctx, &mut out),
        Commands::List => commands::list(&ctx, &mut out),
        Commands::Set(args) => commands::set(&ctx, &args, &mut out),
        Commands::Remove { space } => commands::remove(&ctx, space, &mut out),
        Commands::Settings(args) => commands::settings(&ctx, &args, &mut out),
        Commands::Watch(_) => Ok(()),
    }
}
