//! Command-line interface definitions for notchdesk.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `notchdesk` binary.
#[derive(Parser, Debug)]
#[command(
    name = "notchdesk",
    about = "Name your macOS Spaces and follow desktop switches",
    version
)]
pub struct Cli {
    /// Logging controls shared across notchdesk binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Preferences file (defaults to ~/.notchdesk/prefs.json)
    #[arg(long, value_name = "PATH", global = true)]
    pub prefs: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the active Space and its name.
    Current,
    /// List named Spaces.
    List,
    /// Name a Space.
    Set(SetArgs),
    /// Remove the name of a Space.
    Remove {
        /// Space identifier.
        #[arg(value_name = "SPACE_ID")]
        space: u64,
    },
    /// Show or change desktop-name settings.
    Settings(SettingsArgs),
    /// Follow Space switches and print desktop events until interrupted.
    Watch(WatchArgs),
}

/// Arguments for the `set` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    /// Space to name; defaults to the active Space.
    #[arg(long, value_name = "SPACE_ID")]
    pub space: Option<u64>,

    /// New name.
    pub name: String,
}

/// Arguments for the `settings` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Show the desktop name in the notch.
    #[arg(long, value_name = "BOOL")]
    pub show_name: Option<bool>,

    /// Briefly expand the notch when switching desktops.
    #[arg(long, value_name = "BOOL")]
    pub auto_expand: Option<bool>,

    /// Seconds before an auto-expanded notch collapses (0.5-5.0, 0.5 steps).
    #[arg(long, value_name = "SECS")]
    pub delay: Option<f64>,
}

impl SettingsArgs {
    /// True if any setting is being changed.
    pub fn has_changes(&self) -> bool {
        self.show_name.is_some() || self.auto_expand.is_some() || self.delay.is_some()
    }
}

/// Arguments for the `watch` subcommand.
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Treat the display as notched, enabling auto-expand signals.
    #[arg(long)]
    pub notched: bool,
}
