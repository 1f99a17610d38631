//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands;
use crate::infra::fs::Interrupt;

/// Keep a WSL2 kernel image in sync with a GitHub release
#[derive(Parser)]
#[command(
    name = "kernsync",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also set by a non-empty NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log workflow details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download the selected release and install it if it differs
    Sync(commands::sync::SyncArgs),

    /// List releases without downloading anything
    List(commands::list::ListArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn run(self, interrupt: Interrupt) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(
            &OutputFlags {
                no_color,
                quiet,
                json,
            },
            interrupt,
        );
        match command {
            Command::Sync(args) => commands::sync::run(&app, args),
            Command::List(args) => commands::list::run(&app, args),
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
