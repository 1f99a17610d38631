//! kernsync - keep a WSL2 kernel image in sync with a GitHub release

use std::process::ExitCode;

use clap::Parser;

use kernsync_cli::cli::Cli;
use kernsync_cli::domain::{ConfigError, SyncError};
use kernsync_cli::infra::fs::{Interrupt, install_interrupt_handler};
use kernsync_cli::logging;
use kernsync_cli::output::json::format_error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let interrupt = Interrupt::default();
    if let Err(e) = install_interrupt_handler(interrupt.clone()) {
        tracing::warn!(error = %e, "Ctrl-C will not clean up partial downloads");
    }

    let json = cli.json;
    match cli.run(interrupt) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, json);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &anyhow::Error, json: bool) {
    // `SyncError` messages already embed their cause.
    let (message, code) = if let Some(e) = err.downcast_ref::<SyncError>() {
        (e.to_string(), e.code())
    } else if err.downcast_ref::<ConfigError>().is_some() {
        (format!("{err:#}"), "INVALID_CONFIG")
    } else {
        (format!("{err:#}"), "ERROR")
    };
    if !json {
        eprintln!("Error: {message}");
        return;
    }
    match format_error(&message, code) {
        Ok(out) => println!("{out}"),
        Err(_) => eprintln!("Error: {message}"),
    }
}
