//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"`
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ! {message}"`
///
/// All of them are suppressed when `ctx.quiet` or when the reporter is
/// silenced for `--json` output. The download bar only appears on a TTY.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    silent: bool,
    bar: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            silent: ctx.quiet,
            bar: RefCell::new(None),
        }
    }

    /// Suppress all output when `silent` (used for `--json`).
    #[must_use]
    pub fn silenced(mut self, silent: bool) -> Self {
        self.silent |= silent;
        self
    }

    /// Whether any output will be produced.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    fn println(&self, line: &str) {
        match self.bar.borrow().as_ref() {
            Some(pb) => pb.println(line),
            None => println!("{line}"),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if !self.silent {
            self.println(&format!("  {} {message}", "→".style(self.ctx.styles.info)));
        }
    }

    fn success(&self, message: &str) {
        if !self.silent {
            self.println(&format!("  {} {message}", "✓".style(self.ctx.styles.success)));
        }
    }

    fn warn(&self, message: &str) {
        if !self.silent {
            self.println(&format!("  {} {message}", "!".style(self.ctx.styles.warning)));
        }
    }

    fn download_started(&self, total: Option<u64>) {
        if self.silent || !self.ctx.show_progress() {
            return;
        }
        let pb = match total {
            Some(len) => progress::bar(len, "Downloading"),
            None => progress::spinner("Downloading"),
        };
        *self.bar.borrow_mut() = Some(pb);
    }

    fn download_progress(&self, bytes: u64) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.set_position(bytes);
        }
    }

    fn download_finished(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}
