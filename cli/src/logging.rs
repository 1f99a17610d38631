//! Diagnostic logging via `tracing`, always written to stderr.

use tracing_subscriber::EnvFilter;

/// Env var holding a `tracing` filter directive, e.g. `kernsync_cli=trace`.
pub const LOG_ENV: &str = "KERNSYNC_LOG";

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,kernsync_cli=debug";

/// Pick the filter directive: `KERNSYNC_LOG`, then `RUST_LOG`, then the
/// default for the requested verbosity.
#[must_use]
pub fn filter_directive(verbose: bool) -> String {
    [LOG_ENV, "RUST_LOG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| {
            if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }.to_string()
        })
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let directive = filter_directive(verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}
