//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod release;
pub mod sync;
pub mod wslconfig;

pub use config::{KernsyncConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, SyncError};
pub use fingerprint::Fingerprint;
pub use release::{Asset, PrereleasePolicy, Release, ReleaseSelector, ReleaseSummary, RepoId};
pub use sync::{ConfigUpdate, SyncDecision, SyncOutcome, SyncReport};
