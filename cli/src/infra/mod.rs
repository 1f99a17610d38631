//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the GitHub release API,
//! kernel image staging on disk, and the settings and `.wslconfig` files.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod fs;
pub mod github;
pub mod wslconfig;
