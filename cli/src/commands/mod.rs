//! Command implementations

pub mod config;
pub mod list;
pub mod sync;
pub mod version;
