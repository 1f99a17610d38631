//! Unit tests for kernsync CLI
//!
//! These tests use in-memory release sources and temp directories and run
//! fast without network access.

mod mocks;
mod resolve_service;
