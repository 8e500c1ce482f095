//! Shared test utilities for the wikisync workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`docs`]: [`docs::TestDocs`] builder for source directories
//! - [`scenarios`]: ready-made source trees used across crate test suites

pub mod docs;
pub mod scenarios;
