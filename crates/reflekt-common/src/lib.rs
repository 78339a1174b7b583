//! Common utilities for the reflekt stylesheet tools.
//!
//! This crate provides shared infrastructure used by the parser and its
//! command-line front end:
//! - **Warning System** - colored, deduplicated terminal output for
//!   recoverable stylesheet problems

pub mod warning;
