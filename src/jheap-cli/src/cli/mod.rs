//! CLI argument definitions for jheap
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod scan;

pub use self::core::{Cli, Commands};
pub use self::scan::ScanArgs;
