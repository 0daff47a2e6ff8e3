//! Shared arguments for subcommands that run a component-tree scan

use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ScanArgs {
    /// Path to the heap dump (.hprof, optionally gzipped)
    pub input: PathBuf,

    /// Class whose subtypes are scanned (uses configured default if not provided)
    #[arg(short, long)]
    pub class: Option<String>,

    /// Parent field name, tried in order; repeat for fallbacks
    #[arg(long = "parent-field")]
    pub parent_fields: Vec<String>,

    /// Field rendered as "id:" in tree output
    #[arg(long)]
    pub id_field: Option<String>,

    /// Dotted field path rendered as "el:" in tree output (e.g. "txt.literal")
    #[arg(long)]
    pub label: Option<String>,
}
