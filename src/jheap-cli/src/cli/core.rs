//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::scan::ScanArgs;

#[derive(Parser)]
#[command(name = "jheap")]
#[command(about = "JVM heap dump analyzer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Component-tree summary (roots, totals, grouped root values)
    #[command(visible_alias = "s")]
    Summary {
        #[command(flatten)]
        scan: ScanArgs,

        /// Only report groups with strictly more members than this
        #[arg(long)]
        group_threshold: Option<u64>,

        /// Truncate value previews to this many characters
        #[arg(long)]
        value_limit: Option<usize>,

        /// Order groups by aggregated size instead of population
        #[arg(long)]
        by_size: bool,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print per-root histograms and the first large component tree
    #[command(visible_alias = "t")]
    Tree {
        #[command(flatten)]
        scan: ScanArgs,

        /// Only print trees for clusters with more nodes than this
        #[arg(long)]
        cluster_threshold: Option<u64>,

        /// Print every qualifying tree instead of stopping after the first
        #[arg(long)]
        all: bool,

        /// Rows in each per-root histogram
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// List classes in the dump
    #[command(visible_alias = "c")]
    Classes {
        /// Path to the heap dump
        input: PathBuf,

        /// Only classes whose name contains this substring
        #[arg(short, long)]
        filter: Option<String>,

        /// Count instances per class
        #[arg(long)]
        counts: bool,

        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Whole-heap histogram by class
    Histogram {
        /// Path to the heap dump
        input: PathBuf,

        /// Number of rows to print
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Emit the rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print field values of one instance
    #[command(visible_alias = "f")]
    Fields {
        /// Path to the heap dump
        input: PathBuf,

        /// Object id, decimal or 0x-prefixed hex (defaults to the first
        /// instance of the target class)
        #[arg(long)]
        object_id: Option<String>,

        /// Target class when no object id is given
        #[arg(short, long)]
        class: Option<String>,
    },

    /// Show dump header and index statistics
    Info {
        /// Path to the heap dump
        input: PathBuf,
    },

    /// Configure default settings
    Configure {
        /// Set the default target class
        #[arg(long)]
        target_class: Option<String>,

        /// Set the default parent fields (comma separated)
        #[arg(long)]
        parent_fields: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
