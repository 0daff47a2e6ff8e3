//! Command handlers for the jheap CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod classes;
pub mod configure;
pub mod fields;
pub mod histogram;
pub mod info;
pub mod summary;
pub mod tree;

use anyhow::{Context, Result};
use jheap::Heap;
use std::path::Path;

/// Open and index a dump, reporting progress on stderr
pub(crate) fn open_heap(path: &Path) -> Result<Heap> {
    let heap = Heap::open(path)
        .with_context(|| format!("Failed to open heap dump {}", path.display()))?;

    let stats = heap.stats();
    eprintln!(
        "Opened {} ({} MB): {} classes, {} objects",
        path.display(),
        heap.dump_len() / 1_000_000,
        stats.loaded_classes,
        stats.instances + stats.object_arrays + stats.primitive_arrays
    );

    Ok(heap)
}
