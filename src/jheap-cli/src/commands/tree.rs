//! Component-tree printing command handler

use crate::cli::ScanArgs;
use crate::config::Config;
use anyhow::Result;
use jheap::HeapHistogram;

pub fn handle(
    scan_args: &ScanArgs,
    cluster_threshold: Option<u64>,
    all: bool,
    top: usize,
) -> Result<()> {
    let config = Config::load()?;
    let scan = config.tree_scan(scan_args);
    let threshold = cluster_threshold.or(config.cluster_threshold).unwrap_or(500);

    let heap = super::open_heap(&scan_args.input)?;
    eprintln!("Scanning for subtypes of {}...", scan.target_class);
    let forest = scan.scan(&heap)?;

    if forest.roots.is_empty() {
        println!("No tree roots found for {}", scan.target_class);
        return Ok(());
    }

    // Dumps may contain partial trees; report every root's cluster but only
    // render trees for reasonably large ones
    let mut printed = 0usize;
    for &root in &forest.roots {
        let mut hist = HeapHistogram::new();
        hist.feed_subtree(&heap, &forest, root);

        println!();
        println!("{:#x}", root);
        println!("{}", hist.format_top(top));

        if hist.total_count() > threshold {
            println!("{}", scan.tree(&heap, &forest, root).print_as_tree());
            printed += 1;
            if !all {
                break;
            }
        }
    }

    if printed == 0 {
        eprintln!(
            "No root cluster exceeded {} nodes; no trees rendered",
            threshold
        );
    }

    Ok(())
}
