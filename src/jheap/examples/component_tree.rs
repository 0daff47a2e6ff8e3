//! Extract a component tree from a heap dump and print a summary.
//!
//! Usage: component_tree <dump.hprof> [target-class]

use jheap::{summarize, Heap, SummaryOptions, TreeScan};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Please provide a heap dump path as the first argument");
        std::process::exit(1);
    };

    let heap = Heap::open(&path)?;
    eprintln!(
        "Opened {}: {} classes, {} objects",
        path,
        heap.stats().loaded_classes,
        heap.instances().count()
    );

    let mut scan = TreeScan::default();
    if let Some(target) = args.next() {
        scan.target_class = target;
    }

    let forest = scan.scan(&heap)?;
    let report = summarize(&heap, &forest, &SummaryOptions::default());

    println!(
        "Found {} component tree roots and {} nodes in total",
        report.root_count, report.total_nodes
    );
    if let Some(max) = &report.max_node {
        println!("maxsize {} at {:#x}", max.size, max.object_id);
        println!("VALUE => {}", max.preview);
    }
    for group in &report.groups {
        println!("{} => {}", group.count, group.preview);
    }

    Ok(())
}
