//! Component-tree summary command handler

use crate::cli::ScanArgs;
use crate::config::Config;
use anyhow::Result;
use jheap::{summarize, SummaryOptions};

pub fn handle(
    scan_args: &ScanArgs,
    group_threshold: Option<u64>,
    value_limit: Option<usize>,
    by_size: bool,
    json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let scan = config.tree_scan(scan_args);

    let heap = super::open_heap(&scan_args.input)?;
    eprintln!("Scanning for subtypes of {}...", scan.target_class);
    let forest = scan.scan(&heap)?;

    let opts = SummaryOptions {
        value_limit: value_limit.or(config.value_limit).unwrap_or(64),
        group_threshold: group_threshold.or(config.group_threshold).unwrap_or(100),
        by_size,
    };
    let report = summarize(&heap, &forest, &opts);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} classes match {}",
        report.marked_classes, scan.target_class
    );
    if let Some(max) = &report.max_node {
        println!("maxsize {} at {:#x}", max.size, max.object_id);
        println!("VALUE => {}", max.preview);
    }
    println!(
        "Found {} component tree roots and {} nodes in total",
        report.root_count, report.total_nodes
    );
    for group in &report.groups {
        if by_size {
            println!(
                "{} bytes in {} => {}",
                group.total_size, group.count, group.preview
            );
        } else {
            println!("{} => {}", group.count, group.preview);
        }
    }

    Ok(())
}
