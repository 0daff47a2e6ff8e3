//! Dump header and index statistics command handler

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

pub fn handle(input: &Path) -> Result<()> {
    let heap = super::open_heap(input)?;
    let header = heap.header();
    let stats = heap.stats();

    println!("version:           {}", header.version.banner());
    println!("identifier size:   {} bytes", header.id_size);
    println!("timestamp:         {} ms since epoch", header.timestamp_ms);
    println!("dump size:         {} bytes", heap.dump_len());
    println!();
    println!("utf-8 strings:     {}", stats.utf8_strings);
    println!("loaded classes:    {}", stats.loaded_classes);
    println!("class dumps:       {}", stats.class_dumps);
    println!("instances:         {}", stats.instances);
    println!("object arrays:     {}", stats.object_arrays);
    println!("primitive arrays:  {}", stats.primitive_arrays);
    println!("gc roots:          {}", stats.gc_roots);
    println!("heap segments:     {}", stats.heap_segments);
    if stats.duplicate_objects > 0 {
        println!("duplicate objects: {}", stats.duplicate_objects);
    }
    if stats.skipped_records > 0 {
        println!("skipped records:   {}", stats.skipped_records);
    }

    let mut by_kind: BTreeMap<&str, u64> = BTreeMap::new();
    for root in heap.gc_roots() {
        *by_kind.entry(root.kind.name()).or_insert(0) += 1;
    }
    if !by_kind.is_empty() {
        println!();
        println!("gc roots by kind:");
        for (kind, count) in by_kind {
            println!("  {:<14} {}", kind, count);
        }
    }

    Ok(())
}
