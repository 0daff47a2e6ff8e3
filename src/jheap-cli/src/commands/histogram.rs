//! Whole-heap histogram command handler

use anyhow::Result;
use jheap::HeapHistogram;
use std::path::Path;

pub fn handle(input: &Path, top: usize, json: bool) -> Result<()> {
    let heap = super::open_heap(input)?;

    let mut hist = HeapHistogram::new();
    for rec in heap.instances() {
        hist.feed(&heap, rec.object_id);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&hist.top(top))?);
        return Ok(());
    }

    print!("{}", hist.format_top(top));
    Ok(())
}
