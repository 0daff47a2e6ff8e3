//! Per-class count and size aggregation.

use crate::heap::Heap;
use crate::tree::ComponentForest;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// One histogram row, for reporting
#[derive(Debug, Clone, Serialize)]
pub struct HistogramRow {
    pub class: String,
    pub count: u64,
    pub total_size: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    count: u64,
    total_size: u64,
}

/// Count/size buckets keyed by class name
#[derive(Debug, Default)]
pub struct HeapHistogram {
    buckets: HashMap<String, Bucket>,
    total_count: u64,
    total_size: u64,
}

impl HeapHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one object; unknown ids are ignored and reported as `false`
    pub fn feed(&mut self, heap: &Heap, object_id: u64) -> bool {
        let Some(rec) = heap.instance_by_id(object_id) else {
            return false;
        };
        let size = rec.shallow_size();
        let bucket = self
            .buckets
            .entry(heap.class_name_of(rec))
            .or_default();
        bucket.count += 1;
        bucket.total_size += size;
        self.total_count += 1;
        self.total_size += size;
        true
    }

    /// Feed a node and, through the forest's child links, its whole subtree.
    /// Repeated ids (cycles in parent pointers) are fed once.
    pub fn feed_subtree(&mut self, heap: &Heap, forest: &ComponentForest, root: u64) {
        let mut visited = HashSet::new();
        self.feed_subtree_inner(heap, forest, root, &mut visited);
    }

    fn feed_subtree_inner(
        &mut self,
        heap: &Heap,
        forest: &ComponentForest,
        node: u64,
        visited: &mut HashSet<u64>,
    ) {
        if !visited.insert(node) {
            return;
        }
        self.feed(heap, node);
        if let Some(children) = forest.links.get(&node) {
            for &child in children {
                self.feed_subtree_inner(heap, forest, child, visited);
            }
        }
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Top `n` buckets by total size (descending), ties broken by name
    pub fn top(&self, n: usize) -> Vec<HistogramRow> {
        let mut rows: Vec<HistogramRow> = self
            .buckets
            .iter()
            .map(|(class, b)| HistogramRow {
                class: class.clone(),
                count: b.count,
                total_size: b.total_size,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_size
                .cmp(&a.total_size)
                .then_with(|| a.class.cmp(&b.class))
        });
        rows.truncate(n);
        rows
    }

    /// Format the top `n` buckets as a table with a TOTAL footer
    pub fn format_top(&self, n: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:>10} {:>14}  CLASS", "COUNT", "SIZE");
        for row in self.top(n) {
            let _ = writeln!(out, "{:>10} {:>14}  {}", row.count, row.total_size, row.class);
        }
        let _ = writeln!(
            out,
            "{:>10} {:>14}  TOTAL",
            self.total_count, self.total_size
        );
        out
    }
}
