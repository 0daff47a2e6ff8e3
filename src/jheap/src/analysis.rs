//! Component-tree summary reporting.
//!
//! Bundles the scan results into a report: marked class count, totals, the
//! max-size node with a truncated value preview, and root-value groupings
//! filtered by a population threshold.

use crate::heap::Heap;
use crate::tree::ComponentForest;
use crate::values::display_object;
use serde::Serialize;
use std::collections::BTreeMap;

/// Reporting knobs; defaults are the diagnostic's original constants
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Value previews are truncated to this many characters
    pub value_limit: usize,
    /// Only groups with strictly more members than this are reported
    pub group_threshold: u64,
    /// Order groups by aggregated size instead of population
    pub by_size: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            value_limit: 64,
            group_threshold: 100,
            by_size: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaxNodeReport {
    pub object_id: u64,
    pub size: u64,
    pub preview: String,
}

/// Roots sharing a truncated value preview
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub preview: String,
    pub count: u64,
    pub total_size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub marked_classes: usize,
    pub total_nodes: u64,
    pub root_count: usize,
    pub max_node: Option<MaxNodeReport>,
    pub groups: Vec<GroupReport>,
}

/// Build the summary report from a finished scan
pub fn summarize(heap: &Heap, forest: &ComponentForest, opts: &SummaryOptions) -> SummaryReport {
    let max_node = forest.max_node.map(|m| MaxNodeReport {
        object_id: m.object_id,
        size: m.size,
        preview: value_preview(heap, m.object_id, opts.value_limit),
    });

    // BTreeMap keeps group assembly deterministic before the final ordering
    let mut grouped: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for &root in &forest.roots {
        let preview = value_preview(heap, root, opts.value_limit);
        let size = heap
            .instance_by_id(root)
            .map(|rec| rec.shallow_size())
            .unwrap_or(0);
        let entry = grouped.entry(preview).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += size;
    }

    let mut groups: Vec<GroupReport> = grouped
        .into_iter()
        .filter(|&(_, (count, _))| count > opts.group_threshold)
        .map(|(preview, (count, total_size))| GroupReport {
            preview,
            count,
            total_size,
        })
        .collect();

    if opts.by_size {
        groups.sort_by(|a, b| {
            b.total_size
                .cmp(&a.total_size)
                .then_with(|| a.preview.cmp(&b.preview))
        });
    } else {
        groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.preview.cmp(&b.preview)));
    }

    SummaryReport {
        marked_classes: forest.marked_classes.len(),
        total_nodes: forest.total,
        root_count: forest.roots.len(),
        max_node,
        groups,
    }
}

/// Render an object's value and truncate it for display
pub fn value_preview(heap: &Heap, object_id: u64, limit: usize) -> String {
    truncate_utf8(&display_object(heap, object_id), limit).to_string()
}

/// Truncate to at most `limit` characters without splitting a code point
pub fn truncate_utf8(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_utf8("hello", 64), "hello");
        assert_eq!(truncate_utf8("", 64), "");
    }

    #[test]
    fn test_truncate_at_limit() {
        assert_eq!(truncate_utf8("abcdef", 3), "abc");
        assert_eq!(truncate_utf8("abc", 3), "abc");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        // Each snowman is 3 bytes; counting is by character, not byte
        let s = "\u{2603}\u{2603}\u{2603}";
        assert_eq!(truncate_utf8(s, 2), "\u{2603}\u{2603}");
    }

    #[test]
    fn test_default_options_match_original_constants() {
        let opts = SummaryOptions::default();
        assert_eq!(opts.value_limit, 64);
        assert_eq!(opts.group_threshold, 100);
        assert!(!opts.by_size);
    }
}
