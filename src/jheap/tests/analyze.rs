//! Tree reconstruction, summary reporting, histograms, and rendering.

mod common;

use common::{component_dump, DumpBuilder, FieldData, TYPE_OBJECT};
use jheap::{summarize, Heap, HeapHistogram, SummaryOptions, TreeScan};

fn component_scan() -> TreeScan {
    TreeScan {
        target_class: "javax.faces.component.UIComponent".to_string(),
        label_path: Some("txt.literal".to_string()),
        ..TreeScan::default()
    }
}

#[test]
fn test_scan_classifies_roots_and_children() {
    let heap = Heap::from_bytes(component_dump()).unwrap();
    let forest = component_scan().scan(&heap).unwrap();

    assert_eq!(forest.marked_classes.len(), 2);
    assert_eq!(forest.total, 3);
    assert_eq!(forest.roots, vec![1000]);
    assert_eq!(forest.links.get(&1000).unwrap(), &vec![1001, 1002]);

    let max = forest.max_node.unwrap();
    assert_eq!(max.object_id, 1000);
    assert_eq!(max.size, 16 + 24);
}

#[test]
fn test_scan_with_unknown_target_is_empty() {
    let heap = Heap::from_bytes(component_dump()).unwrap();
    let scan = TreeScan {
        target_class: "does.not.Exist".to_string(),
        ..TreeScan::default()
    };
    let forest = scan.scan(&heap).unwrap();
    assert_eq!(forest.total, 0);
    assert!(forest.roots.is_empty());
    assert!(forest.max_node.is_none());
}

#[test]
fn test_summary_report() {
    let heap = Heap::from_bytes(component_dump()).unwrap();
    let forest = component_scan().scan(&heap).unwrap();
    let report = summarize(
        &heap,
        &forest,
        &SummaryOptions {
            group_threshold: 0,
            ..SummaryOptions::default()
        },
    );

    assert_eq!(report.marked_classes, 2);
    assert_eq!(report.total_nodes, 3);
    assert_eq!(report.root_count, 1);
    let max = report.max_node.unwrap();
    assert_eq!(max.object_id, 1000);
    assert!(max.preview.starts_with("javax.faces.component.UIOutput#"));

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].count, 1);
}

#[test]
fn test_group_threshold_filters_small_groups() {
    let heap = Heap::from_bytes(component_dump()).unwrap();
    let forest = component_scan().scan(&heap).unwrap();
    // Default threshold (100) removes the single-member group
    let report = summarize(&heap, &forest, &SummaryOptions::default());
    assert!(report.groups.is_empty());
}

#[test]
fn test_tree_rendering() {
    let heap = Heap::from_bytes(component_dump()).unwrap();
    let scan = component_scan();
    let forest = scan.scan(&heap).unwrap();

    let rendered = scan.tree(&heap, &forest, 1000).print_as_tree();
    assert_eq!(
        rendered,
        "UIOutput\n\
         +-id:root el:hello world\n\
         \\-#\n\
         \x20 +-UIOutput\n\
         \x20 | \\-id:form:name\n\
         \x20 \\-UIComponent\n\
         \x20   \\-id:form:save\n"
    );
}

#[test]
fn test_subtree_histogram() {
    let heap = Heap::from_bytes(component_dump()).unwrap();
    let forest = component_scan().scan(&heap).unwrap();

    let mut hist = HeapHistogram::new();
    hist.feed_subtree(&heap, &forest, 1000);

    assert_eq!(hist.total_count(), 3);
    assert_eq!(hist.total_size(), 40 + 40 + 32);

    let top = hist.top(10);
    assert_eq!(top[0].class, "javax.faces.component.UIOutput");
    assert_eq!(top[0].count, 2);

    let table = hist.format_top(10);
    assert!(table.contains("javax.faces.component.UIComponent"));
    assert!(table.lines().last().unwrap().contains("TOTAL"));
}

/// Two nodes pointing at each other must not hang tree building
#[test]
fn test_parent_cycle_is_cut() {
    let mut b = DumpBuilder::new();
    b.load_class(100, "java/lang/Object");
    b.class_dump(100, 0, 0, &[]);
    b.load_class(101, "demo/Node");
    b.class_dump(101, 100, 8, &[("parent", TYPE_OBJECT)]);
    b.instance(10, 101, &FieldData::new(8).obj(11).finish());
    b.instance(11, 101, &FieldData::new(8).obj(10).finish());

    let heap = Heap::from_bytes(b.finish()).unwrap();
    let scan = TreeScan {
        target_class: "demo.Node".to_string(),
        ..TreeScan::default()
    };
    let forest = scan.scan(&heap).unwrap();
    assert!(forest.roots.is_empty());
    assert_eq!(forest.total, 2);

    let rendered = scan.tree(&heap, &forest, 10).print_as_tree();
    assert!(rendered.contains("<cycle>"));

    let mut hist = HeapHistogram::new();
    hist.feed_subtree(&heap, &forest, 10);
    assert_eq!(hist.total_count(), 2);
}

/// The original diagnostic's shape: scan char[] instances, which have no
/// fields, so every array is a root and grouping is by content
#[test]
fn test_default_char_array_scan() {
    let mut b = DumpBuilder::new();
    b.load_class(100, "java/lang/Object");
    b.class_dump(100, 0, 0, &[]);

    let big = "x".repeat(100);
    b.char_array(500, &big);
    b.char_array(501, "GET /health");
    b.char_array(502, "GET /health");
    b.char_array(503, "GET /health");
    b.char_array(504, "other");

    let heap = Heap::from_bytes(b.finish()).unwrap();
    let scan = TreeScan::default();
    let forest = scan.scan(&heap).unwrap();

    assert_eq!(forest.marked_classes.len(), 1);
    assert_eq!(forest.total, 5);
    assert_eq!(forest.roots.len(), 5);
    assert!(forest.links.is_empty());

    let max = forest.max_node.unwrap();
    assert_eq!(max.object_id, 500);
    assert_eq!(max.size, 16 + 4 + 200);

    let report = summarize(
        &heap,
        &forest,
        &SummaryOptions {
            group_threshold: 2,
            ..SummaryOptions::default()
        },
    );
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].preview, "GET /health");
    assert_eq!(report.groups[0].count, 3);
    // Preview of the max node is capped at the configured limit
    assert_eq!(report.max_node.unwrap().preview.chars().count(), 64);
}

#[test]
fn test_by_size_group_ordering() {
    let mut b = DumpBuilder::new();
    b.load_class(100, "java/lang/Object");
    b.class_dump(100, 0, 0, &[]);

    // Two "aa" arrays vs one much larger "bbbb...": size ordering flips them
    b.char_array(600, "aa");
    b.char_array(601, "aa");
    let big = "b".repeat(50);
    b.char_array(602, &big);

    let heap = Heap::from_bytes(b.finish()).unwrap();
    let forest = TreeScan::default().scan(&heap).unwrap();

    let by_count = summarize(
        &heap,
        &forest,
        &SummaryOptions {
            group_threshold: 0,
            ..SummaryOptions::default()
        },
    );
    assert_eq!(by_count.groups[0].preview, "aa");

    let by_size = summarize(
        &heap,
        &forest,
        &SummaryOptions {
            group_threshold: 0,
            by_size: true,
            ..SummaryOptions::default()
        },
    );
    assert_eq!(by_size.groups[0].preview, big);
    assert_eq!(by_size.groups[0].total_size, 16 + 4 + 100);
}
