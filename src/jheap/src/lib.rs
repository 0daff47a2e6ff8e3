//! # jheap
//!
//! JVM heap dump analysis library - HPROF parsing, instance indexing, and
//! component-tree extraction.
//!
//! This library provides functionality to:
//! - Decode HPROF heap dumps (plain or gzipped, 32- and 64-bit identifiers)
//! - Index classes and instances for lookup by id, name, and subtype
//! - Resolve instance fields by name and dotted path
//! - Reconstruct parent/child component trees and report on them
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let heap = jheap::Heap::open("app.hprof")?;
//!
//! let scan = jheap::TreeScan {
//!     target_class: "javax.faces.component.UIComponent".to_string(),
//!     ..jheap::TreeScan::default()
//! };
//! let forest = scan.scan(&heap)?;
//! println!(
//!     "Found {} component tree roots and {} nodes in total",
//!     forest.roots.len(),
//!     forest.total
//! );
//!
//! for &root in &forest.roots {
//!     let mut hist = jheap::HeapHistogram::new();
//!     hist.feed_subtree(&heap, &forest, root);
//!     if hist.total_count() > 500 {
//!         println!("{}", scan.tree(&heap, &forest, root).print_as_tree());
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod format;
pub mod heap;
pub mod histogram;
pub mod texttree;
pub mod tree;
pub mod values;

// Re-export commonly used items
#[doc(inline)]
pub use analysis::{summarize, truncate_utf8, value_preview, SummaryOptions, SummaryReport};
#[doc(inline)]
pub use format::{BasicType, FormatError, HprofHeader, HprofVersion};
#[doc(inline)]
pub use heap::{
    simple_name, FieldDecl, GcRoot, Heap, HeapError, HeapStats, JavaClass, ObjectKind,
    ObjectRecord, RootKind, StaticField,
};
#[doc(inline)]
pub use histogram::{HeapHistogram, HistogramRow};
#[doc(inline)]
pub use texttree::TextTree;
#[doc(inline)]
pub use tree::{ComponentForest, MaxNode, TreeScan};
#[doc(inline)]
pub use values::{
    display_object, display_value, field_value, field_values, object_array_elements,
    primitive_array, walk, walk_object, walk_string, Value,
};
