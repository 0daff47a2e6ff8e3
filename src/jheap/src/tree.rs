//! Parent-pointer tree reconstruction.
//!
//! One pass over the instance index classifies every instance of the target
//! type (subtype-aware) as a root or a child of the first non-null parent
//! field, mirroring how UI frameworks chain components through parent
//! pointers. Parent-to-child links are collected during the scan because
//! they are hard to recover from the parent side afterwards.

use crate::heap::{simple_name, Heap, HeapError};
use crate::texttree::TextTree;
use crate::values::{display_value, field_value, walk_string};
use std::collections::{HashMap, HashSet};

/// Scan configuration: what to mark and how to link it.
///
/// Defaults are the JSF component-tree conventions: parent pointers in
/// `compositeParent` then `parent`, node identity in `id`.
#[derive(Debug, Clone)]
pub struct TreeScan {
    /// Class whose subtypes are scanned
    pub target_class: String,
    /// Parent field names, tried in order; first non-null reference wins
    pub parent_fields: Vec<String>,
    /// Field rendered as `id:` in tree output
    pub id_field: String,
    /// Optional dotted path rendered as `el:` in tree output
    pub label_path: Option<String>,
}

impl Default for TreeScan {
    fn default() -> Self {
        TreeScan {
            target_class: "char[]".to_string(),
            parent_fields: vec!["compositeParent".to_string(), "parent".to_string()],
            id_field: "id".to_string(),
            label_path: None,
        }
    }
}

/// Largest node seen during a scan
#[derive(Debug, Clone, Copy)]
pub struct MaxNode {
    pub object_id: u64,
    pub size: u64,
}

/// Result of a classification scan
#[derive(Debug, Default)]
pub struct ComponentForest {
    /// Class ids matching the target type
    pub marked_classes: Vec<u64>,
    /// Marked instances with no parent reference, in scan order
    pub roots: Vec<u64>,
    /// Parent id to children, children in scan order. Keys may reference
    /// parents outside the marked set; those are not counted as nodes.
    pub links: HashMap<u64, Vec<u64>>,
    /// Total marked instances
    pub total: u64,
    pub max_node: Option<MaxNode>,
}

impl TreeScan {
    /// Run the classification pass over the whole instance index
    pub fn scan(&self, heap: &Heap) -> Result<ComponentForest, HeapError> {
        let marked: Vec<u64> = heap
            .classes()
            .filter(|c| heap.is_subtype_of(c.object_id, &self.target_class))
            .map(|c| c.object_id)
            .collect();
        let marked_set: HashSet<u64> = marked.iter().copied().collect();

        let mut forest = ComponentForest {
            marked_classes: marked,
            ..ComponentForest::default()
        };

        for rec in heap.instances() {
            let Some(class_id) = heap.class_id_of(rec) else {
                continue;
            };
            if !marked_set.contains(&class_id) {
                continue;
            }

            forest.total += 1;
            let size = rec.shallow_size();
            if forest.max_node.map_or(true, |m| size > m.size) {
                forest.max_node = Some(MaxNode {
                    object_id: rec.object_id,
                    size,
                });
            }

            let mut parent = None;
            for field in &self.parent_fields {
                if let Some(p) =
                    field_value(heap, rec.object_id, field)?.and_then(|v| v.as_object())
                {
                    parent = Some(p);
                    break;
                }
            }

            match parent {
                None => forest.roots.push(rec.object_id),
                Some(p) => forest.links.entry(p).or_default().push(rec.object_id),
            }
        }

        Ok(forest)
    }

    /// Build the renderable tree for one root.
    ///
    /// Node text is the class simple name over an `id:` line (plus `el:`
    /// when the label path resolves); children sit under a `#` subtree.
    /// Cycles in the links are cut with a `<cycle>` leaf.
    pub fn tree(&self, heap: &Heap, forest: &ComponentForest, root: u64) -> TextTree {
        let mut visited = HashSet::new();
        self.tree_node(heap, forest, root, &mut visited)
    }

    fn tree_node(
        &self,
        heap: &Heap,
        forest: &ComponentForest,
        node: u64,
        visited: &mut HashSet<u64>,
    ) -> TextTree {
        if !visited.insert(node) {
            return TextTree::new("<cycle>");
        }

        let children: Vec<TextTree> = forest
            .links
            .get(&node)
            .map(|cc| {
                cc.iter()
                    .map(|&child| self.tree_node(heap, forest, child, visited))
                    .collect()
            })
            .unwrap_or_default();

        self.display(heap, node, children)
    }

    fn display(&self, heap: &Heap, node: u64, children: Vec<TextTree>) -> TextTree {
        let node_type = heap
            .instance_by_id(node)
            .map(|rec| simple_name(&heap.class_name_of(rec)).to_string())
            .unwrap_or_else(|| format!("object@{:x}", node));

        let id_text = field_value(heap, node, &self.id_field)
            .ok()
            .flatten()
            .map(|v| display_value(heap, v))
            .unwrap_or_else(|| "null".to_string());
        let mut info = format!("id:{}", id_text);

        if let Some(path) = &self.label_path {
            if let Ok(Some(label)) = walk_string(heap, node, path) {
                info.push_str(" el:");
                info.push_str(&label.replace('\n', " "));
            }
        }

        if children.is_empty() {
            TextTree::with_children(node_type, vec![TextTree::new(info)])
        } else {
            TextTree::with_children(
                node_type,
                vec![TextTree::new(info), TextTree::with_children("#", children)],
            )
        }
    }
}
