//! ASCII tree rendering for component trees.

/// A node of renderable tree text. Node text may span multiple lines;
/// continuation lines indent under their node.
#[derive(Debug, Clone)]
pub struct TextTree {
    text: String,
    children: Vec<TextTree>,
}

impl TextTree {
    pub fn new(text: impl Into<String>) -> Self {
        TextTree {
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(text: impl Into<String>, children: Vec<TextTree>) -> Self {
        TextTree {
            text: text.into(),
            children,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[TextTree] {
        &self.children
    }

    /// Render the tree with `+-`/`\-` branch markers
    pub fn print_as_tree(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, "", "");
        out
    }

    fn render(&self, out: &mut String, first_prefix: &str, rest_prefix: &str) {
        for (i, line) in self.text.lines().enumerate() {
            if i == 0 {
                out.push_str(first_prefix);
            } else {
                out.push_str(rest_prefix);
            }
            out.push_str(line);
            out.push('\n');
        }
        if self.text.is_empty() {
            out.push_str(first_prefix);
            out.push('\n');
        }

        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            let (branch, cont) = if i == last { ("\\-", "  ") } else { ("+-", "| ") };
            child.render(
                out,
                &format!("{}{}", rest_prefix, branch),
                &format!("{}{}", rest_prefix, cont),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_node() {
        let tree = TextTree::new("root");
        assert_eq!(tree.print_as_tree(), "root\n");
    }

    #[test]
    fn test_two_levels() {
        let tree = TextTree::with_children(
            "root",
            vec![TextTree::new("a"), TextTree::new("b")],
        );
        assert_eq!(tree.print_as_tree(), "root\n+-a\n\\-b\n");
    }

    #[test]
    fn test_nested_prefixes() {
        let tree = TextTree::with_children(
            "root",
            vec![
                TextTree::with_children("a", vec![TextTree::new("a1")]),
                TextTree::new("b"),
            ],
        );
        let rendered = tree.print_as_tree();
        assert_eq!(rendered, "root\n+-a\n| \\-a1\n\\-b\n");
    }

    #[test]
    fn test_multiline_text_indents() {
        let tree = TextTree::with_children(
            "root",
            vec![TextTree::new("line1\nline2")],
        );
        assert_eq!(tree.print_as_tree(), "root\n\\-line1\n  line2\n");
    }
}
