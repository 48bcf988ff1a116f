//! Nested HTML list output.

use crate::error::Result;
use crate::render::TreeSerializer;
use arbor_core::TreeNode;

/// Renders a forest as nested `<ul>`/`<li>` markup.
///
/// The outer `<ul>` is always written, so an empty forest becomes
/// `<ul></ul>`. Nodes without children get no nested list.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlListSerializer;

impl HtmlListSerializer {
    fn write_list(output: &mut String, nodes: &[TreeNode]) {
        output.push_str("<ul>");
        for node in nodes {
            output.push_str("<li>");
            output.push_str(&escape_html(&node.label));
            if !node.children.is_empty() {
                Self::write_list(output, &node.children);
            }
            output.push_str("</li>");
        }
        output.push_str("</ul>");
    }
}

impl TreeSerializer for HtmlListSerializer {
    fn serialize(&self, nodes: &[TreeNode]) -> Result<String> {
        let mut output = String::new();
        Self::write_list(&mut output, nodes);
        Ok(output)
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_list() {
        let nodes = vec![TreeNode::with_children(
            1,
            "Root",
            vec![
                TreeNode::with_children(2, "Child A", vec![TreeNode::leaf(4, "Grandchild")]),
                TreeNode::leaf(3, "Child B"),
            ],
        )];

        let html = HtmlListSerializer.serialize(&nodes).unwrap();
        assert_eq!(
            html,
            "<ul><li>Root<ul><li>Child A<ul><li>Grandchild</li></ul></li><li>Child B</li></ul></li></ul>"
        );
    }

    #[test]
    fn test_empty_forest() {
        assert_eq!(HtmlListSerializer.serialize(&[]).unwrap(), "<ul></ul>");
    }

    #[test]
    fn test_labels_are_escaped() {
        let nodes = vec![TreeNode::leaf(1, "<b>Tom & \"Jerry\"</b>'s")];
        let html = HtmlListSerializer.serialize(&nodes).unwrap();
        assert_eq!(
            html,
            "<ul><li>&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;&#039;s</li></ul>"
        );
    }

    #[test]
    fn test_escape_passes_unicode_through() {
        assert_eq!(escape_html("Ünïcødé ✓"), "Ünïcødé ✓");
        assert_eq!(escape_html(""), "");
    }
}
