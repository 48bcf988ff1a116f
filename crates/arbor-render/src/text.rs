//! Indented plain-text output.
//!
//! Produces a listing similar to the `tree` command:
//!
//! ```text
//! Root
//! ├── Child A
//! │   └── Grandchild
//! └── Child B
//! ```

use crate::error::{RenderError, Result};
use crate::render::TreeSerializer;
use arbor_core::TreeNode;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Branch characters used for the connectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    #[default]
    Unicode,
    Ascii,
}

struct TreeChars {
    /// Continuing branch
    pipe: &'static str,
    /// Non-last item
    branch: &'static str,
    /// Last item in a level
    last: &'static str,
    /// Spacing under a last item
    space: &'static str,
}

impl TreeChars {
    const UNICODE: TreeChars = TreeChars {
        pipe: "\u{2502}   ",
        branch: "\u{251c}\u{2500}\u{2500} ",
        last: "\u{2514}\u{2500}\u{2500} ",
        space: "    ",
    };

    const ASCII: TreeChars = TreeChars {
        pipe: "|   ",
        branch: "|-- ",
        last: "`-- ",
        space: "    ",
    };
}

impl TextStyle {
    fn chars(self) -> &'static TreeChars {
        match self {
            TextStyle::Unicode => &TreeChars::UNICODE,
            TextStyle::Ascii => &TreeChars::ASCII,
        }
    }
}

impl FromStr for TextStyle {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "unicode" => Ok(TextStyle::Unicode),
            "ascii" => Ok(TextStyle::Ascii),
            other => Err(RenderError::UnknownStyle(other.to_string())),
        }
    }
}

/// Renders a forest as an indented tree, one label per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSerializer {
    style: TextStyle,
}

impl TextSerializer {
    pub fn new(style: TextStyle) -> Self {
        Self { style }
    }

    fn write_children(&self, output: &mut String, nodes: &[TreeNode], prefix: &str) {
        let chars = self.style.chars();
        let count = nodes.len();

        for (i, node) in nodes.iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { chars.last } else { chars.branch };

            output.push_str(prefix);
            output.push_str(connector);
            output.push_str(&escape_text(&node.label));
            output.push('\n');

            let child_prefix = format!("{}{}", prefix, if is_last { chars.space } else { chars.pipe });
            self.write_children(output, &node.children, &child_prefix);
        }
    }
}

impl TreeSerializer for TextSerializer {
    fn serialize(&self, nodes: &[TreeNode]) -> Result<String> {
        let mut output = String::new();
        for root in nodes {
            output.push_str(&escape_text(&root.label));
            output.push('\n');
            self.write_children(&mut output, &root.children, "");
        }
        Ok(output)
    }
}

/// Escape a label for one line of text output.
///
/// Control characters and line separators become `\n`, `\u{1b}` and the
/// like, so a label can never start a line of its own.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                escaped.extend(c.escape_default())
            }
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TreeNode> {
        vec![TreeNode::with_children(
            1,
            "Root",
            vec![
                TreeNode::with_children(2, "Child A", vec![TreeNode::leaf(4, "Grandchild")]),
                TreeNode::leaf(3, "Child B"),
            ],
        )]
    }

    #[test]
    fn test_unicode_tree() {
        let text = TextSerializer::default().serialize(&sample()).unwrap();
        assert_eq!(
            text,
            "Root\n├── Child A\n│   └── Grandchild\n└── Child B\n"
        );
    }

    #[test]
    fn test_ascii_tree() {
        let text = TextSerializer::new(TextStyle::Ascii)
            .serialize(&sample())
            .unwrap();
        assert_eq!(text, "Root\n|-- Child A\n|   `-- Grandchild\n`-- Child B\n");
    }

    #[test]
    fn test_last_branch_uses_spaces() {
        let nodes = vec![TreeNode::with_children(
            1,
            "r",
            vec![TreeNode::with_children(
                2,
                "a",
                vec![TreeNode::leaf(3, "b")],
            )],
        )];
        let text = TextSerializer::new(TextStyle::Ascii).serialize(&nodes).unwrap();
        assert_eq!(text, "r\n`-- a\n    `-- b\n");
    }

    #[test]
    fn test_multiple_roots_and_empty() {
        let nodes = vec![TreeNode::leaf(1, "one"), TreeNode::leaf(2, "two")];
        assert_eq!(
            TextSerializer::default().serialize(&nodes).unwrap(),
            "one\ntwo\n"
        );
        assert_eq!(TextSerializer::default().serialize(&[]).unwrap(), "");
    }

    #[test]
    fn test_label_cannot_forge_lines() {
        let nodes = vec![TreeNode::with_children(
            1,
            "Root",
            vec![TreeNode::leaf(2, "a\n└── forged"), TreeNode::leaf(3, "b")],
        )];
        let text = TextSerializer::default().serialize(&nodes).unwrap();

        assert_eq!(text, "Root\n├── a\\n└── forged\n└── b\n");
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("plain Ünïcode ✓"), "plain Ünïcode ✓");
        assert_eq!(escape_text("tab\there\r"), "tab\\there\\r");
        assert_eq!(escape_text("\u{1b}[31mred"), "\\u{1b}[31mred");
        assert_eq!(escape_text("x\u{2028}y"), "x\\u{2028}y");
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("ASCII".parse::<TextStyle>().unwrap(), TextStyle::Ascii);
        assert!("fancy".parse::<TextStyle>().is_err());
    }
}
