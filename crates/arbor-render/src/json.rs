//! JSON output.

use crate::error::Result;
use crate::render::TreeSerializer;
use arbor_core::TreeNode;

/// Renders a forest as a JSON array of `{id, label, children}` objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl TreeSerializer for JsonSerializer {
    fn serialize(&self, nodes: &[TreeNode]) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(nodes)?
        } else {
            serde_json::to_string(nodes)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_output() {
        let nodes = vec![TreeNode::with_children(
            1,
            "Root",
            vec![TreeNode::leaf("a", "A")],
        )];

        let json = JsonSerializer::compact().serialize(&nodes).unwrap();
        assert_eq!(
            json,
            r#"[{"id":1,"label":"Root","children":[{"id":"a","label":"A","children":[]}]}]"#
        );
    }

    #[test]
    fn test_empty_forest() {
        assert_eq!(JsonSerializer::compact().serialize(&[]).unwrap(), "[]");
        assert_eq!(JsonSerializer::pretty().serialize(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_pretty_output_parses_back() {
        let nodes = vec![TreeNode::leaf(7, "x")];
        let json = JsonSerializer::pretty().serialize(&nodes).unwrap();
        assert!(json.contains('\n'));

        let parsed: Vec<TreeNode> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, nodes);
    }
}
