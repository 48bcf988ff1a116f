//! Serializer trait and format selection.

use crate::error::{RenderError, Result};
use crate::html::HtmlListSerializer;
use crate::json::JsonSerializer;
use crate::text::{TextSerializer, TextStyle};
use arbor_core::TreeNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Turns a forest into text.
pub trait TreeSerializer: Send + Sync {
    fn serialize(&self, nodes: &[TreeNode]) -> Result<String>;
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Nested `<ul>`/`<li>` list
    #[default]
    Html,
    /// Array of `{id, label, children}` objects
    Json,
    /// Indented tree with branch connectors
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(RenderError::UnknownFormat(other.to_string())),
        }
    }
}

/// Build the serializer for `format`.
pub fn serializer_for(format: OutputFormat, style: TextStyle) -> Box<dyn TreeSerializer> {
    match format {
        OutputFormat::Html => Box::new(HtmlListSerializer),
        OutputFormat::Json => Box::new(JsonSerializer::pretty()),
        OutputFormat::Text => Box::new(TextSerializer::new(style)),
    }
}

/// Serialize `nodes` with the default settings for `format`.
pub fn render(nodes: &[TreeNode], format: OutputFormat) -> Result<String> {
    let output = serializer_for(format, TextStyle::default()).serialize(nodes)?;
    debug!(%format, roots = nodes.len(), bytes = output.len(), "Tree rendered");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(RenderError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_format_display_round_trips() {
        for format in [OutputFormat::Html, OutputFormat::Json, OutputFormat::Text] {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_render_dispatch() {
        let nodes = vec![TreeNode::leaf(1, "only")];

        assert_eq!(
            render(&nodes, OutputFormat::Html).unwrap(),
            "<ul><li>only</li></ul>"
        );
        assert_eq!(render(&nodes, OutputFormat::Text).unwrap(), "only\n");
        assert!(render(&nodes, OutputFormat::Json)
            .unwrap()
            .contains("\"label\": \"only\""));
    }
}
