//! Arbor Render
//!
//! Serializers for materialized trees. Each one is a pure formatting step
//! and can be swapped without touching indexing or materialization.

mod error;
mod html;
mod json;
mod render;
mod text;

pub use error::{RenderError, Result};
pub use html::{escape_html, HtmlListSerializer};
pub use json::JsonSerializer;
pub use render::{render, serializer_for, OutputFormat, TreeSerializer};
pub use text::{escape_text, TextSerializer, TextStyle};
