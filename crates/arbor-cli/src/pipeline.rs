//! Load, build and render one input snapshot.

use anyhow::{bail, Context, Result};
use arbor_core::{
    build_forest, build_subtree, validate, MaterializeOptions, RecordId, RecordStore,
    ValidationReport,
};
use arbor_render::{serializer_for, OutputFormat, TextStyle};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Effective settings for a render run (config merged with flags).
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub format: OutputFormat,
    pub text_style: TextStyle,
    pub root: Option<RecordId>,
    pub options: MaterializeOptions,
    pub strict: bool,
}

/// Parse a `--root` value: integers become integer ids, anything else text.
pub fn parse_record_id(value: &str) -> RecordId {
    value
        .parse::<i64>()
        .map(RecordId::Int)
        .unwrap_or_else(|_| RecordId::Text(value.to_string()))
}

/// Subtree root from `--root` or `--root-text`.
///
/// `--root-text` always yields a text id, so `"007"` stays distinct from `7`.
pub fn root_id(root: Option<&str>, root_text: Option<&str>) -> Option<RecordId> {
    match (root, root_text) {
        (_, Some(text)) => Some(RecordId::from(text)),
        (Some(value), None) => Some(parse_record_id(value)),
        (None, None) => None,
    }
}

/// A validation report tagged with the input it came from.
#[derive(Debug, Serialize)]
pub struct InputReport {
    pub input: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

/// Read an input file, or stdin for `-`.
pub async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("Failed to read stdin")?;
        return Ok(content);
    }

    tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input))
}

/// Parse records from `content`.
pub fn load_store(input: &str, content: &str) -> Result<RecordStore> {
    let store = RecordStore::from_json_str(content)
        .with_context(|| format!("Failed to load records from {}", input))?;
    debug!(input, records = store.len(), "Records loaded");
    Ok(store)
}

/// Build the tree for one input and serialize it.
pub fn render_input(input: &str, content: &str, settings: &RenderSettings) -> Result<String> {
    let store = load_store(input, content)?;

    if settings.strict {
        let report = validate(&store);
        if !report.is_clean() {
            bail!("{}: {}", input, summarize(&report));
        }
    }

    let forest = match &settings.root {
        Some(id) => build_subtree(&store, id, &settings.options),
        None => build_forest(&store, &settings.options),
    }
    .with_context(|| format!("Failed to build tree for {}", input))?;

    let output = serializer_for(settings.format, settings.text_style)
        .serialize(&forest)
        .with_context(|| format!("Failed to render {}", input))?;

    Ok(output)
}

/// Validate one input.
pub fn check_input(input: &str, content: &str) -> Result<ValidationReport> {
    let store = load_store(input, content)?;
    Ok(validate(&store))
}

/// One-paragraph description of a report's findings.
pub fn summarize(report: &ValidationReport) -> String {
    let mut lines = vec![format!(
        "{} issue(s) in {} records ({} reachable)",
        report.issues.len(),
        report.record_count,
        report.reachable_count
    )];
    lines.extend(report.issues.iter().map(|issue| format!("  - {}", issue)));
    lines.join("\n")
}
