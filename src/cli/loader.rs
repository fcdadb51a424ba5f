//! Reading templates and configurations from disk

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use deckhand::api::{JsonMap, PipelineConfig};
use serde_json::Value;
use tracing::debug;

/// Reads a YAML (or JSON) file holding a single mapping
pub fn load_map(path: &Path) -> Result<JsonMap> {
    debug!(file = %path.display(), "Reading file");
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading file: {}", path.display()))?;

    let value: Value = serde_yaml::from_str(&text)
        .with_context(|| format!("unmarshaling yaml in {}", path.display()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "{} must contain a mapping at the top level, found {}",
            path.display(),
            kind(&other)
        ),
    }
}

/// Reads a raw pipeline config from a JSON file
pub fn load_pipeline_json(path: &Path) -> Result<PipelineConfig> {
    debug!(file = %path.display(), "Reading JSON payload");
    let bytes = fs::read(path).with_context(|| format!("reading JSON file: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("unmarshaling JSON pipeline in {}", path.display()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
