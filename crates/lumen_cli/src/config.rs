//! Render configuration layering: scene preset, then JSON file, then flags.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use lumen_renderer::RenderConfig;
use serde_json::Value;

/// Load `path` (if any) over `preset`.
pub fn load_config(preset: &RenderConfig, path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(preset.clone());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = merge_config(preset, &text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    log::info!("Loaded render config from {}", path.display());
    Ok(config)
}

/// Overlay the fields present in the JSON object `text` onto `preset`.
///
/// Fields the file leaves out keep the preset's value rather than the
/// global default.
pub fn merge_config(preset: &RenderConfig, text: &str) -> Result<RenderConfig> {
    let overlay: Value = serde_json::from_str(text)?;
    let Value::Object(fields) = overlay else {
        bail!("expected a JSON object at the top level");
    };

    let mut merged = serde_json::to_value(preset)?;
    if let Value::Object(base) = &mut merged {
        for (key, value) in fields {
            if !base.contains_key(&key) {
                log::warn!("Ignoring unknown config field `{}`", key);
                continue;
            }
            base.insert(key, value);
        }
    }

    Ok(serde_json::from_value(merged)?)
}
