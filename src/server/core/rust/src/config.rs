/* src/server/core/rust/src/config.rs */

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::PipelineError;

/// Build-wide render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
  /// Prefix of every emitted asset URL.
  pub path_prefix: String,
  /// Prefix of the routed location pathname.
  pub base_path: String,
  /// Separate asset origin, stripped from manifest links.
  pub asset_prefix: Option<String>,
  /// The runtime can render incrementally.
  pub streaming: bool,
  pub slices: bool,
  /// Version reported by the generator meta tag.
  pub generator: String,
  /// Contents of `chunk-map.json`.
  pub chunk_mapping: Value,
}

impl Default for RenderConfig {
  fn default() -> Self {
    Self {
      path_prefix: String::new(),
      base_path: String::new(),
      asset_prefix: None,
      streaming: true,
      slices: false,
      generator: env!("CARGO_PKG_VERSION").to_string(),
      chunk_mapping: Value::Object(Map::new()),
    }
  }
}

impl RenderConfig {
  pub fn with_streaming(mut self, streaming: bool) -> Self {
    self.streaming = streaming;
    self
  }

  pub fn with_slices(mut self, slices: bool) -> Self {
    self.slices = slices;
    self
  }

  pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.path_prefix = prefix.into();
    self
  }

  pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
    self.base_path = base_path.into();
    self
  }

  pub fn with_asset_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.asset_prefix = Some(prefix.into());
    self
  }

  pub fn with_chunk_mapping(mut self, mapping: Value) -> Self {
    self.chunk_mapping = mapping;
    self
  }
}

fn read_json(path: &Path) -> Result<Option<Value>, PipelineError> {
  let content = match std::fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(PipelineError::Config(format!("{}: {e}", path.display()))),
  };
  serde_json::from_str(&content)
    .map(Some)
    .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))
}

/// Load `render-config.json` and `chunk-map.json` from a build output
/// directory. Both files are optional.
pub fn load_render_config(dir: impl AsRef<Path>) -> Result<RenderConfig, PipelineError> {
  let base = dir.as_ref();
  let mut config = match read_json(&base.join("render-config.json"))? {
    Some(value) => serde_json::from_value(value)
      .map_err(|e| PipelineError::Config(format!("render-config.json: {e}")))?,
    None => RenderConfig::default(),
  };
  if let Some(mapping) = read_json(&base.join("chunk-map.json"))? {
    config.chunk_mapping = mapping;
  }
  tracing::debug!(dir = %base.display(), streaming = config.streaming, slices = config.slices, "render config loaded");
  Ok(config)
}
