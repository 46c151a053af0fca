/* src/server/core/rust/src/request.rs */

use std::collections::BTreeMap;

use quill_engine::{ScriptAsset, StyleAsset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn empty_object() -> Value {
  Value::Object(Map::new())
}

/// Which optional context wiring a render performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderEnvironment {
  /// Build-time render: slices are emitted as placeholders.
  Server,
  /// Request-time render: slices are rendered inline.
  Engines,
  /// Standalone slice render: nested slices are unsupported.
  Slices,
}

/// Per-request flags supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
  #[serde(default)]
  pub is_during_build: bool,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl RequestContext {
  pub fn render_environment(&self) -> RenderEnvironment {
    if self.is_during_build { RenderEnvironment::Server } else { RenderEnvironment::Engines }
  }
}

/// Data payload of one page. Unknown keys are kept so the inlined copy
/// matches what was loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
  pub component_chunk_name: String,
  /// Slot alias -> slice name.
  #[serde(default)]
  pub slices_map: BTreeMap<String, String>,
  #[serde(default = "empty_object")]
  pub result: Value,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl PageData {
  pub fn new(component_chunk_name: impl Into<String>) -> Self {
    Self {
      component_chunk_name: component_chunk_name.into(),
      slices_map: BTreeMap::new(),
      result: empty_object(),
      extra: Map::new(),
    }
  }

  pub fn with_result(mut self, result: Value) -> Self {
    self.result = result;
    self
  }

  pub fn with_slice(mut self, alias: impl Into<String>, slice_name: impl Into<String>) -> Self {
    self.slices_map.insert(alias.into(), slice_name.into());
    self
  }

  /// `result.pageContext.__params`, when it is an object.
  pub fn route_params(&self) -> Map<String, Value> {
    self
      .result
      .pointer("/pageContext/__params")
      .and_then(Value::as_object)
      .cloned()
      .unwrap_or_default()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceResult {
  #[serde(default)]
  pub slice_context: Value,
  #[serde(default)]
  pub data: Value,
}

/// Loaded data of one slice, keyed by slice name in [`PageRequest::slice_data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceDescriptor {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub component_chunk_name: String,
  #[serde(default)]
  pub result: SliceResult,
  #[serde(default)]
  pub context: Value,
}

impl SliceDescriptor {
  pub fn new(component_chunk_name: impl Into<String>) -> Self {
    Self {
      name: None,
      component_chunk_name: component_chunk_name.into(),
      result: SliceResult::default(),
      context: Value::Null,
    }
  }

  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn with_result(mut self, slice_context: Value, data: Value) -> Self {
    self.result = SliceResult { slice_context, data };
    self
  }

  pub fn with_context(mut self, context: Value) -> Self {
    self.context = context;
    self
  }

  /// Name used in diagnostics.
  pub fn label(&self) -> &str {
    self.name.as_deref().unwrap_or(&self.component_chunk_name)
  }
}

/// Immutable input of one page render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
  pub page_path: String,
  pub page_data: PageData,
  #[serde(default = "empty_object")]
  pub static_query_context: Value,
  #[serde(default)]
  pub styles: Vec<StyleAsset>,
  #[serde(default)]
  pub scripts: Vec<ScriptAsset>,
  #[serde(default)]
  pub reversed_styles: Vec<StyleAsset>,
  #[serde(default)]
  pub reversed_scripts: Vec<ScriptAsset>,
  #[serde(default)]
  pub inline_page_data: bool,
  #[serde(default)]
  pub context: RequestContext,
  #[serde(default)]
  pub webpack_compilation_hash: String,
  #[serde(default)]
  pub slice_data: BTreeMap<String, SliceDescriptor>,
}

impl PageRequest {
  pub fn new(page_path: impl Into<String>, page_data: PageData) -> Self {
    Self {
      page_path: page_path.into(),
      page_data,
      static_query_context: empty_object(),
      styles: Vec::new(),
      scripts: Vec::new(),
      reversed_styles: Vec::new(),
      reversed_scripts: Vec::new(),
      inline_page_data: false,
      context: RequestContext::default(),
      webpack_compilation_hash: String::new(),
      slice_data: BTreeMap::new(),
    }
  }

  /// Sets `styles` and the matching `reversed_styles`.
  pub fn with_styles(mut self, styles: Vec<StyleAsset>) -> Self {
    self.reversed_styles = styles.iter().rev().cloned().collect();
    self.styles = styles;
    self
  }

  /// Sets `scripts` and the matching `reversed_scripts`.
  pub fn with_scripts(mut self, scripts: Vec<ScriptAsset>) -> Self {
    self.reversed_scripts = scripts.iter().rev().cloned().collect();
    self.scripts = scripts;
    self
  }

  pub fn with_inline_page_data(mut self, inline: bool) -> Self {
    self.inline_page_data = inline;
    self
  }

  pub fn with_compilation_hash(mut self, hash: impl Into<String>) -> Self {
    self.webpack_compilation_hash = hash.into();
    self
  }

  pub fn with_static_query_context(mut self, context: Value) -> Self {
    self.static_query_context = context;
    self
  }

  pub fn with_slice_data(mut self, name: impl Into<String>, slice: SliceDescriptor) -> Self {
    self.slice_data.insert(name.into(), slice);
    self
  }

  pub fn during_build(mut self, during_build: bool) -> Self {
    self.context.is_during_build = during_build;
    self
  }
}
