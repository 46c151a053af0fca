/* src/server/core/rust/src/slices.rs */

//! Slices: independently rendered page regions placed with [`slice`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use quill_markup::{Component, ContextBinding, ContextKey, Element, RenderContext, RenderError};
use serde_json::{Map, Value, json};

use crate::errors::PipelineError;
use crate::loader::ComponentLoader;
use crate::request::{RenderEnvironment, SliceDescriptor};

pub const SLICES_CONTEXT: ContextKey = ContextKey::new("slices");
pub const SLICES_RESULTS_CONTEXT: ContextKey = ContextKey::new("slicesResults");
pub const SLICES_PROPS_CONTEXT: ContextKey = ContextKey::new("slicesProps");
pub const SLICES_MAP_CONTEXT: ContextKey = ContextKey::new("slicesMap");

/// Slot of the bundle scripts when slices are enabled.
pub const SCRIPTS_SLICE_ID: &str = "_quill-scripts";

const SLICE_COMPONENT: &str = "Slice";

/// Placement metadata bound under [`SLICES_CONTEXT`].
#[derive(Debug, Clone, PartialEq)]
pub struct SlicesContext {
  pub render_environment: RenderEnvironment,
  /// The slice being rendered standalone.
  pub slice_root: Option<SliceDescriptor>,
}

/// A slice resolved for inline rendering.
#[derive(Clone)]
pub struct SliceRecord {
  pub component: Arc<dyn Component>,
  pub slice_context: Value,
  pub data: Value,
}

impl fmt::Debug for SliceRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SliceRecord")
      .field("component", &self.component.name())
      .field("slice_context", &self.slice_context)
      .field("data", &self.data)
      .finish()
  }
}

/// Slice name -> resolved slice.
pub type SlicesResults = HashMap<String, SliceRecord>;

/// Slot alias -> slice name.
pub type SlicesMap = BTreeMap<String, String>;

/// Props each placed slice received during one render, keyed by slice id.
#[derive(Debug, Default)]
pub struct SliceProps {
  records: Mutex<Map<String, Value>>,
}

impl SliceProps {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&self, id: &str, slice_name: &str, props: Value) {
    self.records.lock().insert(id.to_string(), json!({"sliceName": slice_name, "props": props}));
  }

  pub fn snapshot(&self) -> Value {
    Value::Object(self.records.lock().clone())
  }
}

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

fn fnv1a_32(input: &str) -> u32 {
  let mut hash = FNV_OFFSET;
  for byte in input.bytes() {
    hash ^= u32::from(byte);
    hash = hash.wrapping_mul(FNV_PRIME);
  }
  hash
}

/// Stable id of one slice placement: slice name plus a hash of its props.
pub fn slice_id(slice_name: &str, props: &Value) -> String {
  format!("{slice_name}-{:08x}", fnv1a_32(&props.to_string()))
}

fn markers(id: &str) -> (Element, Element) {
  let marker = format!("{id}-1");
  (
    Element::host("slice-start").attr("id", marker.as_str()),
    Element::host("slice-end").attr("id", marker),
  )
}

/// Empty start/end marker pair for a slice filled in after rendering.
pub fn server_slice_placeholder(id: &str) -> Element {
  let (start, end) = markers(id);
  Element::fragment([start, end])
}

/// Place the slice mapped to `alias`, passing it `props`.
pub fn slice(alias: &str, props: Value) -> Element {
  let mut all = match props {
    Value::Object(map) => map,
    _ => Map::new(),
  };
  all.insert("alias".to_string(), Value::String(alias.to_string()));
  Element::component(Arc::new(SlicePlaceholder), Value::Object(all))
}

struct SlicePlaceholder;

impl Component for SlicePlaceholder {
  fn name(&self) -> &str {
    SLICE_COMPONENT
  }

  fn render(&self, props: &Value, cx: &RenderContext) -> Result<Element, RenderError> {
    let mut slice_props = props.as_object().cloned().unwrap_or_default();
    let alias = match slice_props.remove("alias") {
      Some(Value::String(alias)) => alias,
      _ => return Err(RenderError::component(SLICE_COMPONENT, "missing `alias`")),
    };
    let slice_props = Value::Object(slice_props);

    let Some(slices) = cx.get::<SlicesContext>(SLICES_CONTEXT) else {
      return Err(RenderError::Unsupported(format!("slice `{alias}` rendered without slice support")));
    };
    if slices.render_environment == RenderEnvironment::Slices {
      let root = slices.slice_root.as_ref().map_or("<unknown>", SliceDescriptor::label);
      return Err(RenderError::Unsupported(format!(
        "slice `{alias}` placed inside slice `{root}`: nested slices are not supported"
      )));
    }

    let name = cx
      .get::<SlicesMap>(SLICES_MAP_CONTEXT)
      .and_then(|map| map.get(&alias))
      .ok_or_else(|| RenderError::component(SLICE_COMPONENT, format!("no slice is mapped to `{alias}`")))?;
    let id = slice_id(name, &slice_props);
    if let Some(record) = cx.get::<SliceProps>(SLICES_PROPS_CONTEXT) {
      record.record(&id, name, slice_props.clone());
    }

    let (start, end) = markers(&id);
    if slices.render_environment == RenderEnvironment::Server {
      return Ok(Element::fragment([start, end]));
    }

    let record = cx
      .get::<SlicesResults>(SLICES_RESULTS_CONTEXT)
      .and_then(|results| results.get(name))
      .ok_or_else(|| RenderError::component(SLICE_COMPONENT, format!("slice `{name}` was not resolved")))?;
    let mut component_props = Map::new();
    component_props.insert("sliceContext".to_string(), record.slice_context.clone());
    component_props.insert("data".to_string(), record.data.clone());
    if let Value::Object(extra) = slice_props {
      component_props.extend(extra);
    }
    Ok(Element::fragment([
      start,
      Element::component(record.component.clone(), Value::Object(component_props)),
      end,
    ]))
  }
}

/// Load the component of every slice the page maps.
pub async fn resolve_slices(
  loader: &dyn ComponentLoader,
  slices_map: &SlicesMap,
  slice_data: &BTreeMap<String, SliceDescriptor>,
) -> Result<SlicesResults, PipelineError> {
  let mut results = SlicesResults::new();
  for name in slices_map.values() {
    if results.contains_key(name) {
      continue;
    }
    let descriptor =
      slice_data.get(name).ok_or_else(|| PipelineError::missing(format!("slice data for `{name}`")))?;
    let component = loader.load(&descriptor.component_chunk_name).await?;
    results.insert(
      name.clone(),
      SliceRecord {
        component,
        slice_context: descriptor.result.slice_context.clone(),
        data: descriptor.result.data.clone(),
      },
    );
  }
  Ok(results)
}

/// Bindings wrapped around a page body when slices are enabled, outermost
/// first. Results are only bound when rendering inline.
pub fn page_slice_bindings(
  environment: RenderEnvironment,
  results: Option<SlicesResults>,
  props: Arc<SliceProps>,
  slices_map: SlicesMap,
) -> Vec<ContextBinding> {
  let mut bindings = Vec::with_capacity(4);
  if let Some(results) = results.filter(|_| environment == RenderEnvironment::Engines) {
    bindings.push(ContextBinding::new(SLICES_RESULTS_CONTEXT, results));
  }
  bindings.push(slices_binding(environment, None));
  bindings.push(ContextBinding::shared(SLICES_PROPS_CONTEXT, props));
  bindings.push(ContextBinding::new(SLICES_MAP_CONTEXT, slices_map));
  bindings
}

pub fn slices_binding(environment: RenderEnvironment, slice_root: Option<SliceDescriptor>) -> ContextBinding {
  ContextBinding::new(SLICES_CONTEXT, SlicesContext { render_environment: environment, slice_root })
}

#[cfg(test)]
mod tests {
  use super::*;
  use quill_markup::{component_fn, render_to_string};

  use crate::loader::ChunkLoader;

  fn header() -> Arc<dyn Component> {
    component_fn("Header", |props, _| {
      let title = props["data"]["title"].as_str().unwrap_or_default().to_string();
      let variant = props["variant"].as_str().unwrap_or("plain").to_string();
      Ok(Element::host("header").attr("class", variant).child(Element::text(title)))
    })
  }

  fn map() -> SlicesMap {
    SlicesMap::from([("top".to_string(), "site-header".to_string())])
  }

  fn results() -> SlicesResults {
    SlicesResults::from([(
      "site-header".to_string(),
      SliceRecord { component: header(), slice_context: json!({}), data: json!({"title": "Quill"}) },
    )])
  }

  #[test]
  fn fnv_known_values() {
    assert_eq!(fnv1a_32(""), FNV_OFFSET);
    assert_eq!(fnv1a_32("a"), 0xe40c_292c);
  }

  #[test]
  fn slice_ids_depend_on_props() {
    let a = slice_id("header", &json!({"variant": "dark"}));
    assert_eq!(a, slice_id("header", &json!({"variant": "dark"})));
    assert_ne!(a, slice_id("header", &json!({"variant": "light"})));
    assert!(a.starts_with("header-"));
  }

  #[test]
  fn engines_render_inline_between_markers() {
    let props = Arc::new(SliceProps::new());
    let bindings = page_slice_bindings(RenderEnvironment::Engines, Some(results()), props.clone(), map());
    let page = Element::with_contexts(bindings, slice("top", json!({"variant": "dark"})));

    let id = slice_id("site-header", &json!({"variant": "dark"}));
    let html = render_to_string(&page).unwrap();
    assert_eq!(
      html,
      format!(
        r#"<slice-start id="{id}-1"></slice-start><header class="dark">Quill</header><slice-end id="{id}-1"></slice-end>"#
      )
    );
    assert_eq!(
      props.snapshot(),
      json!({ id: {"sliceName": "site-header", "props": {"variant": "dark"}} })
    );
  }

  #[test]
  fn server_renders_markers_only() {
    let props = Arc::new(SliceProps::new());
    let bindings = page_slice_bindings(RenderEnvironment::Server, Some(results()), props, map());
    assert_eq!(bindings.len(), 3);
    let page = Element::with_contexts(bindings, slice("top", json!({})));
    let html = render_to_string(&page).unwrap();
    assert!(html.starts_with("<slice-start id=\"site-header-"));
    assert!(!html.contains("<header"));
  }

  #[test]
  fn nested_slice_is_diagnosed() {
    let root = SliceDescriptor::new("component---footer").named("footer");
    let element = Element::with_contexts(
      vec![slices_binding(RenderEnvironment::Slices, Some(root))],
      slice("top", json!({})),
    );
    let err = render_to_string(&element).unwrap_err();
    assert_eq!(err.code(), "UNSUPPORTED");
    assert!(err.to_string().contains("inside slice `footer`"));
  }

  #[test]
  fn unmapped_alias_fails() {
    let bindings = page_slice_bindings(RenderEnvironment::Engines, Some(results()), Arc::default(), map());
    let element = Element::with_contexts(bindings, slice("sidebar", json!({})));
    let err = render_to_string(&element).unwrap_err();
    assert_eq!(err.to_string(), "component `Slice` failed: no slice is mapped to `sidebar`");
  }

  #[test]
  fn placeholder_markup() {
    let html = render_to_string(&server_slice_placeholder(SCRIPTS_SLICE_ID)).unwrap();
    assert_eq!(html, r#"<slice-start id="_quill-scripts-1"></slice-start><slice-end id="_quill-scripts-1"></slice-end>"#);
  }

  #[tokio::test]
  async fn resolves_mapped_slices() {
    let loader = ChunkLoader::new().component("component---header", header());
    let data = BTreeMap::from([(
      "site-header".to_string(),
      SliceDescriptor::new("component---header").with_result(json!({"k": 1}), json!({"title": "T"})),
    )]);
    let resolved = resolve_slices(&loader, &map(), &data).await.unwrap();
    assert_eq!(resolved["site-header"].data, json!({"title": "T"}));
    assert_eq!(resolved["site-header"].slice_context, json!({"k": 1}));

    let err = resolve_slices(&loader, &map(), &BTreeMap::new()).await.unwrap_err();
    assert_eq!(err.code(), "MISSING_COLLABORATOR");
  }
}
