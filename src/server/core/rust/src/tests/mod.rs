/* src/server/core/rust/src/tests/mod.rs */


use std::sync::Arc;

use serde_json::{Value, json};

use crate::{
  ChunkLoader, Component, Element, PageData, PageRequest, RenderConfig, Renderer, component_fn,
};

pub(super) const HOME_CHUNK: &str = "component---src-pages-index-js";

/// Page rendering `<main><h1>{data.title}</h1></main>`.
pub(super) fn home_page() -> Arc<dyn Component> {
  component_fn("Home", |props, _| {
    let title = props["data"]["title"].as_str().unwrap_or("untitled").to_string();
    Ok(Element::host("main").child(Element::host("h1").child(Element::text(title))))
  })
}

pub(super) fn home_request() -> PageRequest {
  PageRequest::new("/", PageData::new(HOME_CHUNK).with_result(json!({"data": {"title": "Hello"}})))
}

pub(super) fn renderer(config: RenderConfig) -> Renderer {
  Renderer::new(ChunkLoader::new().component(HOME_CHUNK, home_page())).config(config)
}

pub(super) fn string_config() -> RenderConfig {
  RenderConfig::default().with_streaming(false)
}

/// Value of `window.{name}=...;` inside the rendered document.
pub(super) fn window_value(html: &str, name: &str) -> Option<Value> {
  let marker = format!("window.{name}=");
  let start = html.find(&marker)? + marker.len();
  let rest = &html[start..];
  let end = [";window.", ";/*]]>*/"].iter().filter_map(|t| rest.find(t)).min()?;
  serde_json::from_str(&rest[..end]).ok()
}

/// Byte offset of `needle`, panicking with context when absent.
pub(super) fn position(html: &str, needle: &str) -> usize {
  html.find(needle).unwrap_or_else(|| panic!("`{needle}` not found in {html}"))
}
