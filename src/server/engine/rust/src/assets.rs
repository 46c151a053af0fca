/* src/server/engine/rust/src/assets.rs */

//! Fragments the pipeline adds for bundled scripts, styles and embedded
//! page metadata once every body hook has run.

use std::collections::HashSet;

use quill_markup::Element;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::DocumentModel;
use crate::escape::script_safe_json;

/// `data-identity` shared by every inlined global stylesheet.
pub const GLOBAL_CSS_IDENTITY: &str = "quill-global-css";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptAsset {
  pub name: String,
  pub rel: String,
  /// Reference the script from a head `<link>` (preload/prefetch).
  #[serde(default)]
  pub should_generate_link: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleAsset {
  pub name: String,
  pub rel: String,
  #[serde(default)]
  pub content: String,
}

impl ScriptAsset {
  pub fn new(name: impl Into<String>, rel: impl Into<String>) -> Self {
    Self { name: name.into(), rel: rel.into(), should_generate_link: false }
  }

  pub fn with_link(mut self) -> Self {
    self.should_generate_link = true;
    self
  }

  pub fn is_prefetch(&self) -> bool {
    self.rel == "prefetch"
  }
}

impl StyleAsset {
  pub fn new(name: impl Into<String>, rel: impl Into<String>, content: impl Into<String>) -> Self {
    Self { name: name.into(), rel: rel.into(), content: content.into() }
  }

  pub fn is_prefetch(&self) -> bool {
    self.rel == "prefetch"
  }
}

/// Push a preload/prefetch `<link>` for every script flagged to get one,
/// in the order given.
pub fn append_script_links(doc: &mut DocumentModel, scripts: &[ScriptAsset], path_prefix: &str) {
  for script in scripts.iter().filter(|s| s.should_generate_link) {
    doc.push_head(
      Element::host("link")
        .attr("as", "script")
        .attr("rel", script.rel.as_str())
        .attr("href", format!("{path_prefix}/{}", script.name))
        .key(script.name.as_str()),
    );
  }
}

/// Prefetched styles become head links; all others are inlined. Inline
/// styles are prepended, so feeding them in reverse leaves them in
/// original order at the very front of the head.
pub fn append_styles(doc: &mut DocumentModel, styles: &[StyleAsset], path_prefix: &str) {
  for style in styles {
    let href = format!("{path_prefix}/{}", style.name);
    if style.is_prefetch() {
      doc.push_head(
        Element::host("link")
          .attr("as", "style")
          .attr("rel", style.rel.as_str())
          .attr("href", href)
          .key(style.name.as_str()),
      );
    } else {
      doc.unshift_head(
        Element::host("style")
          .attr("data-href", href)
          .attr("data-identity", GLOBAL_CSS_IDENTITY)
          .inner_html(style.content.as_str()),
      );
    }
  }
}

/// Inputs of the `window.*` metadata script.
#[derive(Debug, Clone, Copy)]
pub struct PageDataScript<'a> {
  pub page_path: &'a str,
  /// `None` in slice mode.
  pub compilation_hash: Option<&'a str>,
  /// Set when the page data is inlined into the document.
  pub page_data: Option<&'a Value>,
}

impl PageDataScript<'_> {
  pub fn source(&self) -> String {
    let mut out = String::from("/*<![CDATA[*/");
    out.push_str(&format!("window.pagePath={};", js_string(self.page_path)));
    if let Some(hash) = self.compilation_hash {
      out.push_str(&format!("window.___webpackCompilationHash={};", js_string(hash)));
    }
    if let Some(data) = self.page_data {
      out.push_str(&format!("window.pageData={};", script_safe_json(&data.to_string())));
    }
    out.push_str("/*]]>*/");
    out
  }

  pub fn element(&self) -> Element {
    Element::host("script")
      .attr("id", "quill-script-loader")
      .key("script-loader")
      .inner_html(self.source())
  }
}

fn js_string(value: &str) -> String {
  script_safe_json(&Value::String(value.to_string()).to_string())
}

/// `window.___chunkMapping` script.
pub fn chunk_mapping_script(chunk_mapping: &Value) -> Element {
  let source =
    format!("/*<![CDATA[*/window.___chunkMapping={};/*]]>*/", script_safe_json(&chunk_mapping.to_string()));
  Element::host("script").attr("id", "quill-chunk-mapping").key("chunk-mapping").inner_html(source)
}

/// Bundle `<script>` tags: no-module polyfills first, then every script
/// that is not merely prefetched, in the given order.
pub fn body_scripts(chunk_mapping: &Value, scripts: &[ScriptAsset], path_prefix: &str) -> Vec<Element> {
  let mut out = Vec::new();
  if let Some(polyfills) = chunk_mapping.get("polyfill").and_then(Value::as_array) {
    for script in polyfills.iter().filter_map(Value::as_str) {
      let src = format!("{path_prefix}{script}");
      out.push(Element::host("script").attr("src", src.as_str()).attr("noModule", true).key(src));
    }
  }
  for script in scripts.iter().filter(|s| !s.is_prefetch()) {
    // JSON-escape the name, minus the surrounding quotes
    let encoded = Value::String(script.name.clone()).to_string();
    let name = &encoded[1..encoded.len() - 1];
    let src = format!("{path_prefix}/{name}");
    out.push(Element::host("script").attr("src", src.as_str()).attr("async", true).key(src));
  }
  out
}

/// Drop fragments whose identity key already appeared earlier in the list.
pub fn dedupe_by_key(components: Vec<Element>) -> Vec<Element> {
  let mut seen = HashSet::new();
  components
    .into_iter()
    .filter(|el| match el.identity() {
      Some(key) => {
        let fresh = seen.insert(key.to_string());
        if !fresh {
          tracing::debug!(key, "dropping duplicate fragment");
        }
        fresh
      }
      None => true,
    })
    .collect()
}
