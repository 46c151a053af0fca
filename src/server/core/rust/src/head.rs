/* src/server/core/rust/src/head.rs */

//! Head elements exported by page components.

use std::sync::Arc;

use quill_engine::DocumentModel;
use quill_markup::{Component, Element, RenderContext, RenderError, expand_hosts};
use serde_json::{Value, json};

use crate::request::PageRequest;
use crate::route::{location_pathname, static_query_binding};

const ALLOWED_HEAD_TAGS: &[&str] = &["title", "meta", "link", "style", "script", "noscript", "base"];

/// Marks head elements contributed by a page's head export.
pub const HEAD_MARKER_ATTR: &str = "data-quill-head";

/// Props a head export renders with.
pub fn head_props(request: &PageRequest, base_path: &str) -> Value {
  let result = &request.page_data.result;
  json!({
    "location": { "pathname": location_pathname(request, base_path) },
    "params": Value::Object(request.page_data.route_params()),
    "data": result.get("data").cloned().unwrap_or_else(|| json!({})),
    "serverData": result.get("serverData").cloned().unwrap_or(Value::Null),
    "pageContext": result.get("pageContext").cloned().unwrap_or_else(|| json!({})),
  })
}

/// Renders a component's head export in place of its body.
struct HeadExport(Arc<dyn Component>);

impl Component for HeadExport {
  fn name(&self) -> &str {
    self.0.name()
  }

  fn render(&self, props: &Value, cx: &RenderContext) -> Result<Element, RenderError> {
    Ok(self.0.head(props, cx)?.unwrap_or_else(Element::empty))
  }
}

/// Render `page`'s head export and fold it into `document`: `<html>` and
/// `<body>` attributes are merged, allowed head tags are appended, and
/// anything else is dropped with a warning.
pub fn apply_head(
  page: &Arc<dyn Component>,
  props: Value,
  static_query: &Value,
  document: &mut DocumentModel,
) -> Result<(), RenderError> {
  let element = Element::with_contexts(
    vec![static_query_binding(static_query.clone())],
    Element::component(Arc::new(HeadExport(page.clone())), props),
  );
  let hosts = expand_hosts(&element, &mut RenderContext::new())?;

  let mut accepted = Vec::new();
  for el in hosts {
    let Element::Host(host) = el else {
      continue;
    };
    let tag = host.tag.clone();
    match tag.as_str() {
      "html" => document.set_html_attributes(&Value::Object(host.attrs)),
      "body" => document.set_body_attributes(&Value::Object(host.attrs)),
      allowed if ALLOWED_HEAD_TAGS.contains(&allowed) => {
        accepted.push(Element::Host(host).attr(HEAD_MARKER_ATTR, true));
      }
      other => {
        tracing::warn!(component = page.name(), tag = other, "head export returned an element that is not allowed in <head>");
      }
    }
  }
  document.set_head_components(accepted);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use quill_markup::{FnComponent, render_to_string};

  use crate::request::PageData;
  use crate::route::STATIC_QUERY_CONTEXT;

  fn page_with_head() -> Arc<dyn Component> {
    FnComponent::new("Post", |_, _| Ok(Element::text("body")))
      .with_head(|props, cx| {
        let site = cx
          .get::<Value>(STATIC_QUERY_CONTEXT)
          .and_then(|q| q["site"].as_str())
          .unwrap_or("?")
          .to_string();
        let title = format!("{} | {site}", props["data"]["title"].as_str().unwrap_or_default());
        Ok(Element::fragment([
          Element::host("html").attr("lang", "en"),
          Element::host("body").attr("className", "post"),
          Element::host("title").child(Element::text(title)),
          Element::host("meta").attr("name", "description").attr("content", "A post"),
          Element::host("div").attr("id", "stray"),
        ]))
      })
      .into_shared()
  }

  #[test]
  fn head_export_is_folded_into_document() {
    let request = PageRequest::new("/post/", PageData::new("post").with_result(json!({"data": {"title": "Hi"}})));
    let mut document = DocumentModel::default();
    apply_head(&page_with_head(), head_props(&request, ""), &json!({"site": "Quill"}), &mut document).unwrap();

    assert_eq!(document.html_attributes(), &json!({"lang": "en"}));
    assert_eq!(document.body_attributes(), &json!({"className": "post"}));
    let head = document.head_components();
    assert_eq!(head.len(), 2);
    assert_eq!(head[0].tag(), Some("title"));
    assert_eq!(head[0].get_attr(HEAD_MARKER_ATTR), Some(&json!(true)));
    assert_eq!(
      render_to_string(&head[0]).unwrap(),
      r#"<title data-quill-head="true">Hi | Quill</title>"#
    );
    assert_eq!(head[1].tag(), Some("meta"));
  }

  #[test]
  fn components_without_head_change_nothing() {
    let page = quill_markup::component_fn("Plain", |_, _| Ok(Element::empty()));
    let mut document = DocumentModel::default();
    apply_head(&page, json!({}), &json!({}), &mut document).unwrap();
    assert!(document.head_components().is_empty());
    assert_eq!(document.html_attributes(), &json!({}));
  }

  #[test]
  fn head_props_shape() {
    let request = PageRequest::new(
      "/a/",
      PageData::new("a").with_result(json!({"serverData": {"n": 1}, "pageContext": {"__params": {"id": "1"}}})),
    );
    let props = head_props(&request, "/base");
    assert_eq!(props["location"]["pathname"], json!("/base/a/"));
    assert_eq!(props["params"], json!({"id": "1"}));
    assert_eq!(props["serverData"], json!({"n": 1}));
    assert_eq!(props["data"], json!({}));
  }
}
