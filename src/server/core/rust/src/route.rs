/* src/server/core/rust/src/route.rs */

//! Routing shell around the page element.

use quill_markup::{ContextBinding, ContextKey, Element};
use serde_json::{Map, Value, json};

use crate::request::PageRequest;

/// Static query results, bound around every page and slice render.
pub const STATIC_QUERY_CONTEXT: ContextKey = ContextKey::new("staticQuery");

pub const FOCUS_WRAPPER_ID: &str = "quill-focus-wrapper";
pub const ANNOUNCER_ID: &str = "quill-announcer";

pub fn static_query_binding(value: Value) -> ContextBinding {
  ContextBinding::new(STATIC_QUERY_CONTEXT, value)
}

/// `{base_path}{page_path}`.
pub fn location_pathname(request: &PageRequest, base_path: &str) -> String {
  format!("{base_path}{}", request.page_path)
}

/// Props of the page component: the page result, the routed location and
/// the params carried in `pageContext.__params`.
pub fn page_props(request: &PageRequest, base_path: &str) -> Value {
  let mut props = Map::new();
  props.insert("location".to_string(), json!({ "pathname": location_pathname(request, base_path) }));
  if let Value::Object(result) = &request.page_data.result {
    props.extend(result.iter().map(|(k, v)| (k.clone(), v.clone())));
  }
  props.insert("params".to_string(), Value::Object(request.page_data.route_params()));
  Value::Object(props)
}

/// Focusable container the client router moves focus to on navigation.
pub fn focus_wrapper(page: Element) -> Element {
  Element::host("div")
    .attr("id", FOCUS_WRAPPER_ID)
    .attr("style", json!({ "outline": "none" }))
    .attr("tabIndex", -1)
    .child(page)
}

/// Visually hidden live region announcing client-side navigations.
pub fn route_announcer() -> Element {
  Element::host("div")
    .attr("id", ANNOUNCER_ID)
    .attr(
      "style",
      json!({
        "position": "absolute",
        "top": 0,
        "width": 1,
        "height": 1,
        "padding": 0,
        "overflow": "hidden",
        "clip": "rect(0, 0, 0, 0)",
        "whiteSpace": "nowrap",
        "border": 0
      }),
    )
    .attr("aria-live", "assertive")
    .attr("aria-atomic", "true")
}

pub fn router_element(page: Element) -> Element {
  Element::fragment([focus_wrapper(page), route_announcer()])
}
