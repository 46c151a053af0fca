/* src/server/core/rust/src/html.rs */

use quill_markup::{Element, RenderError};
use serde_json::Value;

/// Everything the document wrapper receives.
#[derive(Debug, Clone)]
pub struct HtmlProps {
  pub head_components: Vec<Element>,
  pub html_attributes: Value,
  pub body_attributes: Value,
  pub pre_body_components: Vec<Element>,
  pub post_body_components: Vec<Element>,
  /// Rendered body markup, inserted verbatim.
  pub body: String,
  pub path: String,
  /// Extra props set by `onRenderBody` plugins.
  pub body_props: Value,
}

/// Builds the `<html>` element around the assembled document.
pub trait HtmlComponent: Send + Sync {
  fn render(&self, props: &HtmlProps) -> Result<Element, RenderError>;
}

/// Element id of the body mount point.
pub const BODY_MOUNT_ID: &str = "___quill";

/// Wrapper used when the application provides none.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHtml;

impl HtmlComponent for DefaultHtml {
  fn render(&self, props: &HtmlProps) -> Result<Element, RenderError> {
    let head = Element::host("head")
      .child(Element::host("meta").attr("charSet", "utf-8"))
      .child(Element::host("meta").attr("httpEquiv", "x-ua-compatible").attr("content", "ie=edge"))
      .child(
        Element::host("meta")
          .attr("name", "viewport")
          .attr("content", "width=device-width, initial-scale=1, shrink-to-fit=no"),
      )
      .children(props.head_components.iter().cloned());

    let body = Element::host("body")
      .attrs(&props.body_attributes)
      .children(props.pre_body_components.iter().cloned())
      .child(Element::host("div").key("body").attr("id", BODY_MOUNT_ID).inner_html(props.body.as_str()))
      .children(props.post_body_components.iter().cloned());

    Ok(Element::host("html").attrs(&props.html_attributes).child(head).child(body))
  }
}
