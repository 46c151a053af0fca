/* src/server/markup/rust/src/render.rs */

use serde_json::Value;

use crate::context::RenderContext;
use crate::element::{Element, HostElement};
use crate::error::RenderError;
use crate::helpers::{
  attr_name, escape_html, is_html_boolean_attr, is_reserved_prop, is_truthy, is_void_element,
  stringify, style_string,
};

/// Destination of rendered markup. `boundary` is called after each
/// complete host element so chunked writers can cut there.
pub(crate) trait MarkupWriter {
  fn push_str(&mut self, s: &str);

  fn boundary(&mut self) {}
}

impl MarkupWriter for String {
  fn push_str(&mut self, s: &str) {
    String::push_str(self, s);
  }
}

/// Render an element tree to one HTML string, synchronously.
pub fn render_to_string(element: &Element) -> Result<String, RenderError> {
  let mut out = String::new();
  let mut cx = RenderContext::new();
  write_element(element, &mut cx, &mut out)?;
  Ok(out)
}

pub(crate) fn write_element<W: MarkupWriter>(
  element: &Element,
  cx: &mut RenderContext,
  out: &mut W,
) -> Result<(), RenderError> {
  match element {
    Element::Text(text) => out.push_str(&escape_html(text)),

    Element::Fragment(children) => {
      for child in children {
        write_element(child, cx, out)?;
      }
    }

    Element::Component(c) => {
      let rendered = c.component.render(&c.props, cx)?;
      write_element(&rendered, cx, out)?;
    }

    Element::Provider(p) => {
      cx.enter(&p.bindings);
      let result = write_element(&p.child, cx, out);
      cx.leave(p.bindings.len());
      result?;
    }

    Element::Host(host) => {
      write_open_tag(host, out);
      if is_void_element(&host.tag) {
        out.boundary();
        return Ok(());
      }
      if let Some(html) = &host.inner_html {
        out.push_str(html);
      } else {
        for child in &host.children {
          write_element(child, cx, out)?;
        }
      }
      out.push_str("</");
      out.push_str(&host.tag);
      out.push_str(">");
      out.boundary();
    }
  }
  Ok(())
}

fn write_open_tag<W: MarkupWriter>(host: &HostElement, out: &mut W) {
  out.push_str("<");
  out.push_str(&host.tag);
  for (name, value) in &host.attrs {
    if is_reserved_prop(name) {
      continue;
    }
    if let Some(rendered) = render_attr(attr_name(name), value) {
      out.push_str(&rendered);
    }
  }
  if is_void_element(&host.tag) {
    out.push_str("/>");
  } else {
    out.push_str(">");
  }
}

fn render_attr(name: &str, value: &Value) -> Option<String> {
  if name == "style" {
    if let Value::Object(style) = value {
      let css = style_string(style);
      return (!css.is_empty()).then(|| format!(r#" style="{}""#, escape_html(&css)));
    }
  }
  if is_html_boolean_attr(name) {
    // Boolean HTML attrs: truthy -> attr="", falsy -> omit
    return is_truthy(value).then(|| format!(r#" {name}="""#));
  }
  match value {
    Value::Null => None,
    // Plain booleans only survive on data-/aria- attributes
    Value::Bool(b) if name.starts_with("data-") || name.starts_with("aria-") => {
      Some(format!(r#" {name}="{b}""#))
    }
    Value::Bool(_) => None,
    other => Some(format!(r#" {}="{}""#, name, escape_html(&stringify(other)))),
  }
}

/// Expand components, fragments and providers until only host and text
/// elements remain at the top level. Children of hosts are left as-is.
pub fn expand_hosts(element: &Element, cx: &mut RenderContext) -> Result<Vec<Element>, RenderError> {
  let mut out = Vec::new();
  expand_into(element, cx, &mut out)?;
  Ok(out)
}

fn expand_into(
  element: &Element,
  cx: &mut RenderContext,
  out: &mut Vec<Element>,
) -> Result<(), RenderError> {
  match element {
    Element::Host(_) | Element::Text(_) => out.push(element.clone()),
    Element::Fragment(children) => {
      for child in children {
        expand_into(child, cx, out)?;
      }
    }
    Element::Component(c) => {
      let rendered = c.component.render(&c.props, cx)?;
      expand_into(&rendered, cx, out)?;
    }
    Element::Provider(p) => {
      cx.enter(&p.bindings);
      let result = expand_into(&p.child, cx, out);
      cx.leave(p.bindings.len());
      result?;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::component::component_fn;
  use crate::context::{ContextBinding, ContextKey};
  use serde_json::json;

  const GREETING: ContextKey = ContextKey::new("greeting");

  #[test]
  fn void_element_self_closes() {
    let el = Element::host("meta").attr("name", "generator").attr("content", "Quill 1.0");
    assert_eq!(render_to_string(&el).unwrap(), r#"<meta name="generator" content="Quill 1.0"/>"#);
  }

  #[test]
  fn text_is_escaped_inner_html_is_not() {
    let el = Element::host("div")
      .child(Element::text("<b>"))
      .child(Element::host("style").inner_html("a>b{color:red}"));
    assert_eq!(
      render_to_string(&el).unwrap(),
      "<div>&lt;b&gt;<style>a>b{color:red}</style></div>"
    );
  }

  #[test]
  fn boolean_and_aliased_attrs() {
    let el = Element::host("script").attr("src", "/poly.js").attr("noModule", true);
    assert_eq!(render_to_string(&el).unwrap(), r#"<script src="/poly.js" nomodule=""></script>"#);

    let el = Element::host("script").attr("async", false).attr("className", "x");
    assert_eq!(render_to_string(&el).unwrap(), r#"<script class="x"></script>"#);
  }

  #[test]
  fn aria_booleans_are_stringified() {
    let el = Element::host("div").attr("aria-atomic", true).attr("draggable", false);
    assert_eq!(render_to_string(&el).unwrap(), r#"<div aria-atomic="true"></div>"#);
  }

  #[test]
  fn style_object_serialized() {
    let el = Element::host("div").attr("style", json!({"outline": "none"})).attr("tabindex", -1);
    assert_eq!(render_to_string(&el).unwrap(), r#"<div style="outline:none" tabindex="-1"></div>"#);
  }

  #[test]
  fn components_read_contexts() {
    let hello = component_fn("Hello", |props, cx| {
      let greeting = cx.get::<String>(GREETING).cloned().unwrap_or_default();
      let name = props["name"].as_str().unwrap_or("nobody").to_string();
      Ok(Element::host("p").child(Element::text(format!("{greeting}, {name}"))))
    });
    let tree = Element::with_contexts(
      vec![ContextBinding::new(GREETING, "Hi".to_string())],
      Element::component(hello.clone(), json!({"name": "Ada"})),
    );
    assert_eq!(render_to_string(&tree).unwrap(), "<p>Hi, Ada</p>");

    // outside the provider the context is gone
    let bare = Element::component(hello, json!({}));
    assert_eq!(render_to_string(&bare).unwrap(), "<p>, nobody</p>");
  }

  #[test]
  fn component_errors_propagate() {
    let broken = component_fn("Broken", |_, _| Err(RenderError::redirect("/login")));
    let tree = Element::host("main").child(Element::component(broken, json!({})));
    let err = render_to_string(&tree).unwrap_err();
    assert!(err.is_redirect());
  }

  #[test]
  fn expand_hosts_flattens_components() {
    let head = component_fn("Head", |_, _| {
      Ok(Element::fragment([
        Element::host("title").child(Element::text("Home")),
        Element::fragment([Element::host("meta").attr("name", "description")]),
      ]))
    });
    let mut cx = RenderContext::new();
    let hosts = expand_hosts(&Element::component(head, json!({})), &mut cx).unwrap();
    let tags: Vec<_> = hosts.iter().filter_map(Element::tag).collect();
    assert_eq!(tags, vec!["title", "meta"]);
    assert_eq!(cx.depth(), 0);
  }
}
