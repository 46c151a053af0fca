/* src/server/markup/rust/src/element.rs */

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::component::Component;
use crate::context::ContextBinding;

/// Node of the tree handed to the renderers. Cloning is cheap for
/// components and contexts (shared handles), deep for host markup.
#[derive(Clone)]
pub enum Element {
  Host(HostElement),
  Text(String),
  Fragment(Vec<Element>),
  Component(ComponentElement),
  Provider(ProviderElement),
}

/// A concrete HTML tag.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct HostElement {
  pub tag: String,
  pub key: Option<String>,
  pub attrs: Map<String, Value>,
  pub children: Vec<Element>,
  /// Raw markup emitted verbatim in place of `children`.
  pub inner_html: Option<String>,
}

#[derive(Clone)]
pub struct ComponentElement {
  pub component: Arc<dyn Component>,
  pub props: Value,
  pub key: Option<String>,
}

/// Ambient context bindings (outermost first) around one child.
#[derive(Clone)]
pub struct ProviderElement {
  pub bindings: Vec<ContextBinding>,
  pub child: Box<Element>,
}

impl Element {
  pub fn host(tag: impl Into<String>) -> Self {
    Self::Host(HostElement { tag: tag.into(), ..HostElement::default() })
  }

  pub fn text(text: impl Into<String>) -> Self {
    Self::Text(text.into())
  }

  pub fn fragment(children: impl IntoIterator<Item = Element>) -> Self {
    Self::Fragment(children.into_iter().collect())
  }

  pub fn empty() -> Self {
    Self::Fragment(Vec::new())
  }

  pub fn component(component: Arc<dyn Component>, props: Value) -> Self {
    Self::Component(ComponentElement { component, props, key: None })
  }

  /// Wrap `child` in `bindings`, given outermost first. No bindings, no wrapper.
  pub fn with_contexts(bindings: Vec<ContextBinding>, child: Element) -> Self {
    if bindings.is_empty() {
      return child;
    }
    Self::Provider(ProviderElement { bindings, child: Box::new(child) })
  }

  // -- builders (no-ops on variants they do not apply to) --

  pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    if let Self::Host(host) = &mut self {
      host.attrs.insert(name.into(), value.into());
    }
    self
  }

  /// Spread an attribute object onto a host element. Non-objects are ignored.
  pub fn attrs(mut self, attrs: &Value) -> Self {
    if let (Self::Host(host), Value::Object(map)) = (&mut self, attrs) {
      for (name, value) in map {
        host.attrs.insert(name.clone(), value.clone());
      }
    }
    self
  }

  pub fn key(mut self, key: impl Into<String>) -> Self {
    match &mut self {
      Self::Host(host) => host.key = Some(key.into()),
      Self::Component(c) => c.key = Some(key.into()),
      _ => {}
    }
    self
  }

  pub fn child(mut self, child: Element) -> Self {
    if let Self::Host(host) = &mut self {
      host.children.push(child);
    }
    self
  }

  pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
    if let Self::Host(host) = &mut self {
      host.children.extend(children);
    }
    self
  }

  pub fn inner_html(mut self, html: impl Into<String>) -> Self {
    if let Self::Host(host) = &mut self {
      host.inner_html = Some(html.into());
    }
    self
  }

  // -- inspection --

  pub fn tag(&self) -> Option<&str> {
    match self {
      Self::Host(host) => Some(&host.tag),
      _ => None,
    }
  }

  /// Identity key used to de-duplicate fragments in one document region.
  pub fn identity(&self) -> Option<&str> {
    match self {
      Self::Host(host) => host.key.as_deref(),
      Self::Component(c) => c.key.as_deref(),
      _ => None,
    }
  }

  pub fn get_attr(&self, name: &str) -> Option<&Value> {
    match self {
      Self::Host(host) => host.attrs.get(name),
      _ => None,
    }
  }

  pub fn is_meta(&self) -> bool {
    self.tag() == Some("meta")
  }
}

impl fmt::Debug for Element {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Host(host) => fmt::Debug::fmt(host, f),
      Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
      Self::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
      Self::Component(c) => f
        .debug_struct("Component")
        .field("name", &c.component.name())
        .field("props", &c.props)
        .field("key", &c.key)
        .finish(),
      Self::Provider(p) => {
        f.debug_struct("Provider").field("bindings", &p.bindings).field("child", &p.child).finish()
      }
    }
  }
}

impl PartialEq for Element {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Host(a), Self::Host(b)) => a == b,
      (Self::Text(a), Self::Text(b)) => a == b,
      (Self::Fragment(a), Self::Fragment(b)) => a == b,
      (Self::Component(a), Self::Component(b)) => {
        Arc::ptr_eq(&a.component, &b.component) && a.props == b.props && a.key == b.key
      }
      (Self::Provider(a), Self::Provider(b)) => {
        a.bindings.len() == b.bindings.len()
          && a
            .bindings
            .iter()
            .zip(&b.bindings)
            .all(|(x, y)| x.key == y.key && Arc::ptr_eq(&x.value, &y.value))
          && a.child == b.child
      }
      _ => false,
    }
  }
}

impl From<HostElement> for Element {
  fn from(host: HostElement) -> Self {
    Self::Host(host)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn builder_sets_host_fields() {
    let el = Element::host("meta").attr("name", "generator").attr("content", "Quill").key("gen");
    assert_eq!(el.tag(), Some("meta"));
    assert_eq!(el.identity(), Some("gen"));
    assert_eq!(el.get_attr("name"), Some(&json!("generator")));
    assert!(el.is_meta());
  }

  #[test]
  fn builders_ignore_non_host() {
    let el = Element::text("hi").attr("id", "x").child(Element::text("y"));
    assert_eq!(el, Element::text("hi"));
    assert!(el.get_attr("id").is_none());
  }

  #[test]
  fn attrs_spread_preserves_order() {
    let el = Element::host("html").attrs(&json!({"lang": "en", "dir": "ltr"}));
    let Element::Host(host) = el else { panic!("expected host") };
    let names: Vec<&str> = host.attrs.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["lang", "dir"]);
  }

  #[test]
  fn with_contexts_without_bindings_is_transparent() {
    let child = Element::host("div");
    assert_eq!(Element::with_contexts(Vec::new(), child.clone()), child);
  }
}
