/* src/server/markup/rust/src/component.rs */

use std::sync::Arc;

use serde_json::Value;

use crate::context::RenderContext;
use crate::element::Element;
use crate::error::RenderError;

/// A renderable unit supplied by application code.
pub trait Component: Send + Sync {
  fn name(&self) -> &str;

  fn render(&self, props: &Value, cx: &RenderContext) -> Result<Element, RenderError>;

  /// Elements this component contributes to the document head, if any.
  fn head(&self, _props: &Value, _cx: &RenderContext) -> Result<Option<Element>, RenderError> {
    Ok(None)
  }
}

pub type RenderFn = dyn Fn(&Value, &RenderContext) -> Result<Element, RenderError> + Send + Sync;

/// Component backed by closures.
pub struct FnComponent {
  name: String,
  render: Box<RenderFn>,
  head: Option<Box<RenderFn>>,
}

impl FnComponent {
  pub fn new<F>(name: impl Into<String>, render: F) -> Self
  where
    F: Fn(&Value, &RenderContext) -> Result<Element, RenderError> + Send + Sync + 'static,
  {
    Self { name: name.into(), render: Box::new(render), head: None }
  }

  pub fn with_head<F>(mut self, head: F) -> Self
  where
    F: Fn(&Value, &RenderContext) -> Result<Element, RenderError> + Send + Sync + 'static,
  {
    self.head = Some(Box::new(head));
    self
  }

  pub fn into_shared(self) -> Arc<dyn Component> {
    Arc::new(self)
  }
}

impl Component for FnComponent {
  fn name(&self) -> &str {
    &self.name
  }

  fn render(&self, props: &Value, cx: &RenderContext) -> Result<Element, RenderError> {
    (self.render)(props, cx)
  }

  fn head(&self, props: &Value, cx: &RenderContext) -> Result<Option<Element>, RenderError> {
    self.head.as_ref().map(|head| head(props, cx)).transpose()
  }
}

/// Shorthand for a closure component without a head export.
pub fn component_fn<F>(name: impl Into<String>, render: F) -> Arc<dyn Component>
where
  F: Fn(&Value, &RenderContext) -> Result<Element, RenderError> + Send + Sync + 'static,
{
  FnComponent::new(name, render).into_shared()
}
