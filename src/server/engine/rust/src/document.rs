/* src/server/engine/rust/src/document.rs */

use quill_markup::Element;
use serde_json::Value;

use crate::merge::deep_merge;
use crate::reorder::reorder_head_components;
use crate::sanitize::{FragmentInput, sanitize};

/// The document being assembled for one page render. Owned by a single
/// invocation; hooks receive it by reference.
///
/// Every fragment list is flat: all input passes through [`sanitize`].
#[derive(Debug, Clone)]
pub struct DocumentModel {
  head_components: Vec<Element>,
  html_attributes: Value,
  body_attributes: Value,
  pre_body_components: Vec<Element>,
  post_body_components: Vec<Element>,
  body_props: Value,
  body_html: String,
  asset_prefix: Option<String>,
}

/// Fields of a finished [`DocumentModel`].
#[derive(Debug, Clone)]
pub struct DocumentParts {
  pub head_components: Vec<Element>,
  pub html_attributes: Value,
  pub body_attributes: Value,
  pub pre_body_components: Vec<Element>,
  pub post_body_components: Vec<Element>,
  pub body_props: Value,
  pub body_html: String,
}

impl Default for DocumentModel {
  fn default() -> Self {
    Self::new(None)
  }
}

impl DocumentModel {
  pub fn new(asset_prefix: Option<String>) -> Self {
    Self {
      head_components: Vec::new(),
      html_attributes: Value::Object(Default::default()),
      body_attributes: Value::Object(Default::default()),
      pre_body_components: Vec::new(),
      post_body_components: Vec::new(),
      body_props: Value::Object(Default::default()),
      body_html: String::new(),
      asset_prefix,
    }
  }

  fn sanitize(&self, input: impl Into<FragmentInput>) -> Vec<Element> {
    sanitize(input, self.asset_prefix.as_deref())
  }

  // -- head --

  pub fn set_head_components(&mut self, components: impl Into<FragmentInput>) {
    let sanitized = self.sanitize(components);
    self.head_components.extend(sanitized);
  }

  pub fn head_components(&self) -> &[Element] {
    &self.head_components
  }

  pub fn replace_head_components(&mut self, components: impl Into<FragmentInput>) {
    self.head_components = self.sanitize(components);
  }

  // -- pre-body --

  pub fn set_pre_body_components(&mut self, components: impl Into<FragmentInput>) {
    let sanitized = self.sanitize(components);
    self.pre_body_components.extend(sanitized);
  }

  pub fn pre_body_components(&self) -> &[Element] {
    &self.pre_body_components
  }

  pub fn replace_pre_body_components(&mut self, components: impl Into<FragmentInput>) {
    self.pre_body_components = self.sanitize(components);
  }

  // -- post-body --

  pub fn set_post_body_components(&mut self, components: impl Into<FragmentInput>) {
    let sanitized = self.sanitize(components);
    self.post_body_components.extend(sanitized);
  }

  pub fn post_body_components(&self) -> &[Element] {
    &self.post_body_components
  }

  pub fn replace_post_body_components(&mut self, components: impl Into<FragmentInput>) {
    self.post_body_components = self.sanitize(components);
  }

  // -- attribute trees --

  pub fn set_html_attributes(&mut self, attributes: &Value) {
    self.html_attributes = deep_merge(&self.html_attributes, attributes);
  }

  pub fn html_attributes(&self) -> &Value {
    &self.html_attributes
  }

  pub fn set_body_attributes(&mut self, attributes: &Value) {
    self.body_attributes = deep_merge(&self.body_attributes, attributes);
  }

  pub fn body_attributes(&self) -> &Value {
    &self.body_attributes
  }

  pub fn set_body_props(&mut self, props: &Value) {
    self.body_props = deep_merge(&self.body_props, props);
  }

  pub fn body_props(&self) -> &Value {
    &self.body_props
  }

  // -- body markup --

  pub fn replace_body_html(&mut self, html: impl Into<String>) {
    self.body_html = html.into();
  }

  pub fn body_html(&self) -> &str {
    &self.body_html
  }

  pub fn has_body_html(&self) -> bool {
    !self.body_html.is_empty()
  }

  // -- pipeline-only edits (bypass the sanitizer: single trusted fragments) --

  pub fn push_head(&mut self, element: Element) {
    self.head_components.push(element);
  }

  pub fn unshift_head(&mut self, element: Element) {
    self.head_components.insert(0, element);
  }

  pub fn push_post_body(&mut self, element: Element) {
    self.post_body_components.push(element);
  }

  pub fn reorder_head(&mut self) {
    let head = std::mem::take(&mut self.head_components);
    self.head_components = reorder_head_components(head);
  }

  pub fn into_parts(self) -> DocumentParts {
    DocumentParts {
      head_components: self.head_components,
      html_attributes: self.html_attributes,
      body_attributes: self.body_attributes,
      pre_body_components: self.pre_body_components,
      post_body_components: self.post_body_components,
      body_props: self.body_props,
      body_html: self.body_html,
    }
  }
}
