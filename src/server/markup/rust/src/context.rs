/* src/server/markup/rust/src/context.rs */

//! Ambient contexts: values bound around a subtree and visible to every
//! component rendered inside it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Name of an ambient context. Two bindings with the same key shadow each
/// other; the innermost wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey(&'static str);

impl ContextKey {
  pub const fn new(name: &'static str) -> Self {
    Self(name)
  }

  pub fn name(&self) -> &'static str {
    self.0
  }
}

pub type ContextValue = Arc<dyn Any + Send + Sync>;

/// One key/value pair attached to a subtree.
#[derive(Clone)]
pub struct ContextBinding {
  pub key: ContextKey,
  pub value: ContextValue,
}

impl ContextBinding {
  pub fn new<T: Any + Send + Sync>(key: ContextKey, value: T) -> Self {
    Self { key, value: Arc::new(value) }
  }

  pub fn shared<T: Any + Send + Sync>(key: ContextKey, value: Arc<T>) -> Self {
    Self { key, value }
  }
}

impl fmt::Debug for ContextBinding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ContextBinding").field("key", &self.key.name()).finish_non_exhaustive()
  }
}

/// Stack of bindings active at the current render position.
#[derive(Default, Clone)]
pub struct RenderContext {
  stack: Vec<ContextBinding>,
}

impl RenderContext {
  pub fn new() -> Self {
    Self::default()
  }

  /// Innermost value bound under `key`, if it has type `T`.
  pub fn get<T: Any>(&self, key: ContextKey) -> Option<&T> {
    self
      .stack
      .iter()
      .rev()
      .find(|binding| binding.key == key)
      .and_then(|binding| (*binding.value).downcast_ref::<T>())
  }

  pub fn contains(&self, key: ContextKey) -> bool {
    self.stack.iter().any(|binding| binding.key == key)
  }

  pub fn depth(&self) -> usize {
    self.stack.len()
  }

  /// Bindings are given outermost first.
  pub(crate) fn enter(&mut self, bindings: &[ContextBinding]) {
    self.stack.extend(bindings.iter().cloned());
  }

  pub(crate) fn leave(&mut self, count: usize) {
    let keep = self.stack.len().saturating_sub(count);
    self.stack.truncate(keep);
  }
}

impl fmt::Debug for RenderContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.stack.iter().map(|b| b.key.name())).finish()
  }
}
