/* src/server/core/rust/src/loader.rs */

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use parking_lot::Mutex;
use quill_markup::Component;

use crate::errors::PipelineError;
use crate::hooks::BoxFuture;

/// Resolves a component chunk name to its component.
pub trait ComponentLoader: Send + Sync {
  fn load<'a>(&'a self, chunk_name: &'a str) -> BoxFuture<'a, Result<Arc<dyn Component>, PipelineError>>;
}

type ChunkFactory =
  Arc<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn Component>, PipelineError>> + Send + Sync>;

/// Loader over a fixed set of async chunk factories. Each chunk is loaded
/// at most once per successful factory call and then served from memory.
#[derive(Default)]
pub struct ChunkLoader {
  factories: HashMap<String, ChunkFactory>,
  cache: Mutex<HashMap<String, Arc<dyn Component>>>,
}

impl ChunkLoader {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn chunk<F, Fut>(mut self, name: impl Into<String>, factory: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn Component>, PipelineError>> + Send + 'static,
  {
    self.factories.insert(name.into(), Arc::new(move || factory().boxed()));
    self
  }

  /// Register an already constructed component.
  pub fn component(self, name: impl Into<String>, component: Arc<dyn Component>) -> Self {
    self.chunk(name, move || futures_util::future::ready(Ok(component.clone())))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.factories.contains_key(name)
  }

  pub fn loaded(&self) -> usize {
    self.cache.lock().len()
  }
}

impl ComponentLoader for ChunkLoader {
  fn load<'a>(&'a self, chunk_name: &'a str) -> BoxFuture<'a, Result<Arc<dyn Component>, PipelineError>> {
    async move {
      let cached = self.cache.lock().get(chunk_name).cloned();
      if let Some(component) = cached {
        return Ok(component);
      }

      let factory = self
        .factories
        .get(chunk_name)
        .cloned()
        .ok_or_else(|| PipelineError::missing(format!("component chunk `{chunk_name}`")))?;
      let component = factory().await?;
      tracing::debug!(chunk = chunk_name, "component chunk loaded");

      // a concurrent load may have finished first; keep that one
      let mut cache = self.cache.lock();
      Ok(cache.entry(chunk_name.to_string()).or_insert(component).clone())
    }
    .boxed()
  }
}
