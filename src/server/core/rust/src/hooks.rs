/* src/server/core/rust/src/hooks.rs */

//! Plugin extension points and the engine that runs them.
//!
//! Every point has a typed argument struct. Plugins that change the
//! document receive it as `&mut DocumentModel` for the duration of the
//! call only.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use quill_engine::{DocumentModel, ScriptAsset, StyleAsset};
use quill_markup::Element;
use serde_json::Value;

use crate::errors::{PipelineError, PluginError};
use crate::page_data::PageDataLoader;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionPoint {
  WrapPageElement,
  WrapRootElement,
  ReplaceRenderer,
  OnRenderBody,
  OnPreRenderHtml,
}

impl ExtensionPoint {
  pub const ALL: [Self; 5] = [
    Self::WrapPageElement,
    Self::WrapRootElement,
    Self::ReplaceRenderer,
    Self::OnRenderBody,
    Self::OnPreRenderHtml,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::WrapPageElement => "wrapPageElement",
      Self::WrapRootElement => "wrapRootElement",
      Self::ReplaceRenderer => "replaceRenderer",
      Self::OnRenderBody => "onRenderBody",
      Self::OnPreRenderHtml => "onPreRenderHTML",
    }
  }
}

impl fmt::Display for ExtensionPoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

pub struct WrapPageElementArgs<'a> {
  /// Page element as wrapped by earlier plugins.
  pub element: Element,
  pub props: &'a Value,
}

pub struct WrapRootElementArgs<'a> {
  /// Root element as wrapped by earlier plugins.
  pub element: Element,
  /// `None` when a slice is being rendered.
  pub pathname: Option<&'a str>,
}

pub struct ReplaceRendererArgs<'a> {
  /// Fully wrapped body element, ready to render.
  pub body_component: &'a Element,
  /// Call [`DocumentModel::replace_body_html`] to take over rendering.
  pub document: &'a mut DocumentModel,
  pub pathname: &'a str,
  pub path_prefix: &'a str,
}

pub struct OnRenderBodyArgs<'a> {
  pub document: &'a mut DocumentModel,
  pub pathname: &'a str,
  pub page_data: &'a PageDataLoader<'a>,
  pub body_html: &'a str,
  pub scripts: &'a [ScriptAsset],
  pub styles: &'a [StyleAsset],
  pub path_prefix: &'a str,
}

pub struct OnPreRenderHtmlArgs<'a> {
  pub document: &'a mut DocumentModel,
  pub pathname: &'a str,
  pub path_prefix: &'a str,
}

/// A bundle of callbacks for some of the extension points.
///
/// Only the points listed by [`Plugin::extension_points`] are invoked.
/// Every method defaults to "no opinion".
pub trait Plugin: Send + Sync {
  fn name(&self) -> &str;

  fn extension_points(&self) -> &[ExtensionPoint];

  fn wrap_page_element(&self, _args: &WrapPageElementArgs<'_>) -> Result<Option<Element>, PluginError> {
    Ok(None)
  }

  fn wrap_root_element(&self, _args: &WrapRootElementArgs<'_>) -> Result<Option<Element>, PluginError> {
    Ok(None)
  }

  fn replace_renderer<'a>(
    &'a self,
    _args: &'a mut ReplaceRendererArgs<'_>,
  ) -> BoxFuture<'a, Result<(), PluginError>> {
    Box::pin(std::future::ready(Ok(())))
  }

  fn on_render_body(&self, _args: &mut OnRenderBodyArgs<'_>) -> Result<(), PluginError> {
    Ok(())
  }

  fn on_pre_render_html(&self, _args: &mut OnPreRenderHtmlArgs<'_>) -> Result<(), PluginError> {
    Ok(())
  }
}

/// Registered plugins, indexed by extension point in registration order.
#[derive(Clone, Default)]
pub struct PluginRegistry {
  by_point: HashMap<ExtensionPoint, Vec<Arc<dyn Plugin>>>,
  count: usize,
}

impl PluginRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
    for point in plugin.extension_points() {
      let list = self.by_point.entry(*point).or_default();
      // a plugin listing a point twice still runs once
      if !list.iter().any(|p| Arc::ptr_eq(p, &plugin)) {
        list.push(plugin.clone());
      }
    }
    self.count += 1;
  }

  pub fn len(&self) -> usize {
    self.count
  }

  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  pub fn callbacks(&self, point: ExtensionPoint) -> &[Arc<dyn Plugin>] {
    self.by_point.get(&point).map_or(&[], Vec::as_slice)
  }

  /// Synchronous fold. Each callback sees `args` as rebuilt by `reduce`
  /// from the previous opinion; the last opinion wins. Without opinions
  /// the result is `initial`.
  pub fn run_sync<A, R>(
    &self,
    point: ExtensionPoint,
    mut args: A,
    initial: R,
    mut invoke: impl FnMut(&dyn Plugin, &A) -> Result<Option<R>, PluginError>,
    mut reduce: impl FnMut(A, &R) -> A,
  ) -> Result<R, PipelineError> {
    let mut acc = initial;
    for plugin in self.callbacks(point) {
      tracing::trace!(plugin = plugin.name(), %point, "invoking hook");
      match invoke(plugin.as_ref(), &args) {
        Ok(Some(result)) => {
          args = reduce(args, &result);
          acc = result;
        }
        Ok(None) => {}
        Err(source) => return Err(wrap(plugin.as_ref(), point, source)),
      }
    }
    Ok(acc)
  }

  /// Synchronous sequence without results. Stops at the first failure.
  pub fn run_each(
    &self,
    point: ExtensionPoint,
    mut invoke: impl FnMut(&dyn Plugin) -> Result<(), PluginError>,
  ) -> Result<(), PipelineError> {
    for plugin in self.callbacks(point) {
      tracing::trace!(plugin = plugin.name(), %point, "invoking hook");
      invoke(plugin.as_ref()).map_err(|source| wrap(plugin.as_ref(), point, source))?;
    }
    Ok(())
  }

  /// Asynchronous sequence: each callback is awaited before the next one
  /// starts, so later callbacks observe earlier document edits.
  pub async fn run_async<A>(
    &self,
    point: ExtensionPoint,
    args: &mut A,
    invoke: for<'p> fn(&'p dyn Plugin, &'p mut A) -> BoxFuture<'p, Result<(), PluginError>>,
  ) -> Result<(), PipelineError> {
    for plugin in self.callbacks(point) {
      tracing::trace!(plugin = plugin.name(), %point, "awaiting hook");
      invoke(plugin.as_ref(), args).await.map_err(|source| wrap(plugin.as_ref(), point, source))?;
    }
    Ok(())
  }
}

fn wrap(plugin: &dyn Plugin, point: ExtensionPoint, source: PluginError) -> PipelineError {
  PipelineError::Plugin { plugin: plugin.name().to_string(), point, source }
}

impl fmt::Debug for PluginRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut map = f.debug_map();
    for point in ExtensionPoint::ALL {
      let names: Vec<&str> = self.callbacks(point).iter().map(|p| p.name()).collect();
      if !names.is_empty() {
        map.entry(&point.as_str(), &names);
      }
    }
    map.finish()
  }
}
