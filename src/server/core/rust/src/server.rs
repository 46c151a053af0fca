/* src/server/core/rust/src/server.rs */

use std::sync::Arc;

use quill_engine::{
  DocumentModel, PageDataScript, append_script_links, append_styles, body_scripts,
  chunk_mapping_script, dedupe_by_key,
};
use quill_markup::{Element, RenderError, render_to_string};
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::config::RenderConfig;
use crate::diagnostics::Diagnostics;
use crate::errors::{PageRenderError, PipelineError};
use crate::head::{apply_head, head_props};
use crate::hooks::{
  ExtensionPoint, OnPreRenderHtmlArgs, OnRenderBodyArgs, Plugin, PluginRegistry, ReplaceRendererArgs,
  WrapPageElementArgs, WrapRootElementArgs,
};
use crate::html::{DefaultHtml, HtmlComponent, HtmlProps};
use crate::loader::ComponentLoader;
use crate::page_data::{NoPageData, PageDataLoader, PageDataSource};
use crate::request::{PageRequest, RenderEnvironment, SliceDescriptor};
use crate::route::{page_props, router_element, static_query_binding};
use crate::slices::{
  SCRIPTS_SLICE_ID, SliceProps, page_slice_bindings, resolve_slices, server_slice_placeholder,
  slices_binding,
};
use crate::strategy::{RenderStrategy, render_streaming};

/// Output of one page render.
#[derive(Debug, Clone)]
pub struct RenderedPage {
  pub html: String,
  /// Non-fatal events recorded while rendering.
  pub diagnostics: Vec<String>,
  /// Props each placed slice received, keyed by slice id.
  pub slice_props: Value,
}

/// Entry point: renders pages and standalone slices.
pub struct Renderer {
  loader: Arc<dyn ComponentLoader>,
  plugins: PluginRegistry,
  html: Arc<dyn HtmlComponent>,
  page_data_source: Arc<dyn PageDataSource>,
  config: RenderConfig,
}

impl Renderer {
  pub fn new(loader: impl ComponentLoader + 'static) -> Self {
    Self {
      loader: Arc::new(loader),
      plugins: PluginRegistry::new(),
      html: Arc::new(DefaultHtml),
      page_data_source: Arc::new(NoPageData),
      config: RenderConfig::default(),
    }
  }

  pub fn config(mut self, config: RenderConfig) -> Self {
    self.config = config;
    self
  }

  pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
    self.plugins.register(Arc::new(plugin));
    self
  }

  pub fn shared_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
    self.plugins.register(plugin);
    self
  }

  /// Replace the default document wrapper.
  pub fn html(mut self, html: impl HtmlComponent + 'static) -> Self {
    self.html = Arc::new(html);
    self
  }

  pub fn page_data_source(mut self, source: impl PageDataSource + 'static) -> Self {
    self.page_data_source = Arc::new(source);
    self
  }

  pub fn render_config(&self) -> &RenderConfig {
    &self.config
  }

  pub fn plugins(&self) -> &PluginRegistry {
    &self.plugins
  }

  /// Assemble the full HTML document of one page.
  pub async fn render_page(&self, request: &PageRequest) -> Result<RenderedPage, PageRenderError> {
    let diagnostics = Diagnostics::new();
    let span = tracing::debug_span!("render_page", path = %request.page_path);
    match self.assemble(request, &diagnostics).instrument(span).await {
      Ok((html, slice_props)) => {
        Ok(RenderedPage { html, diagnostics: diagnostics.into_records(), slice_props })
      }
      Err(source) => Err(PageRenderError::new(source, &diagnostics)),
    }
  }

  /// Render one slice outside of any page. Only `wrapRootElement` plugins
  /// take part; the output is body markup, not a document.
  pub async fn render_slice(
    &self,
    slice: &SliceDescriptor,
    static_query_context: &Value,
    props: &Value,
  ) -> Result<String, PipelineError> {
    let span = tracing::debug_span!("render_slice", slice = slice.label());
    async move {
      let component = self.loader.load(&slice.component_chunk_name).await?;

      let mut slice_props = Map::new();
      slice_props.insert("sliceContext".to_string(), slice.context.clone());
      if let Value::Object(extra) = props {
        slice_props.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
      }
      let element = Element::with_contexts(
        vec![
          slices_binding(RenderEnvironment::Slices, Some(slice.clone())),
          static_query_binding(static_query_context.clone()),
        ],
        Element::component(component, Value::Object(slice_props)),
      );

      let wrapped = self.wrap_root(element, None)?;
      Ok::<_, PipelineError>(render_streaming(wrapped).await?)
    }
    .instrument(span)
    .await
  }

  fn wrap_page(&self, element: Element, props: &Value) -> Result<Element, PipelineError> {
    let args = WrapPageElementArgs { element: element.clone(), props };
    self.plugins.run_sync(
      ExtensionPoint::WrapPageElement,
      args,
      element,
      |plugin, args| plugin.wrap_page_element(args),
      |args, wrapped| WrapPageElementArgs { element: wrapped.clone(), ..args },
    )
  }

  fn wrap_root(&self, element: Element, pathname: Option<&str>) -> Result<Element, PipelineError> {
    let args = WrapRootElementArgs { element: element.clone(), pathname };
    self.plugins.run_sync(
      ExtensionPoint::WrapRootElement,
      args,
      element,
      |plugin, args| plugin.wrap_root_element(args),
      |args, wrapped| WrapRootElementArgs { element: wrapped.clone(), ..args },
    )
  }

  /// Page element, shell and root wrapping. `None` after a redirect.
  fn build_body(
    &self,
    request: &PageRequest,
    page: Element,
    props: &Value,
  ) -> Result<Option<Element>, PipelineError> {
    let wrapped_page = match self.wrap_page(page, props) {
      Ok(element) => element,
      Err(e) if e.is_redirect() => {
        log_redirect(ExtensionPoint::WrapPageElement, &e);
        return Ok(None);
      }
      Err(e) => return Err(e),
    };
    match self.wrap_root(router_element(wrapped_page), Some(&request.page_path)) {
      Ok(element) => Ok(Some(element)),
      Err(e) if e.is_redirect() => {
        log_redirect(ExtensionPoint::WrapRootElement, &e);
        Ok(None)
      }
      Err(e) => Err(e),
    }
  }

  #[allow(clippy::too_many_lines)]
  async fn assemble(
    &self,
    request: &PageRequest,
    diagnostics: &Diagnostics,
  ) -> Result<(String, Value), PipelineError> {
    let config = &self.config;
    let pathname = request.page_path.as_str();
    let path_prefix = config.path_prefix.as_str();
    let environment = request.context.render_environment();
    let page_data = &request.page_data;

    let mut document = DocumentModel::new(config.asset_prefix.clone());
    document.push_head(generator_meta(&config.generator));

    let page_component = self.loader.load(&page_data.component_chunk_name).await?;
    swallow_redirect(apply_head(
      &page_component,
      head_props(request, &config.base_path),
      &request.static_query_context,
      &mut document,
    ))?;

    let props = page_props(request, &config.base_path);
    let page = Element::component(page_component, props.clone());
    let slice_props = Arc::new(SliceProps::new());

    if let Some(mut body) = self.build_body(request, page, &props)? {
      if config.slices {
        let results = match environment {
          RenderEnvironment::Engines => {
            Some(resolve_slices(self.loader.as_ref(), &page_data.slices_map, &request.slice_data).await?)
          }
          _ => None,
        };
        let bindings =
          page_slice_bindings(environment, results, slice_props.clone(), page_data.slices_map.clone());
        body = Element::with_contexts(bindings, body);
      }
      let body_component =
        Element::with_contexts(vec![static_query_binding(request.static_query_context.clone())], body);

      let mut args = ReplaceRendererArgs {
        body_component: &body_component,
        document: &mut document,
        pathname,
        path_prefix,
      };
      let replaced = self
        .plugins
        .run_async(ExtensionPoint::ReplaceRenderer, &mut args, |plugin, args| plugin.replace_renderer(args))
        .await;
      let aborted = match replaced {
        Ok(()) => false,
        Err(e) if e.is_redirect() => {
          tracing::debug!(point = %ExtensionPoint::ReplaceRenderer, error = %e, "redirect, body left as is");
          true
        }
        Err(e) => return Err(e),
      };

      if !aborted && !document.has_body_html() {
        let strategy = RenderStrategy::from_capability(config.streaming);
        if let Some(html) = strategy.render(body_component).await? {
          document.replace_body_html(html);
        }
      }
    }

    let body_html = document.body_html().to_string();
    let loader = PageDataLoader::new(pathname, page_data, self.page_data_source.as_ref(), diagnostics);
    let mut args = OnRenderBodyArgs {
      document: &mut document,
      pathname,
      page_data: &loader,
      body_html: &body_html,
      scripts: &request.scripts,
      styles: &request.styles,
      path_prefix,
    };
    tolerate_redirect(
      ExtensionPoint::OnRenderBody,
      self.plugins.run_each(ExtensionPoint::OnRenderBody, |plugin| plugin.on_render_body(&mut args)),
    )?;

    append_script_links(&mut document, &request.reversed_scripts, path_prefix);
    append_styles(&mut document, &request.reversed_styles, path_prefix);

    let inlined = if request.inline_page_data { serde_json::to_value(page_data).ok() } else { None };
    let loader_script = PageDataScript {
      page_path: pathname,
      compilation_hash: (!config.slices).then_some(request.webpack_compilation_hash.as_str()),
      page_data: inlined.as_ref(),
    };
    document.push_post_body(loader_script.element());

    if config.slices {
      document.push_post_body(server_slice_placeholder(SCRIPTS_SLICE_ID));
    } else {
      document.push_post_body(chunk_mapping_script(&config.chunk_mapping));
      for script in body_scripts(&config.chunk_mapping, &request.scripts, path_prefix) {
        document.push_post_body(script);
      }
    }

    document.reorder_head();

    let mut args = OnPreRenderHtmlArgs { document: &mut document, pathname, path_prefix };
    tolerate_redirect(
      ExtensionPoint::OnPreRenderHtml,
      self.plugins.run_each(ExtensionPoint::OnPreRenderHtml, |plugin| plugin.on_pre_render_html(&mut args)),
    )?;

    let parts = document.into_parts();
    let html_props = HtmlProps {
      head_components: dedupe_by_key(parts.head_components),
      html_attributes: parts.html_attributes,
      body_attributes: parts.body_attributes,
      pre_body_components: dedupe_by_key(parts.pre_body_components),
      post_body_components: dedupe_by_key(parts.post_body_components),
      body: parts.body_html,
      path: pathname.to_string(),
      body_props: parts.body_props,
    };
    let mut html_element = self.html.render(&html_props)?;
    if config.slices {
      html_element = Element::with_contexts(vec![slices_binding(environment, None)], html_element);
    }

    let markup = render_to_string(&html_element)?;
    Ok((format!("<!DOCTYPE html>{markup}"), slice_props.snapshot()))
  }
}

fn generator_meta(version: &str) -> Element {
  Element::host("meta")
    .attr("name", "generator")
    .attr("content", format!("Quill {version}"))
    .key(format!("generator-{version}"))
}

fn log_redirect(point: ExtensionPoint, error: &PipelineError) {
  tracing::debug!(%point, %error, "redirect, rendering without body");
}

/// A redirect stops the remaining callbacks of `point` and nothing else.
fn tolerate_redirect(point: ExtensionPoint, result: Result<(), PipelineError>) -> Result<(), PipelineError> {
  match result {
    Err(e) if e.is_redirect() => {
      tracing::debug!(%point, error = %e, "redirect, remaining callbacks skipped");
      Ok(())
    }
    other => other,
  }
}

fn swallow_redirect(result: Result<(), RenderError>) -> Result<(), PipelineError> {
  match result {
    Err(RenderError::Redirect(to)) => {
      tracing::debug!(to = %to, "redirect from head export ignored");
      Ok(())
    }
    other => Ok(other?),
  }
}
