/* src/server/core/rust/src/lib.rs */

pub mod buffer;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod head;
pub mod hooks;
pub mod html;
pub mod loader;
pub mod page_data;
pub mod request;
pub mod route;
pub mod server;
pub mod slices;
pub mod strategy;

// Re-exports for ergonomic use
pub use buffer::{BufferedOutput, WritableBuffer, stream_to_buffer, writable_buffer};
pub use config::{RenderConfig, load_render_config};
pub use diagnostics::Diagnostics;
pub use errors::{PageRenderError, PipelineError, PluginError};
pub use head::{HEAD_MARKER_ATTR, apply_head, head_props};
pub use hooks::{
  BoxFuture, ExtensionPoint, OnPreRenderHtmlArgs, OnRenderBodyArgs, Plugin, PluginRegistry,
  ReplaceRendererArgs, WrapPageElementArgs, WrapRootElementArgs,
};
pub use html::{BODY_MOUNT_ID, DefaultHtml, HtmlComponent, HtmlProps};
pub use loader::{ChunkLoader, ComponentLoader};
pub use page_data::{
  FsPageDataSource, NoPageData, PageDataLoader, PageDataSource, UNSAFE_PAGE_DATA_ACCESS,
  page_data_path,
};
pub use request::{
  PageData, PageRequest, RenderEnvironment, RequestContext, SliceDescriptor, SliceResult,
};
pub use route::{STATIC_QUERY_CONTEXT, page_props, router_element, static_query_binding};
pub use server::{RenderedPage, Renderer};
pub use slices::{SCRIPTS_SLICE_ID, SliceProps, SlicesContext, slice, slice_id};
pub use strategy::{RenderStrategy, render_streaming};

// Element model and document API used by plugins
pub use quill_engine::{DocumentModel, FragmentInput, ScriptAsset, StyleAsset};
pub use quill_markup::{Component, Element, FnComponent, RenderContext, RenderError, component_fn};

#[cfg(test)]
mod tests;
