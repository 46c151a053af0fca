/* src/server/core/rust/src/errors.rs */

use quill_markup::RenderError;
use thiserror::Error;

use crate::diagnostics::Diagnostics;
use crate::hooks::ExtensionPoint;

/// Error raised by a plugin callback.
#[derive(Debug, Error)]
pub enum PluginError {
  /// Navigation signal. Not a failure: the pipeline drops body markup (or
  /// the rest of the hook run) and keeps assembling.
  #[error("redirect to {0}")]
  Redirect(String),

  #[error("{0}")]
  Failed(String),

  #[error(transparent)]
  Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PluginError {
  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed(message.into())
  }

  pub fn redirect(to: impl Into<String>) -> Self {
    Self::Redirect(to.into())
  }

  pub fn is_redirect(&self) -> bool {
    matches!(self, Self::Redirect(_))
  }
}

impl From<RenderError> for PluginError {
  fn from(error: RenderError) -> Self {
    match error {
      RenderError::Redirect(to) => Self::Redirect(to),
      other => Self::Other(Box::new(other)),
    }
  }
}

/// Everything that can abort one page or slice render.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("plugin `{plugin}` failed in {point}: {source}")]
  Plugin {
    plugin: String,
    point: ExtensionPoint,
    #[source]
    source: PluginError,
  },

  /// A component chunk, slice descriptor or wrapper could not be resolved.
  #[error("missing collaborator: {0}")]
  MissingCollaborator(String),

  #[error(transparent)]
  Render(#[from] RenderError),

  #[error("invalid configuration: {0}")]
  Config(String),
}

impl PipelineError {
  pub fn missing(what: impl Into<String>) -> Self {
    Self::MissingCollaborator(what.into())
  }

  /// True for the navigation signal, wherever it was raised.
  pub fn is_redirect(&self) -> bool {
    match self {
      Self::Plugin { source, .. } => source.is_redirect(),
      Self::Render(error) => error.is_redirect(),
      _ => false,
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      Self::Plugin { .. } => "PLUGIN_ERROR",
      Self::MissingCollaborator(_) => "MISSING_COLLABORATOR",
      Self::Render(error) => error.code(),
      Self::Config(_) => "CONFIG_ERROR",
    }
  }
}

/// Failure of a page render, with the diagnostics gathered before it.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct PageRenderError {
  #[source]
  pub source: PipelineError,
  pub diagnostics: Vec<String>,
}

impl PageRenderError {
  pub(crate) fn new(source: PipelineError, diagnostics: &Diagnostics) -> Self {
    Self { source, diagnostics: diagnostics.snapshot() }
  }

  pub fn code(&self) -> &'static str {
    self.source.code()
  }
}
