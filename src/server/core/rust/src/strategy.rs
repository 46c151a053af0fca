/* src/server/core/rust/src/strategy.rs */

use quill_markup::{Element, RenderError, render_to_pipeable_stream, render_to_string};

use crate::buffer::stream_to_buffer;

/// How body markup is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
  /// Push-based render collected through [`stream_to_buffer`].
  Streaming,
  /// Direct synchronous render.
  String,
}

impl RenderStrategy {
  pub fn from_capability(streaming: bool) -> Self {
    if streaming { Self::Streaming } else { Self::String }
  }

  /// Render `element`. A redirect raised while rendering yields `Ok(None)`.
  pub async fn render(self, element: Element) -> Result<Option<String>, RenderError> {
    tracing::debug!(strategy = ?self, "rendering body");
    let result = match self {
      Self::Streaming => render_streaming(element).await,
      Self::String => render_to_string(&element),
    };
    match result {
      Ok(html) => Ok(Some(html)),
      Err(RenderError::Redirect(to)) => {
        tracing::debug!(to = %to, "redirect during render, body left empty");
        Ok(None)
      }
      Err(error) => Err(error),
    }
  }
}

/// Render through the push-based renderer and wait for the whole output.
pub async fn render_streaming(element: Element) -> Result<String, RenderError> {
  let bytes = stream_to_buffer(|options| render_to_pipeable_stream(element, options)).await?;
  Ok(String::from_utf8(bytes.to_vec())?)
}
