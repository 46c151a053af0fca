/* src/server/markup/rust/src/error.rs */

use thiserror::Error;

/// Failure raised while turning an element tree into markup.
#[derive(Debug, Error)]
pub enum RenderError {
  /// Navigation requested from inside a component. Not a failure of the
  /// document; callers decide whether to swallow it.
  #[error("redirect to `{0}`")]
  Redirect(String),

  #[error("component `{component}` failed: {message}")]
  Component { component: String, message: String },

  #[error("unsupported: {0}")]
  Unsupported(String),

  #[error("render stream closed before completion")]
  StreamClosed,

  #[error("rendered markup is not valid UTF-8: {0}")]
  Encoding(#[from] std::string::FromUtf8Error),
}

impl RenderError {
  pub fn redirect(to: impl Into<String>) -> Self {
    Self::Redirect(to.into())
  }

  pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Component { component: component.into(), message: message.into() }
  }

  pub fn is_redirect(&self) -> bool {
    matches!(self, Self::Redirect(_))
  }

  pub fn code(&self) -> &'static str {
    match self {
      Self::Redirect(_) => "REDIRECT",
      Self::Component { .. } => "COMPONENT_ERROR",
      Self::Unsupported(_) => "UNSUPPORTED",
      Self::StreamClosed => "STREAM_CLOSED",
      Self::Encoding(_) => "ENCODING_ERROR",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn redirect_is_classified() {
    assert!(RenderError::redirect("/login").is_redirect());
    assert!(!RenderError::component("Page", "boom").is_redirect());
  }

  #[test]
  fn display_format() {
    let err = RenderError::component("Page", "boom");
    assert_eq!(err.to_string(), "component `Page` failed: boom");
    assert_eq!(err.code(), "COMPONENT_ERROR");
  }
}
