/* src/server/markup/rust/src/lib.rs */

mod component;
mod context;
mod element;
mod error;
mod helpers;
mod render;
mod stream;

pub use component::{Component, FnComponent, RenderFn, component_fn};
pub use context::{ContextBinding, ContextKey, ContextValue, RenderContext};
pub use element::{ComponentElement, Element, HostElement, ProviderElement};
pub use error::RenderError;
pub use helpers::escape_html;
pub use render::{expand_hosts, render_to_string};
pub use stream::{PipeableStream, Sink, StreamOptions, render_to_pipeable_stream};
