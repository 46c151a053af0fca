/* src/server/markup/rust/src/stream.rs */

//! Push-based renderer: output is produced as a sequence of chunks and
//! delivered to a [`Sink`] once the whole tree is ready.

use bytes::Bytes;

use crate::context::RenderContext;
use crate::element::Element;
use crate::error::RenderError;
use crate::render::{MarkupWriter, write_element};

/// Chunks are cut at element boundaries once they reach this size.
const CHUNK_SIZE: usize = 8 * 1024;

/// Receiver of piped markup.
pub trait Sink: Send + 'static {
  fn write(&mut self, chunk: Bytes);

  /// Normal end of output.
  fn end(self: Box<Self>);

  /// Abnormal end of output.
  fn destroy(self: Box<Self>, error: RenderError);
}

/// Rendered output waiting to be piped.
#[derive(Debug, Default)]
pub struct PipeableStream {
  chunks: Vec<Bytes>,
}

impl PipeableStream {
  pub fn from_chunks(chunks: Vec<Bytes>) -> Self {
    Self { chunks }
  }

  pub fn chunk_count(&self) -> usize {
    self.chunks.len()
  }

  /// Begin writing into `sink` on the current runtime. The sink is ended
  /// after the last chunk.
  pub fn pipe(self, mut sink: Box<dyn Sink>) {
    tokio::spawn(async move {
      for chunk in self.chunks {
        sink.write(chunk);
        tokio::task::yield_now().await;
      }
      sink.end();
    });
  }
}

/// Readiness and error callbacks of a streaming render. Exactly one of
/// them is called.
pub struct StreamOptions {
  pub on_all_ready: Box<dyn FnOnce(PipeableStream) + Send>,
  pub on_error: Box<dyn FnOnce(RenderError) + Send>,
}

#[derive(Default)]
struct ChunkWriter {
  current: String,
  chunks: Vec<Bytes>,
}

impl ChunkWriter {
  fn finish(mut self) -> Vec<Bytes> {
    if !self.current.is_empty() {
      self.chunks.push(Bytes::from(self.current));
    }
    self.chunks
  }
}

impl MarkupWriter for ChunkWriter {
  fn push_str(&mut self, s: &str) {
    self.current.push_str(s);
  }

  fn boundary(&mut self) {
    if self.current.len() >= CHUNK_SIZE {
      let full = std::mem::take(&mut self.current);
      self.chunks.push(Bytes::from(full));
    }
  }
}

/// Render `element` on a spawned task. Must be called inside a tokio runtime.
pub fn render_to_pipeable_stream(element: Element, options: StreamOptions) {
  tokio::spawn(async move {
    // let the caller finish wiring before any callback fires
    tokio::task::yield_now().await;
    let mut writer = ChunkWriter::default();
    let mut cx = RenderContext::new();
    match write_element(&element, &mut cx, &mut writer) {
      Ok(()) => {
        let stream = PipeableStream { chunks: writer.finish() };
        tracing::trace!(chunks = stream.chunk_count(), "stream ready");
        (options.on_all_ready)(stream);
      }
      Err(error) => (options.on_error)(error),
    }
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::mpsc;

  struct ChannelSink(mpsc::Sender<Result<String, String>>, String);

  impl Sink for ChannelSink {
    fn write(&mut self, chunk: Bytes) {
      self.1.push_str(&String::from_utf8_lossy(&chunk));
    }

    fn end(self: Box<Self>) {
      let _ = self.0.send(Ok(self.1.clone()));
    }

    fn destroy(self: Box<Self>, error: RenderError) {
      let _ = self.0.send(Err(error.to_string()));
    }
  }

  #[test]
  fn chunk_writer_cuts_at_boundaries() {
    let mut writer = ChunkWriter::default();
    writer.push_str(&"a".repeat(CHUNK_SIZE));
    writer.boundary();
    writer.push_str("tail");
    writer.boundary();
    let chunks = writer.finish();
    assert_eq!(chunks.len(), 2);
    assert_eq!(&chunks[1][..], b"tail");
  }

  #[tokio::test]
  async fn pipes_rendered_markup() {
    let (tx, rx) = mpsc::channel();
    let element = Element::host("p").child(Element::text("streamed"));
    let error_tx = tx.clone();
    render_to_pipeable_stream(
      element,
      StreamOptions {
        on_all_ready: Box::new(move |stream| stream.pipe(Box::new(ChannelSink(tx, String::new())))),
        on_error: Box::new(move |e| {
          let _ = error_tx.send(Err(e.to_string()));
        }),
      },
    );
    let result = tokio::task::spawn_blocking(move || rx.recv().unwrap()).await.unwrap();
    assert_eq!(result, Ok("<p>streamed</p>".to_string()));
  }

  #[tokio::test]
  async fn errors_go_to_on_error() {
    let (tx, rx) = mpsc::channel();
    let broken = crate::component::component_fn("Broken", |_, _| {
      Err(RenderError::component("Broken", "no data"))
    });
    let ready_tx = tx.clone();
    render_to_pipeable_stream(
      Element::component(broken, serde_json::json!({})),
      StreamOptions {
        on_all_ready: Box::new(move |_| {
          let _ = ready_tx.send(Ok(String::new()));
        }),
        on_error: Box::new(move |e| {
          let _ = tx.send(Err(e.to_string()));
        }),
      },
    );
    let result = tokio::task::spawn_blocking(move || rx.recv().unwrap()).await.unwrap();
    assert_eq!(result, Err("component `Broken` failed: no data".to_string()));
  }
}
