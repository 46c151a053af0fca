/* src/server/core/rust/src/buffer.rs */

//! Turns a push-based renderer into one awaitable buffer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use quill_markup::{RenderError, Sink, StreamOptions};
use tokio::sync::oneshot;

type Outcome = Result<Bytes, RenderError>;

struct BufferState {
  bytes: BytesMut,
  done: Option<oneshot::Sender<Outcome>>,
}

/// Write side: accumulates bytes until closed or destroyed. Clones share
/// one buffer, and only the first close/destroy has any effect.
#[derive(Clone)]
pub struct WritableBuffer {
  state: Arc<Mutex<BufferState>>,
}

/// Read side: resolves once with everything written, or with the error
/// the buffer was destroyed with.
pub struct BufferedOutput {
  rx: oneshot::Receiver<Outcome>,
}

pub fn writable_buffer() -> (WritableBuffer, BufferedOutput) {
  let (tx, rx) = oneshot::channel();
  let state = BufferState { bytes: BytesMut::new(), done: Some(tx) };
  (WritableBuffer { state: Arc::new(Mutex::new(state)) }, BufferedOutput { rx })
}

impl WritableBuffer {
  pub fn push(&self, chunk: &[u8]) {
    let mut state = self.state.lock();
    if state.done.is_some() {
      state.bytes.extend_from_slice(chunk);
    }
  }

  pub fn close(&self) {
    let mut state = self.state.lock();
    if let Some(tx) = state.done.take() {
      let bytes = std::mem::take(&mut state.bytes).freeze();
      let _ = tx.send(Ok(bytes));
    }
  }

  pub fn fail(&self, error: RenderError) {
    let mut state = self.state.lock();
    if let Some(tx) = state.done.take() {
      state.bytes.clear();
      let _ = tx.send(Err(error));
    }
  }

  pub fn is_finished(&self) -> bool {
    self.state.lock().done.is_none()
  }
}

impl Sink for WritableBuffer {
  fn write(&mut self, chunk: Bytes) {
    self.push(&chunk);
  }

  fn end(self: Box<Self>) {
    self.close();
  }

  fn destroy(self: Box<Self>, error: RenderError) {
    self.fail(error);
  }
}

impl Future for BufferedOutput {
  type Output = Outcome;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    // every writer dropped without a terminal call
    Pin::new(&mut self.rx).poll(cx).map(|received| received.unwrap_or(Err(RenderError::StreamClosed)))
  }
}

/// Drive a push-based render to completion. `start` receives the
/// readiness and error callbacks; readiness pipes the output into a
/// fresh [`WritableBuffer`], errors destroy it.
pub async fn stream_to_buffer(start: impl FnOnce(StreamOptions)) -> Result<Bytes, RenderError> {
  let (sink, output) = writable_buffer();
  let on_error_sink = sink.clone();
  start(StreamOptions {
    on_all_ready: Box::new(move |stream| stream.pipe(Box::new(sink))),
    on_error: Box::new(move |error| on_error_sink.fail(error)),
  });
  output.await
}
