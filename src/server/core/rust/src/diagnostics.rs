/* src/server/core/rust/src/diagnostics.rs */

use parking_lot::Mutex;

/// Non-fatal events recorded during one render invocation. Created fresh
/// for every call and handed back to the caller on success and failure.
#[derive(Debug, Default)]
pub struct Diagnostics {
  records: Mutex<Vec<String>>,
}

impl Diagnostics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&self, message: impl Into<String>) {
    self.records.lock().push(message.into());
  }

  pub fn len(&self) -> usize {
    self.records.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.lock().is_empty()
  }

  pub fn snapshot(&self) -> Vec<String> {
    self.records.lock().clone()
  }

  pub fn into_records(self) -> Vec<String> {
    self.records.into_inner()
  }
}
