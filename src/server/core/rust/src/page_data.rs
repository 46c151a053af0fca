/* src/server/core/rust/src/page_data.rs */

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::diagnostics::Diagnostics;
use crate::request::PageData;

/// Recorded whenever a hook reads page data of another page.
pub const UNSAFE_PAGE_DATA_ACCESS: &str = "Usage of loadPageDataSync for page other than currently generated page disables incremental html generation in future builds";

/// Read-bytes-or-absent access to published page-data files.
pub trait PageDataSource: Send + Sync {
  /// `relative` is a `/`-separated path such as `page-data/index/page-data.json`.
  fn read(&self, relative: &str) -> Option<Vec<u8>>;
}

/// Page data published under a directory on disk.
#[derive(Debug, Clone)]
pub struct FsPageDataSource {
  root: PathBuf,
}

impl FsPageDataSource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl PageDataSource for FsPageDataSource {
  fn read(&self, relative: &str) -> Option<Vec<u8>> {
    let path = relative.split('/').filter(|s| !s.is_empty()).fold(self.root.clone(), |p, s| p.join(s));
    std::fs::read(path).ok()
  }
}

/// Source that never has page data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPageData;

impl PageDataSource for NoPageData {
  fn read(&self, _relative: &str) -> Option<Vec<u8>> {
    None
  }
}

/// `page-data/{path}/page-data.json`, with `/` mapped to `index`.
pub fn page_data_path(page_path: &str) -> String {
  let fixed = if page_path == "/" { "index" } else { page_path.trim_matches('/') };
  format!("page-data/{fixed}/page-data.json")
}

/// Synchronous page-data lookup handed to `onRenderBody` plugins.
pub struct PageDataLoader<'a> {
  page_path: &'a str,
  page_data: &'a PageData,
  source: &'a dyn PageDataSource,
  diagnostics: &'a Diagnostics,
}

impl<'a> PageDataLoader<'a> {
  pub fn new(
    page_path: &'a str,
    page_data: &'a PageData,
    source: &'a dyn PageDataSource,
    diagnostics: &'a Diagnostics,
  ) -> Self {
    Self { page_path, page_data, source, diagnostics }
  }

  /// The current page is answered from memory. Any other page is read
  /// through the source, after recording a diagnostic. Absent or
  /// unparsable files yield `None`.
  pub fn load_page_data_sync(&self, path: &str) -> Option<Value> {
    if path == self.page_path {
      return serde_json::to_value(self.page_data).ok();
    }

    let relative = page_data_path(path);
    self.diagnostics.record(format!("{UNSAFE_PAGE_DATA_ACCESS} ({relative})"));
    tracing::warn!(current = self.page_path, requested = path, "page data of another page read during render");

    let bytes = self.source.read(&relative)?;
    serde_json::from_slice(&bytes).ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  struct Fixed(Option<&'static str>);

  impl PageDataSource for Fixed {
    fn read(&self, _relative: &str) -> Option<Vec<u8>> {
      self.0.map(|s| s.as_bytes().to_vec())
    }
  }

  #[test]
  fn page_data_paths() {
    assert_eq!(page_data_path("/"), "page-data/index/page-data.json");
    assert_eq!(page_data_path("/blog/post/"), "page-data/blog/post/page-data.json");
  }

  #[test]
  fn current_page_skips_io_and_diagnostics() {
    let data = PageData::new("home");
    let diagnostics = Diagnostics::new();
    let loader = PageDataLoader::new("/", &data, &NoPageData, &diagnostics);
    let loaded = loader.load_page_data_sync("/").unwrap();
    assert_eq!(loaded["componentChunkName"], json!("home"));
    assert!(diagnostics.is_empty());
  }

  #[test]
  fn other_page_is_recorded_even_when_absent() {
    let data = PageData::new("home");
    let diagnostics = Diagnostics::new();
    let loader = PageDataLoader::new("/", &data, &NoPageData, &diagnostics);
    assert!(loader.load_page_data_sync("/about/").is_none());
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.snapshot()[0].contains("page-data/about/page-data.json"));
  }

  #[test]
  fn other_page_parses_json() {
    let data = PageData::new("home");
    let diagnostics = Diagnostics::new();
    let source = Fixed(Some(r#"{"componentChunkName":"about"}"#));
    let loader = PageDataLoader::new("/", &data, &source, &diagnostics);
    assert_eq!(loader.load_page_data_sync("/about/"), Some(json!({"componentChunkName": "about"})));
  }

  #[test]
  fn invalid_json_is_absent() {
    let data = PageData::new("home");
    let diagnostics = Diagnostics::new();
    let source = Fixed(Some("{not json"));
    let loader = PageDataLoader::new("/", &data, &source, &diagnostics);
    assert!(loader.load_page_data_sync("/x/").is_none());
    assert_eq!(diagnostics.len(), 1);
  }

  #[test]
  fn fs_source_reads_from_root() {
    let dir = tempfile::tempdir().unwrap();
    let page_dir = dir.path().join("page-data/about");
    std::fs::create_dir_all(&page_dir).unwrap();
    std::fs::write(page_dir.join("page-data.json"), br#"{"componentChunkName":"about"}"#).unwrap();

    let source = FsPageDataSource::new(dir.path());
    assert!(source.read("page-data/about/page-data.json").is_some());
    assert!(source.read("page-data/missing/page-data.json").is_none());
  }
}
