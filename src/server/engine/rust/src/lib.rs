/* src/server/engine/rust/src/lib.rs */

pub mod assets;
pub mod document;
pub mod escape;
pub mod merge;
pub mod reorder;
pub mod sanitize;

// Public API re-exports
pub use assets::{
  GLOBAL_CSS_IDENTITY, PageDataScript, ScriptAsset, StyleAsset, append_script_links, append_styles,
  body_scripts, chunk_mapping_script, dedupe_by_key,
};
pub use document::{DocumentModel, DocumentParts};
pub use escape::script_safe_json;
pub use merge::deep_merge;
pub use reorder::reorder_head_components;
pub use sanitize::{FragmentInput, sanitize};
