/* src/server/engine/rust/src/sanitize.rs */

use quill_markup::Element;
use serde_json::Value;

/// What a hook may hand to a fragment setter: one element, nothing, or an
/// arbitrarily nested list of either.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentInput {
  Empty,
  One(Element),
  Many(Vec<FragmentInput>),
}

impl From<Element> for FragmentInput {
  fn from(element: Element) -> Self {
    Self::One(element)
  }
}

impl From<Option<Element>> for FragmentInput {
  fn from(element: Option<Element>) -> Self {
    element.map_or(Self::Empty, Self::One)
  }
}

impl From<Vec<Element>> for FragmentInput {
  fn from(elements: Vec<Element>) -> Self {
    Self::Many(elements.into_iter().map(Self::One).collect())
  }
}

impl From<Vec<FragmentInput>> for FragmentInput {
  fn from(inputs: Vec<FragmentInput>) -> Self {
    Self::Many(inputs)
  }
}

impl<const N: usize> From<[Element; N]> for FragmentInput {
  fn from(elements: [Element; N]) -> Self {
    Self::Many(elements.into_iter().map(Self::One).collect())
  }
}

impl FromIterator<Element> for FragmentInput {
  fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
    Self::Many(iter.into_iter().map(Self::One).collect())
  }
}

/// Flatten `input` into an ordered list of fragments, dropping empty
/// placeholders. With a non-empty `asset_prefix`, web-app manifest links
/// are rewritten to load from the content origin.
pub fn sanitize(input: impl Into<FragmentInput>, asset_prefix: Option<&str>) -> Vec<Element> {
  let mut out = Vec::new();
  flatten_into(input.into(), &mut out);
  match asset_prefix.filter(|prefix| !prefix.is_empty()) {
    Some(prefix) => out.into_iter().map(|el| strip_manifest_prefix(el, prefix)).collect(),
    None => out,
  }
}

fn flatten_into(input: FragmentInput, out: &mut Vec<Element>) {
  match input {
    FragmentInput::Empty => {}
    FragmentInput::One(element) => out.push(element),
    FragmentInput::Many(inputs) => {
      for input in inputs {
        flatten_into(input, out);
      }
    }
  }
}

fn strip_manifest_prefix(element: Element, prefix: &str) -> Element {
  let Element::Host(mut host) = element else {
    return element;
  };
  let is_manifest = host.attrs.get("rel").and_then(Value::as_str) == Some("manifest");
  if is_manifest {
    if let Some(Value::String(href)) = host.attrs.get_mut("href") {
      *href = href.replacen(prefix, "", 1);
    }
  }
  Element::Host(host)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn keyed(key: &str) -> Element {
    Element::host("meta").key(key)
  }

  fn keys(elements: &[Element]) -> Vec<&str> {
    elements.iter().filter_map(Element::identity).collect()
  }

  #[test]
  fn flattens_nested_and_drops_empty() {
    let input = FragmentInput::from(vec![
      FragmentInput::from(vec![keyed("a").into(), FragmentInput::Empty]),
      FragmentInput::from(vec![keyed("b").into(), FragmentInput::from(vec![keyed("c")])]),
    ]);
    let out = sanitize(input, None);
    assert_eq!(keys(&out), vec!["a", "b", "c"]);
  }

  #[test]
  fn single_and_none() {
    assert_eq!(sanitize(keyed("x"), None).len(), 1);
    assert!(sanitize(None::<Element>, None).is_empty());
  }

  #[test]
  fn manifest_href_loses_asset_prefix() {
    let manifest = Element::host("link")
      .attr("rel", "manifest")
      .attr("href", "https://cdn.example.com/manifest.webmanifest");
    let icon =
      Element::host("link").attr("rel", "icon").attr("href", "https://cdn.example.com/icon.png");
    let out = sanitize(
      vec![FragmentInput::from(vec![manifest]), icon.clone().into()],
      Some("https://cdn.example.com"),
    );
    assert_eq!(out[0].get_attr("href"), Some(&json!("/manifest.webmanifest")));
    assert_eq!(out[1], icon);
  }

  #[test]
  fn no_prefix_no_rewrite() {
    let manifest = Element::host("link").attr("rel", "manifest").attr("href", "/m.json");
    assert_eq!(sanitize(manifest.clone(), Some("")), vec![manifest]);
  }
}
