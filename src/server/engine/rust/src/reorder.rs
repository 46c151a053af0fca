/* src/server/engine/rust/src/reorder.rs */

use quill_markup::Element;

/// Move `<meta>` fragments ahead of every other head fragment so crawlers
/// see them before large inline styles. Both groups keep their order.
pub fn reorder_head_components(components: Vec<Element>) -> Vec<Element> {
  let (mut meta, rest): (Vec<Element>, Vec<Element>) =
    components.into_iter().partition(Element::is_meta);
  meta.extend(rest);
  meta
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn meta_moves_to_front_stably() {
    let head = vec![
      Element::host("style").key("style"),
      Element::host("meta").key("meta-1"),
      Element::host("link").key("link"),
      Element::host("meta").key("meta-2"),
    ];
    let sorted = reorder_head_components(head);
    let keys: Vec<_> = sorted.iter().filter_map(Element::identity).collect();
    assert_eq!(keys, vec!["meta-1", "meta-2", "style", "link"]);
  }

  #[test]
  fn empty_is_empty() {
    assert!(reorder_head_components(Vec::new()).is_empty());
  }
}
