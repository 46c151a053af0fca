/* src/server/markup/rust/src/helpers.rs */

use serde_json::Value;

/// JavaScript truthiness of a prop value.
pub(crate) fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_none_or(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

/// Attribute text of a prop value; `null` is empty.
pub(crate) fn stringify(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

// Sorted: rendered as `name=""` when truthy, dropped otherwise.
const BOOLEAN_ATTRS: &[&str] = &[
  "allowfullscreen", "async", "autofocus", "autoplay", "checked", "controls", "default", "defer",
  "disabled", "formnovalidate", "hidden", "itemscope", "loop", "multiple", "muted", "nomodule",
  "novalidate", "open", "playsinline", "readonly", "required", "reversed", "selected",
];

pub(crate) fn is_html_boolean_attr(name: &str) -> bool {
  BOOLEAN_ATTRS.binary_search(&name).is_ok()
}

const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
  "track", "wbr",
];

pub(crate) fn is_void_element(tag: &str) -> bool {
  VOID_ELEMENTS.contains(&tag)
}

/// Map JSX-style prop names onto their HTML attribute names.
pub(crate) fn attr_name(name: &str) -> &str {
  match name {
    "className" => "class",
    "htmlFor" => "for",
    "httpEquiv" => "http-equiv",
    "charSet" => "charset",
    "noModule" => "nomodule",
    "tabIndex" => "tabindex",
    "crossOrigin" => "crossorigin",
    "acceptCharset" => "accept-charset",
    other => other,
  }
}

/// Props that never reach the markup as attributes.
pub(crate) fn is_reserved_prop(name: &str) -> bool {
  matches!(name, "key" | "children" | "dangerouslySetInnerHTML" | "ref")
}

// Sorted CSS properties whose numbers are written without a `px` unit.
const UNITLESS: &[&str] = &[
  "animation-iteration-count", "border-image-outset", "border-image-slice", "border-image-width",
  "box-flex", "box-flex-group", "box-ordinal-group", "column-count", "columns", "fill-opacity",
  "flex", "flex-grow", "flex-negative", "flex-order", "flex-positive", "flex-shrink",
  "flood-opacity", "font-weight", "grid-area", "grid-column", "grid-column-end",
  "grid-column-span", "grid-column-start", "grid-row", "grid-row-end", "grid-row-span",
  "grid-row-start", "line-clamp", "line-height", "opacity", "order", "orphans", "stop-opacity",
  "stroke-dasharray", "stroke-dashoffset", "stroke-miterlimit", "stroke-opacity", "stroke-width",
  "tab-size", "widows", "z-index", "zoom",
];

/// CSS text of one style value. Empty strings, `null` and booleans are skipped.
pub(crate) fn format_style_value(css_property: &str, value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Number(n) if n.as_f64() == Some(0.0) => Some("0".to_string()),
    Value::Number(n) => {
      let number = match (n.as_i64(), n.as_f64()) {
        (Some(i), _) => i.to_string(),
        (None, Some(f)) => f.to_string(),
        (None, None) => n.to_string(),
      };
      if UNITLESS.binary_search(&css_property).is_ok() {
        Some(number)
      } else {
        Some(number + "px")
      }
    }
    _ => None,
  }
}

/// `whiteSpace` -> `white-space`. Custom properties (`--x`) pass through.
pub(crate) fn css_property_name(name: &str) -> String {
  if name.starts_with("--") {
    return name.to_string();
  }
  name.chars().fold(String::with_capacity(name.len() + 4), |mut out, ch| {
    if ch.is_ascii_uppercase() {
      out.push('-');
    }
    out.push(ch.to_ascii_lowercase());
    out
  })
}

/// Serialize a style object into an inline `style` attribute value.
pub(crate) fn style_string(style: &serde_json::Map<String, Value>) -> String {
  style
    .iter()
    .filter_map(|(name, value)| {
      let property = css_property_name(name);
      format_style_value(&property, value).map(|formatted| format!("{property}:{formatted}"))
    })
    .collect::<Vec<_>>()
    .join(";")
}

fn entity(ch: char) -> Option<&'static str> {
  Some(match ch {
    '&' => "&amp;",
    '<' => "&lt;",
    '>' => "&gt;",
    '"' => "&quot;",
    '\'' => "&#x27;",
    _ => return None,
  })
}

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
  if !s.chars().any(|ch| entity(ch).is_some()) {
    return s.to_string();
  }
  let mut out = String::with_capacity(s.len() + 16);
  for ch in s.chars() {
    match entity(ch) {
      Some(escaped) => out.push_str(escaped),
      None => out.push(ch),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn truthy_values() {
    assert!(is_truthy(&json!(true)));
    assert!(is_truthy(&json!(1)));
    assert!(is_truthy(&json!("x")));
    assert!(is_truthy(&json!({})));
  }

  #[test]
  fn falsy_values() {
    assert!(!is_truthy(&json!(false)));
    assert!(!is_truthy(&json!(null)));
    assert!(!is_truthy(&json!(0)));
    assert!(!is_truthy(&json!("")));
  }

  #[test]
  fn stringify_scalars() {
    assert_eq!(stringify(&json!(null)), "");
    assert_eq!(stringify(&json!(42)), "42");
    assert_eq!(stringify(&json!("hello")), "hello");
    assert_eq!(stringify(&json!(false)), "false");
  }

  #[test]
  fn escape_html_special_chars() {
    assert_eq!(escape_html("<>&\"'"), "&lt;&gt;&amp;&quot;&#x27;");
    assert_eq!(escape_html("plain"), "plain");
  }

  #[test]
  fn attr_name_aliases() {
    assert_eq!(attr_name("className"), "class");
    assert_eq!(attr_name("noModule"), "nomodule");
    assert_eq!(attr_name("data-href"), "data-href");
  }

  #[test]
  fn css_property_names() {
    assert_eq!(css_property_name("whiteSpace"), "white-space");
    assert_eq!(css_property_name("top"), "top");
    assert_eq!(css_property_name("--brand"), "--brand");
  }

  #[test]
  fn style_string_units() {
    let style = json!({"position": "absolute", "top": 0, "width": 1, "opacity": 0.5, "zIndex": 3});
    let Value::Object(map) = style else { unreachable!() };
    assert_eq!(style_string(&map), "position:absolute;top:0;width:1px;opacity:0.5;z-index:3");
  }

  #[test]
  fn style_skips_empty_values() {
    let style = json!({"color": "", "margin": null, "border": 0});
    let Value::Object(map) = style else { unreachable!() };
    assert_eq!(style_string(&map), "border:0");
  }

  #[test]
  fn lookup_tables_are_sorted() {
    assert!(BOOLEAN_ATTRS.windows(2).all(|w| w[0] < w[1]));
    assert!(UNITLESS.windows(2).all(|w| w[0] < w[1]));
    assert!(is_html_boolean_attr("nomodule"));
    assert!(!is_html_boolean_attr("src"));
  }

  #[test]
  fn void_elements() {
    assert!(is_void_element("meta"));
    assert!(is_void_element("link"));
    assert!(!is_void_element("script"));
  }
}
