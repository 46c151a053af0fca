/* src/server/engine/rust/src/escape.rs */

/// Make serialized JSON safe to embed inside a `<script>` element.
///
/// Only string contents are rewritten: `<`, `>` and `&` become `\u003c`,
/// `\u003e` and `\u0026`, and the JS line terminators U+2028/U+2029 are
/// escaped. The result parses to the same value.
pub fn script_safe_json(json: &str) -> String {
  let mut out = String::with_capacity(json.len());
  let mut in_string = false;
  let mut chars = json.chars();

  while let Some(ch) = chars.next() {
    if !in_string {
      if ch == '"' {
        in_string = true;
      }
      out.push(ch);
      continue;
    }
    match ch {
      '\\' => {
        // keep escape sequences as they are
        out.push(ch);
        if let Some(next) = chars.next() {
          out.push(next);
        }
      }
      '"' => {
        in_string = false;
        out.push(ch);
      }
      '<' => out.push_str("\\u003c"),
      '>' => out.push_str("\\u003e"),
      '&' => out.push_str("\\u0026"),
      '\u{2028}' => out.push_str("\\u2028"),
      '\u{2029}' => out.push_str("\\u2029"),
      c => out.push(c),
    }
  }
  out
}
