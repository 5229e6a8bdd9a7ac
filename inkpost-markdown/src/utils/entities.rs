//! HTML entity decoding for code block contents.
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::never_matching_regex;

/// Named entity, decimal or hexadecimal character reference.
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|([a-zA-Z]+));").unwrap_or_else(
    |e| {
      log::error!("Failed to compile ENTITY_RE regex: {e}");
      never_matching_regex()
    },
  )
});

/// Decode the character references that Markdown rendering leaves in code.
///
/// Handles `&lt;`, `&gt;`, `&amp;`, `&quot;` and `&apos;`, plus any decimal
/// (`&#60;`) or hexadecimal (`&#x3C;`) reference. Unknown named entities and
/// references that do not denote a valid character are kept verbatim. The
/// input is scanned once, so `&amp;lt;` decodes to `&lt;` and not to `<`.
#[must_use]
pub fn decode_html_entities(text: &str) -> String {
  if !text.contains('&') {
    return text.to_string();
  }

  ENTITY_RE
    .replace_all(text, |caps: &Captures| {
      let decoded = if let Some(hex) = caps.get(1) {
        u32::from_str_radix(hex.as_str(), 16)
          .ok()
          .and_then(char::from_u32)
      } else if let Some(dec) = caps.get(2) {
        dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
      } else {
        caps.get(3).and_then(|name| named_entity(name.as_str()))
      };

      decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
    .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
  match name {
    "lt" => Some('<'),
    "gt" => Some('>'),
    "amp" => Some('&'),
    "quot" => Some('"'),
    "apos" => Some('\''),
    _ => None,
  }
}
