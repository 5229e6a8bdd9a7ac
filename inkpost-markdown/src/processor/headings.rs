//! Table of contents extraction from rendered HTML.

use std::sync::LazyLock;

use log::error;
use regex::Regex;

use crate::{
  types::Heading,
  utils::{self, strip_tags},
};

/// Finds heading elements, stepping over regions whose content is not markup.
///
/// Comments and `script`/`style`/`pre`/`textarea` elements match the first
/// alternative and carry no capture groups. Heading matches capture the level,
/// the attribute list and the inner HTML.
pub(crate) static HEADING_SCAN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?is)<!--.*?-->|<(?:script|style|pre|textarea)\b.*?</(?:script|style|pre|textarea)\s*>|<h([1-6])(\s[^>]*)?>(.*?)</h[1-6]\s*>",
  )
  .unwrap_or_else(|e| {
    error!("Failed to compile HEADING_SCAN_RE regex: {e}");
    utils::never_matching_regex()
  })
});

static ID_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)(?:^|\s)id\s*=\s*"([^"]*)""#).unwrap_or_else(|e| {
    error!("Failed to compile ID_ATTR_RE regex: {e}");
    utils::never_matching_regex()
  })
});

/// Value of the `id` attribute in a raw attribute list, possibly empty.
pub(crate) fn id_attribute(attrs: &str) -> Option<&str> {
  ID_ATTR_RE
    .captures(attrs)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str())
}

/// Collect every `<h2>` and `<h3>` that carries an `id`, in document order.
///
/// The `id` may sit anywhere among the attributes and the heading may span
/// several lines. The text is the inner HTML with tags removed; entities are
/// left as they are, since the text is meant to be embedded back into HTML.
/// Headings without an `id`, or with an empty one, are skipped, and so are
/// lookalikes inside comments or raw text elements.
#[must_use]
pub fn extract_headings(html: &str) -> Vec<Heading> {
  HEADING_SCAN_RE
    .captures_iter(html)
    .filter_map(|caps| {
      let level = caps.get(1)?.as_str().parse::<u8>().ok()?;
      if !(2..=3).contains(&level) {
        return None;
      }
      let id = id_attribute(caps.get(2)?.as_str())?;
      if id.is_empty() {
        return None;
      }
      Some(Heading {
        level,
        id: id.to_string(),
        text: strip_tags(caps.get(3).map_or("", |m| m.as_str())),
      })
    })
    .collect()
}
