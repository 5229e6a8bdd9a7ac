//! Note callout directives.
//!
//! ```markdown
//! :::note warn
//! Body with **any** Markdown, including fenced code.
//! :::
//! ```
//!
//! The rewrite is textual and runs before the Markdown parser, so the body
//! is re-embedded between blank lines and parsed as ordinary Markdown.

use std::fmt;

use log::debug;

use crate::utils::codeblock::FenceTracker;

/// Kind of a `:::note` callout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteKind {
  #[default]
  Info,
  Warn,
  Alert,
}

impl NoteKind {
  /// Parse the keyword following `:::note`.
  #[must_use]
  pub fn from_keyword(keyword: &str) -> Option<Self> {
    match keyword {
      "info" => Some(Self::Info),
      "warn" => Some(Self::Warn),
      "alert" => Some(Self::Alert),
      _ => None,
    }
  }

  /// Keyword, also used as the CSS class suffix.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Info => "info",
      Self::Warn => "warn",
      Self::Alert => "alert",
    }
  }

  /// Glyph shown in the callout's icon slot.
  #[must_use]
  pub const fn icon(self) -> &'static str {
    match self {
      Self::Info => "ℹ️",
      Self::Warn => "⚠️",
      Self::Alert => "🚫",
    }
  }
}

impl fmt::Display for NoteKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Rewrite every `:::note` block into callout markup.
///
/// A block opens on a line that is exactly `:::note`, optionally followed by
/// `info`, `warn` or `alert`, and closes on the next line that is exactly
/// `:::` (trailing whitespace is ignored on both). An opener without a
/// closing line is left in place as literal text.
///
/// With `fence_aware` set, directive lines inside fenced code blocks are
/// ignored, both when looking for openers and when looking for the closing
/// line of a body. Without it the scan is purely textual.
#[must_use]
pub fn process_note_blocks(markdown: &str, fence_aware: bool) -> String {
  if !markdown.contains(":::note") {
    return markdown.to_string();
  }

  let lines: Vec<&str> = markdown.split('\n').collect();
  let mut output: Vec<String> = Vec::with_capacity(lines.len());
  let mut fences = FenceTracker::new();
  let mut index = 0;

  while index < lines.len() {
    let line = lines[index];

    if !(fence_aware && fences.in_code_block()) {
      if let Some(kind) = parse_note_open(line) {
        if let Some(close) = find_note_close(&lines, index + 1, fence_aware) {
          let body = lines[index + 1..close]
            .iter()
            .map(|l| l.trim_end_matches('\r'))
            .collect::<Vec<_>>()
            .join("\n");
          output.push(render_note(kind, body.trim()));
          index = close + 1;
          continue;
        }
        debug!("Unterminated :::note directive on line {}", index + 1);
      }
    }

    if fence_aware {
      fences = fences.process_line(line);
    }
    output.push(line.to_string());
    index += 1;
  }

  output.join("\n")
}

/// Parse an opening `:::note [kind]` line.
fn parse_note_open(line: &str) -> Option<NoteKind> {
  let rest = line.trim_end().strip_prefix(":::note")?;
  if rest.is_empty() {
    return Some(NoteKind::default());
  }
  if !rest.starts_with(char::is_whitespace) {
    return None;
  }
  NoteKind::from_keyword(rest.trim())
}

fn is_note_close(line: &str) -> bool {
  line.trim_end() == ":::"
}

fn find_note_close(
  lines: &[&str],
  start: usize,
  fence_aware: bool,
) -> Option<usize> {
  let mut fences = FenceTracker::new();
  for (offset, line) in lines[start..].iter().enumerate() {
    if !(fence_aware && fences.in_code_block()) && is_note_close(line) {
      return Some(start + offset);
    }
    if fence_aware {
      fences = fences.process_line(line);
    }
  }
  None
}

/// Render a note as HTML wrapping Markdown.
///
/// The trailing newline leaves a blank line after the closing `</div>`, so
/// whatever follows the directive starts a new block instead of being
/// swallowed by the HTML block.
fn render_note(kind: NoteKind, body: &str) -> String {
  format!(
    "<div class=\"qiita-note qiita-note-{kind}\"><span \
     class=\"qiita-note-icon\">{icon}</span>\n<div \
     class=\"qiita-note-content\">\n\n{body}\n\n</div>\n</div>\n",
    icon = kind.icon()
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_note_kinds() {
    for (src, class, icon) in [
      (":::note info\nThis is info.\n:::", "qiita-note-info", "ℹ️"),
      (":::note warn\nBe careful!\n:::", "qiita-note-warn", "⚠️"),
      (":::note alert\nDanger!\n:::", "qiita-note-alert", "🚫"),
      (":::note\nDefault note.\n:::", "qiita-note-info", "ℹ️"),
    ] {
      let out = process_note_blocks(src, false);
      assert!(out.contains(class), "{src:?} should produce {class}");
      assert!(out.contains(&format!(
        "<span class=\"qiita-note-icon\">{icon}</span>"
      )));
    }
  }

  #[test]
  fn test_body_is_trimmed_and_padded_with_blank_lines() {
    let out = process_note_blocks(":::note warn\n\n  Be careful!  \n\n:::", false);
    assert!(out.contains("<div class=\"qiita-note-content\">\n\nBe careful!\n\n</div>"));
  }

  #[test]
  fn test_unterminated_directive_passes_through() {
    let src = ":::note warn\nNo closing line here";
    assert_eq!(process_note_blocks(src, false), src);
  }

  #[test]
  fn test_unknown_kind_passes_through() {
    let src = ":::note danger\nBody\n:::";
    assert_eq!(process_note_blocks(src, false), src);
    let glued = ":::notewarn\nBody\n:::";
    assert_eq!(process_note_blocks(glued, false), glued);
  }

  #[test]
  fn test_multiple_blocks() {
    let src = ":::note info\nInfo block.\n:::\n\n:::note warn\nWarn block.\n:::";
    let out = process_note_blocks(src, false);
    assert!(out.contains("qiita-note-info"));
    assert!(out.contains("qiita-note-warn"));
    assert!(!out.contains(":::"));
  }

  #[test]
  fn test_unterminated_opener_before_valid_block() {
    let src = ":::note alert\nstray\n\n:::note info\nreal\n:::";
    let out = process_note_blocks(src, false);
    // The first opener pairs with the only closing line
    assert!(out.contains("qiita-note-alert"));
    assert!(out.contains(":::note info\nreal"));
  }

  #[test]
  fn test_trailing_whitespace_and_crlf() {
    let src = ":::note warn  \r\nWindows body\r\n:::  \r\nAfter";
    let out = process_note_blocks(src, false);
    assert!(out.contains("qiita-note-warn"));
    assert!(out.contains("\n\nWindows body\n\n"));
    assert!(out.ends_with("</div>\n\nAfter"));
  }

  #[test]
  fn test_textual_scan_closes_inside_code_fence() {
    let src = ":::note\n```text\n:::\n```\n:::";
    let out = process_note_blocks(src, false);
    // The first `:::` line wins even though it sits inside the fence
    assert!(out.contains("\n\n```text\n\n</div>"));
  }

  #[test]
  fn test_fence_aware_scan_skips_code() {
    let src = ":::note\n```text\n:::\n```\n:::";
    let out = process_note_blocks(src, true);
    assert!(out.contains("\n\n```text\n:::\n```\n\n</div>"));

    let quoted = "```markdown\n:::note\nexample\n:::\n```";
    assert_eq!(process_note_blocks(quoted, true), quoted);
  }

  #[test]
  fn test_no_directive_is_identity() {
    let src = "# Title\n\nplain text\n";
    assert_eq!(process_note_blocks(src, false), src);
  }
}
