//! Types for the inkpost-markdown public API.
use serde::{Deserialize, Serialize};

/// A table of contents entry taken from the rendered HTML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
  /// Heading level, either 2 or 3.
  pub level: u8,
  /// Value of the element's `id` attribute.
  pub id:    String,
  /// Inner HTML of the heading with tags stripped.
  pub text:  String,
}

/// Result of rendering one Markdown document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkdownResult {
  /// Rendered HTML fragment.
  pub html: String,

  /// Extracted `<h2>`/`<h3>` headings, in document order.
  pub headings: Vec<Heading>,
}

/// Errors that abort a single render.
///
/// Everything else (unknown languages, unterminated directives, a missing
/// highlighting engine) degrades the output instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
  #[error("Failed to format Markdown as HTML: {0}")]
  Format(#[from] std::fmt::Error),
}
