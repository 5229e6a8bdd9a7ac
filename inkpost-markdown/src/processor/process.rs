//! High-level processing functions for Markdown content.
use super::types::{MarkdownOptions, MarkdownProcessor};
use crate::{
  syntax::HighlighterHandle,
  types::{MarkdownResult, RenderError},
};

/// Render one document with the default options.
///
/// Convenience wrapper for callers that only have a handle; anything that
/// renders many documents should build one [`MarkdownProcessor`] and reuse
/// it.
///
/// # Errors
///
/// See [`MarkdownProcessor::render`].
pub async fn markdown_to_html(
  highlighter: &HighlighterHandle,
  markdown: &str,
) -> Result<MarkdownResult, RenderError> {
  MarkdownProcessor::new(MarkdownOptions::default(), highlighter.clone())
    .render(markdown)
    .await
}
