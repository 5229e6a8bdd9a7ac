//! Core implementation of the Markdown processor.
//!
//! This module contains the main implementation of `MarkdownProcessor`: the
//! four-stage rendering pipeline and the comrak plumbing it is built on.
use comrak::{Arena, options::Options, parse_document};
use log::trace;
use markup5ever::{QualName, local_name, ns};
use tendril::TendrilSink;

use super::{
  extensions::process_note_blocks,
  headings::{HEADING_SCAN_RE, extract_headings, id_attribute},
  highlight::highlight_code_blocks,
  types::{AstTransformer, MarkdownOptions, MarkdownProcessor, MathTransformer},
};
use crate::{
  syntax::HighlighterHandle,
  types::{MarkdownResult, RenderError},
  utils::SlugAllocator,
};

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  ///
  /// Nothing is loaded here; the highlighting engine behind `highlighter` is
  /// built the first time a render actually needs it.
  #[must_use]
  pub const fn new(
    options: MarkdownOptions,
    highlighter: HighlighterHandle,
  ) -> Self {
    Self {
      options,
      highlighter,
    }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// Access the shared highlighter handle.
  #[must_use]
  pub const fn highlighter(&self) -> &HighlighterHandle {
    &self.highlighter
  }

  /// Render Markdown into an HTML fragment plus its table of contents.
  ///
  /// The stages run strictly in order: note directives, Markdown to HTML with
  /// heading ids, code block highlighting, heading extraction. Only the third
  /// stage awaits, and only for the shared engine.
  ///
  /// # Errors
  ///
  /// Returns an error only if comrak fails to format the document as HTML.
  /// Unsupported languages, unterminated directives and a failed engine load
  /// all degrade the output instead.
  pub async fn render(
    &self,
    markdown: &str,
  ) -> Result<MarkdownResult, RenderError> {
    let preprocessed =
      process_note_blocks(markdown, self.options.fence_aware_directives);
    let html = self.convert_to_html(&preprocessed)?;

    let engine = if self.options.highlight_code && html.contains("<pre><code")
    {
      self.highlighter.get().await
    } else {
      None
    };
    let html = highlight_code_blocks(&html, engine.as_deref());

    let headings = extract_headings(&html);
    trace!("Rendered document with {} headings", headings.len());

    Ok(MarkdownResult { html, headings })
  }

  /// Convert Markdown to HTML using comrak and assign heading ids.
  ///
  /// The arena is confined to this call so that [`Self::render`]
  /// never holds it across an await point.
  fn convert_to_html(&self, content: &str) -> Result<String, RenderError> {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, content, &options);

    if self.options.math {
      MathTransformer.transform(root);
    }

    let mut html_output = String::new();
    comrak::format_html(root, &options, &mut html_output)?;

    Ok(assign_heading_ids(&html_output))
  }

  /// Build comrak options from `MarkdownOptions`.
  fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    if self.options.gfm {
      options.extension.table = true;
      options.extension.footnotes = true;
      options.extension.strikethrough = true;
      options.extension.tasklist = true;
      options.extension.autolink = true;
    }
    if self.options.math {
      options.extension.math_dollars = true;
    }
    // Raw HTML, including the note wrappers, must pass through untouched
    options.render.r#unsafe = true;
    // Ids are assigned after rendering so raw HTML headings get them too
    options.extension.header_ids = None;
    options
  }
}

/// Give every `<h1>`..`<h6>` without an `id` a unique slug of its text.
///
/// Ids that are already present (from raw HTML) are kept and reserved first,
/// so generated slugs never collide with them. The HTML is edited in place:
/// the only change is an `id` attribute spliced into each opening tag that
/// lacks one, so raw HTML around the headings comes out byte for byte.
fn assign_heading_ids(html: &str) -> String {
  let mut slugs = SlugAllocator::new();
  for caps in HEADING_SCAN_RE.captures_iter(html) {
    if caps.get(1).is_none() {
      continue;
    }
    if let Some(id) = caps
      .get(2)
      .and_then(|m| id_attribute(m.as_str()))
      .filter(|id| !id.is_empty())
    {
      slugs.reserve(id);
    }
  }

  let mut out = String::with_capacity(html.len());
  let mut copied = 0;
  for caps in HEADING_SCAN_RE.captures_iter(html) {
    let (Some(whole), Some(_)) = (caps.get(0), caps.get(1)) else {
      continue;
    };
    if caps
      .get(2)
      .is_some_and(|m| id_attribute(m.as_str()).is_some())
    {
      continue;
    }

    let inner = caps.get(3).map_or("", |m| m.as_str());
    let id = slugs.allocate(&heading_text(inner));

    // Right after `<hN`
    let insert_at = whole.start() + 3;
    out.push_str(&html[copied..insert_at]);
    out.push_str(" id=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(&id));
    out.push('"');
    copied = insert_at;
  }
  out.push_str(&html[copied..]);
  out
}

/// Text content of a heading's inner HTML, with entities decoded.
fn heading_text(inner: &str) -> String {
  kuchikikiki::parse_fragment(
    QualName::new(None, ns!(html), local_name!("h2")),
    Vec::new(),
  )
  .one(inner)
  .text_contents()
}
