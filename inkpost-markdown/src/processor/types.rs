//! Type definitions for the Markdown processor.
//!
//! Contains the configuration options, the processor struct itself and the
//! AST transformation seam used between parsing and rendering.
//!
//! # Examples
//!
//! ```
//! use inkpost_markdown::{
//!   HighlighterHandle,
//!   MarkdownOptionsBuilder,
//!   MarkdownProcessor,
//! };
//!
//! let options = MarkdownOptionsBuilder::new()
//!   .gfm(true)
//!   .math(true)
//!   .highlight_code(false)
//!   .build();
//!
//! let processor = MarkdownProcessor::new(options, HighlighterHandle::default());
//! assert!(!processor.options().highlight_code);
//! ```

use comrak::nodes::{AstNode, NodeValue};
#[cfg(feature = "math")]
use log::debug;

use crate::syntax::HighlighterHandle;

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct MarkdownOptions {
  /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists,
  /// autolinks, footnotes).
  pub gfm: bool,

  /// Enable `$...$` and `$$...$$` math.
  pub math: bool,

  /// Enable syntax highlighting for code blocks.
  ///
  /// When disabled, code blocks still get their wrapper markup but keep the
  /// plain `<pre><code>` body, and the engine is never loaded.
  pub highlight_code: bool,

  /// Ignore `:::note` directive lines that sit inside fenced code blocks.
  pub fence_aware_directives: bool,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      gfm:                    true,
      math:                   true,
      highlight_code:         true,
      fence_aware_directives: false,
    }
  }
}

/// Main Markdown processor.
///
/// Cheap to clone: the highlighting engine is shared through the handle, so
/// every clone (and every task it is moved into) uses the same instance.
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
  pub(crate) options:     MarkdownOptions,
  pub(crate) highlighter: HighlighterHandle,
}

/// Trait for AST transformations applied between parsing and rendering.
pub trait AstTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>);
}

/// AST transformer that renders math nodes at build time.
///
/// TeX is converted to MathML and wrapped in a span whose class tells the two
/// kinds apart:
///
/// - `$x$` becomes `<span class="math math-inline"><math …>…</math></span>`
/// - `$$x$$` becomes `<span class="math math-display"><math … display="block">…</math></span>`
///
/// TeX that cannot be converted, or a build without the `math` feature, keeps
/// the escaped source inside the same span instead.
pub struct MathTransformer;

impl MathTransformer {
  /// Markup for a single math node.
  #[must_use]
  pub fn render(literal: &str, display: bool) -> String {
    Self::to_mathml(literal, display).map_or_else(
      || Self::source_span(literal, display),
      |mathml| {
        format!("<span class=\"{}\">{mathml}</span>", Self::class(display))
      },
    )
  }

  /// The unrendered form: escaped TeX source in a math span.
  #[must_use]
  pub fn source_span(literal: &str, display: bool) -> String {
    format!(
      "<span class=\"{}\">{}</span>",
      Self::class(display),
      html_escape::encode_text(literal)
    )
  }

  const fn class(display: bool) -> &'static str {
    if display {
      "math math-display"
    } else {
      "math math-inline"
    }
  }

  #[cfg(feature = "math")]
  fn to_mathml(literal: &str, display: bool) -> Option<String> {
    let style = if display {
      latex2mathml::DisplayStyle::Block
    } else {
      latex2mathml::DisplayStyle::Inline
    };
    match latex2mathml::latex_to_mathml(literal.trim(), style) {
      Ok(mathml) => Some(mathml),
      Err(e) => {
        debug!("Keeping math as TeX source: {e}");
        None
      },
    }
  }

  #[cfg(not(feature = "math"))]
  const fn to_mathml(_literal: &str, _display: bool) -> Option<String> {
    None
  }
}

impl AstTransformer for MathTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    for child in node.children() {
      {
        let mut data = child.data.borrow_mut();
        if let NodeValue::Math(ref math) = data.value {
          let html = Self::render(&math.literal, math.display_math);
          data.value = NodeValue::HtmlInline(html);
        }
      }
      self.transform(child);
    }
  }
}

/// Builder for constructing `MarkdownOptions` with method chaining.
#[derive(Debug, Clone)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self {
      options: MarkdownOptions::default(),
    }
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  /// Enable or disable dollar math.
  #[must_use]
  pub const fn math(mut self, enabled: bool) -> Self {
    self.options.math = enabled;
    self
  }

  /// Enable or disable syntax highlighting.
  #[must_use]
  pub const fn highlight_code(mut self, enabled: bool) -> Self {
    self.options.highlight_code = enabled;
    self
  }

  /// Enable or disable fence-aware directive scanning.
  #[must_use]
  pub const fn fence_aware_directives(mut self, enabled: bool) -> Self {
    self.options.fence_aware_directives = enabled;
    self
  }

  /// Build the final `MarkdownOptions`.
  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}

impl Default for MarkdownOptionsBuilder {
  fn default() -> Self {
    Self::new()
  }
}
