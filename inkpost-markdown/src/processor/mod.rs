//! Markdown processing module with modular organization.
//!
//! # Architecture
//!
//! The processor module is organized into focused submodules:
//!
//! - [`core`]: Main processor implementation and rendering pipeline
//! - [`extensions`]: The `:::note` directive preprocessor
//! - [`highlight`]: Code block post-processing
//! - [`headings`]: Table of contents extraction
//! - [`process`]: High-level processing functions
//! - [`types`]: Core type definitions and configuration structures
pub mod core;
pub mod extensions;
pub mod headings;
pub mod highlight;
pub mod process;
pub mod types;

pub use extensions::{NoteKind, process_note_blocks};
pub use headings::extract_headings;
pub use highlight::{MERMAID, highlight_code_blocks};
pub use process::markdown_to_html;
pub use types::{
  AstTransformer,
  MarkdownOptions,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
  MathTransformer,
};

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::syntax::{
    HighlighterHandle,
    PLAIN_TEXT,
    SyntaxHighlighter,
    SyntaxManager,
    SyntaxResult,
  };

  struct MarkerHighlighter;

  impl SyntaxHighlighter for MarkerHighlighter {
    fn name(&self) -> &'static str {
      "Marker"
    }

    fn supported_languages(&self) -> Vec<String> {
      vec!["typescript".to_string(), PLAIN_TEXT.to_string()]
    }

    fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String> {
      Ok(format!(
        "<pre class=\"highlight\"><code data-hl=\"{language}\">{}</code></pre>",
        crate::utils::escape_code_text(code)
      ))
    }
  }

  fn processor() -> MarkdownProcessor {
    MarkdownProcessor::new(
      MarkdownOptions::default(),
      HighlighterHandle::from_manager(SyntaxManager::with_highlighter(
        Box::new(MarkerHighlighter),
      )),
    )
  }

  #[tokio::test]
  async fn test_note_body_goes_through_markdown() {
    let result = processor()
      .render(":::note warn\n**Bold** and `code`\n:::")
      .await
      .expect("render should succeed");

    assert!(result.html.contains("qiita-note qiita-note-warn"));
    assert!(result.html.contains("<strong>Bold</strong>"));
    assert!(result.html.contains("<code>code</code>"));
  }

  #[tokio::test]
  async fn test_code_inside_note_is_highlighted() {
    let result = processor()
      .render(":::note\n```ts\nconst a: Array<string> = [];\n```\n:::")
      .await
      .expect("render should succeed");

    assert!(result.html.contains("qiita-note-info"));
    assert!(result.html.contains("data-language=\"ts\""));
    assert!(result.html.contains("data-hl=\"typescript\""));
    assert!(result.html.contains("Array&#x3C;string>"));
  }

  #[tokio::test]
  async fn test_highlighting_disabled_skips_engine() {
    let handle = HighlighterHandle::default();
    let processor = MarkdownProcessor::new(
      MarkdownOptionsBuilder::new().highlight_code(false).build(),
      handle.clone(),
    );
    let result = processor
      .render("```rust\nfn main() {}\n```")
      .await
      .expect("render should succeed");

    assert!(!handle.is_initialized());
    assert!(result.html.contains(
      "<div class=\"code-block-wrapper\" data-language=\"rust\"><pre><code>fn \
       main() {}\n</code></pre></div>"
    ));
  }

  #[tokio::test]
  async fn test_clones_share_highlighter() {
    let processor = processor();
    let clone = processor.clone();
    processor.render("```\nx\n```").await.expect("render");
    let a = processor.highlighter().get().await.expect("engine");
    let b = clone.highlighter().get().await.expect("engine");
    assert!(Arc::ptr_eq(&a, &b));
  }
}
