//! # inkpost-markdown - Markdown rendering for statically generated blogs
//!
//! Turns the Markdown body of a post into an HTML fragment that can be
//! embedded directly into a page, together with the table of contents built
//! from its `<h2>`/`<h3>` headings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inkpost_markdown::{HighlighterHandle, MarkdownOptions, MarkdownProcessor};
//!
//! # async fn run() -> Result<(), inkpost_markdown::RenderError> {
//! let highlighter = HighlighterHandle::default();
//! let processor =
//!   MarkdownProcessor::new(MarkdownOptions::default(), highlighter);
//!
//! let result = processor.render("## Hello\n\n:::note warn\nCareful!\n:::").await?;
//! println!("HTML: {}", result.html);
//! println!("Headings: {:?}", result.headings);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! Every render runs four stages, strictly in order:
//!
//! 1. **Note directives** - `:::note [info|warn|alert]` blocks are rewritten
//!    into wrapper markup whose body is still parsed as Markdown.
//! 2. **Markdown** - `comrak` with GFM and dollar math rendered to MathML,
//!    plus slug ids on every heading.
//! 3. **Code blocks** - fenced code is decoded and highlighted with `syntect`,
//!    or turned into a `mermaid` placeholder for client-side diagrams.
//! 4. **Headings** - `<h2>`/`<h3>` elements carrying an `id` are collected.
//!
//! The highlighting engine is expensive to build, so it lives behind an
//! explicit [`HighlighterHandle`] that loads it at most once, no matter how
//! many renders race for it.

pub mod processor;
pub mod syntax;
mod types;
pub mod utils;

pub use crate::{
  processor::{
    AstTransformer,
    MarkdownOptions,
    MarkdownOptionsBuilder,
    MarkdownProcessor,
    MathTransformer,
    NoteKind,
    extract_headings,
    highlight_code_blocks,
    markdown_to_html,
    process_note_blocks,
  },
  syntax::{
    HighlightSettings,
    HighlighterHandle,
    SyntaxError,
    SyntaxHighlighter,
    SyntaxManager,
  },
  types::{Heading, MarkdownResult, RenderError},
  utils::decode_html_entities,
};
