//! Code block post-processing.
//!
//! Works on the rendered HTML rather than the AST: every
//! `<pre><code class="language-X">...</code></pre>` produced by the parser is
//! replaced by wrapper markup, highlighted when the engine knows the
//! language and left as plain escaped code otherwise.

use std::sync::LazyLock;

use log::{debug, error, warn};
use regex::{Captures, Regex};

use crate::{
  syntax::{PLAIN_TEXT, SyntaxError, SyntaxManager},
  utils::{self, decode_html_entities, escape_code_text},
};

/// Language that is rendered as a diagram placeholder instead of code.
pub const MERMAID: &str = "mermaid";

static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r#"<pre><code(?:\s+class="language-([^"]+)")?>([\s\S]*?)</code></pre>"#,
  )
  .unwrap_or_else(|e| {
    error!("Failed to compile CODE_BLOCK_RE regex: {e}");
    utils::never_matching_regex()
  })
});

/// Replace every rendered code block in `html`.
///
/// - `mermaid` blocks become `<div class="mermaid-block"><pre
///   class="mermaid">...</pre></div>` holding the decoded, trimmed source.
/// - Blocks in a language the engine supports become a highlighted `<pre>`
///   inside `<div class="code-block-wrapper">` with a language label.
/// - Everything else, including every block when `engine` is `None`, keeps
///   its original escaped body inside the same wrapper without a label.
///
/// Blocks without a language are treated as `text`. Highlighting failures
/// only affect the block they happen in.
#[must_use]
pub fn highlight_code_blocks(
  html: &str,
  engine: Option<&SyntaxManager>,
) -> String {
  if !html.contains("<pre><code") {
    return html.to_string();
  }

  CODE_BLOCK_RE
    .replace_all(html, |caps: &Captures| {
      let language = caps.get(1).map_or_else(
        || PLAIN_TEXT.to_string(),
        |m| decode_html_entities(m.as_str()),
      );
      render_code_block(&language, &caps[2], engine)
    })
    .into_owned()
}

fn render_code_block(
  language: &str,
  escaped: &str,
  engine: Option<&SyntaxManager>,
) -> String {
  let code = decode_html_entities(escaped);
  let code = code.trim();

  if language == MERMAID {
    return format!(
      "<div class=\"mermaid-block\"><pre class=\"mermaid\">{}</pre></div>",
      escape_code_text(code)
    );
  }

  let attr = html_escape::encode_double_quoted_attribute(language);

  if let Some(engine) = engine {
    match engine.highlight_code(code, language) {
      Ok(highlighted) => {
        return format!(
          "<div class=\"code-block-wrapper\" data-language=\"{attr}\"><span \
           class=\"code-language\">{}</span>{highlighted}</div>",
          html_escape::encode_text(language)
        );
      },
      Err(SyntaxError::UnsupportedLanguage(resolved)) => {
        debug!("No grammar for '{resolved}', leaving code block unhighlighted");
      },
      Err(e) => warn!("Failed to highlight '{language}' code block: {e}"),
    }
  }

  format!(
    "<div class=\"code-block-wrapper\" \
     data-language=\"{attr}\"><pre><code>{escaped}</code></pre></div>"
  )
}
