//! Core types and traits for syntax highlighting.

use std::collections::HashMap;

use super::error::{SyntaxError, SyntaxResult};

/// Language every undeclared code block is highlighted as.
pub const PLAIN_TEXT: &str = "text";

/// Trait for syntax highlighting backends.
///
/// A backend owns its grammars and exactly one theme. Once built it is only
/// read from, which is why it must be `Send + Sync`: a single instance is
/// shared by every concurrent render.
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get the list of canonical language names this backend highlights
  fn supported_languages(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Highlight code written in a canonical language name.
  ///
  /// Returns a complete `<pre>` element on success.
  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String>;
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    let language_aliases = [
      ("ts", "typescript"),
      ("js", "javascript"),
      ("sh", "bash"),
      ("zsh", "bash"),
      ("py", "python"),
      ("rs", "rust"),
      ("golang", "go"),
      ("yml", "yaml"),
      ("md", "markdown"),
      ("txt", PLAIN_TEXT),
      ("plain", PLAIN_TEXT),
      ("plaintext", PLAIN_TEXT),
    ]
    .into_iter()
    .map(|(alias, lang)| (alias.to_string(), lang.to_string()))
    .collect();

    Self { language_aliases }
  }
}

/// High-level syntax highlighting manager.
///
/// Pairs a backend with alias resolution. Unlike a generic documentation
/// highlighter it never falls back to plain text for unknown languages: the
/// caller decides what an unsupported block looks like.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl SyntaxManager {
  /// Create a new syntax manager with the given highlighter and config
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self {
      highlighter,
      config,
    }
  }

  /// Create a new syntax manager with the default configuration
  #[must_use]
  pub fn with_highlighter(highlighter: Box<dyn SyntaxHighlighter>) -> Self {
    Self::new(highlighter, SyntaxConfig::default())
  }

  /// Get the underlying highlighter
  #[must_use]
  pub fn highlighter(&self) -> &dyn SyntaxHighlighter {
    self.highlighter.as_ref()
  }

  /// Get the configuration
  #[must_use]
  pub const fn config(&self) -> &SyntaxConfig {
    &self.config
  }

  /// Resolve a language name using aliases
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let lowered = language.to_ascii_lowercase();
    self
      .config
      .language_aliases
      .get(&lowered)
      .cloned()
      .unwrap_or(lowered)
  }

  /// Highlight code after resolving the language alias.
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::UnsupportedLanguage`] when the backend does not
  /// know the language, or whatever the backend reports while highlighting.
  pub fn highlight_code(
    &self,
    code: &str,
    language: &str,
  ) -> SyntaxResult<String> {
    let resolved = self.resolve_language(language);

    if !self.highlighter.supports_language(&resolved) {
      return Err(SyntaxError::UnsupportedLanguage(resolved));
    }

    self.highlighter.highlight(code, &resolved)
  }
}
