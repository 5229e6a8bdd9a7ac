//! Syntax highlighting for fenced code blocks.
//!
//! The backend sits behind the [`SyntaxHighlighter`] trait so tests (or a
//! different engine) can be plugged in. The shipped backend is **Syntect**,
//! with two-face providing the extended grammar set.

pub mod error;
pub mod handle;
pub mod syntect;
pub mod types;

pub use error::{SyntaxError, SyntaxResult};
pub use handle::{HighlightSettings, HighlighterHandle};
pub use syntect::{DEFAULT_THEME, SyntectHighlighter, create_syntect_manager};
pub use types::{PLAIN_TEXT, SyntaxConfig, SyntaxHighlighter, SyntaxManager};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_syntect_manager_resolves_aliases() {
    let manager =
      create_syntect_manager(None).expect("Failed to create syntect manager");

    assert_eq!(manager.resolve_language("ts"), "typescript");
    assert_eq!(manager.resolve_language("sh"), "bash");
    assert!(manager.highlight_code("echo hi", "sh").is_ok());
    assert!(manager.highlight_code("plain words", "txt").is_ok());
  }

  #[test]
  fn test_syntect_manager_rejects_unknown_language() {
    let manager =
      create_syntect_manager(None).expect("Failed to create syntect manager");

    assert!(matches!(
      manager.highlight_code("some code", "unknownlang"),
      Err(SyntaxError::UnsupportedLanguage(_))
    ));
  }
}
