//! Syntect-based syntax highlighting backend enhanced with two-face.
//!
//! Grammars come from two-face's extended syntax set, which covers
//! TypeScript/TSX and friends that plain syntect lacks. Only a fixed list of
//! languages is exposed, and exactly one theme is kept after loading.

use std::collections::HashMap;

use syntect::{
  easy::HighlightLines,
  highlighting::{Color, FontStyle, Style, Theme, ThemeSet},
  parsing::SyntaxSet,
  util::LinesWithEndings,
};
use two_face::theme::EmbeddedThemeName;

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{PLAIN_TEXT, SyntaxConfig, SyntaxHighlighter, SyntaxManager},
};

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "OneHalfDark";

/// Languages exposed by the highlighter, paired with the token syntect uses
/// to find their grammar.
const LANGUAGES: &[(&str, &str)] = &[
  ("typescript", "ts"),
  ("javascript", "js"),
  ("tsx", "tsx"),
  ("jsx", "jsx"),
  ("html", "html"),
  ("css", "css"),
  ("json", "json"),
  ("bash", "bash"),
  ("shell", "bash"),
  ("python", "py"),
  ("rust", "rs"),
  ("go", "go"),
  ("yaml", "yaml"),
  ("markdown", "md"),
  ("sql", "sql"),
  ("diff", "diff"),
];

/// Syntect-based syntax highlighter
pub struct SyntectHighlighter {
  syntax_set: SyntaxSet,
  /// Canonical language name to syntect syntax name
  grammars:   HashMap<String, String>,
  theme:      Theme,
  theme_name: String,
}

impl SyntectHighlighter {
  /// Load the grammars and the named theme.
  ///
  /// This is the expensive step; callers are expected to do it once.
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::ThemeNotFound`] if the theme name is unknown.
  pub fn new(theme_name: Option<&str>) -> SyntaxResult<Self> {
    let theme_name = theme_name.unwrap_or(DEFAULT_THEME);
    let theme = load_theme(theme_name)?;
    let syntax_set = two_face::syntax::extra_newlines();

    let mut grammars = HashMap::with_capacity(LANGUAGES.len() + 1);
    grammars.insert(
      PLAIN_TEXT.to_string(),
      syntax_set.find_syntax_plain_text().name.clone(),
    );
    for (language, token) in LANGUAGES {
      match syntax_set.find_syntax_by_token(token) {
        Some(syntax) => {
          grammars.insert((*language).to_string(), syntax.name.clone());
        },
        None => log::warn!("No grammar found for '{language}', skipping"),
      }
    }

    log::debug!(
      "Loaded {} grammars with theme '{theme_name}'",
      grammars.len()
    );

    Ok(Self {
      syntax_set,
      grammars,
      theme,
      theme_name: theme_name.to_string(),
    })
  }

  /// Name of the single loaded theme.
  #[must_use]
  pub fn theme_name(&self) -> &str {
    &self.theme_name
  }

  fn pre_style(&self) -> String {
    let mut style = String::new();
    if let Some(background) = self.theme.settings.background {
      style.push_str(&format!("background-color:{};", css_color(background)));
    }
    if let Some(foreground) = self.theme.settings.foreground {
      style.push_str(&format!("color:{};", css_color(foreground)));
    }
    style
  }
}

impl SyntaxHighlighter for SyntectHighlighter {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn supported_languages(&self) -> Vec<String> {
    let mut languages: Vec<String> = self.grammars.keys().cloned().collect();
    languages.sort();
    languages
  }

  fn supports_language(&self, language: &str) -> bool {
    self.grammars.contains_key(language)
  }

  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String> {
    let syntax = self
      .grammars
      .get(language)
      .and_then(|name| self.syntax_set.find_syntax_by_name(name))
      .ok_or_else(|| SyntaxError::UnsupportedLanguage(language.to_string()))?;

    let mut highlighter = HighlightLines::new(syntax, &self.theme);
    let mut body = String::with_capacity(code.len() * 2);

    for (index, line) in LinesWithEndings::from(code).enumerate() {
      let regions = highlighter
        .highlight_line(line, &self.syntax_set)
        .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;

      if index > 0 {
        body.push('\n');
      }
      body.push_str("<span class=\"line\">");
      for (style, text) in regions {
        let text = text.trim_end_matches(['\n', '\r']);
        if !text.is_empty() {
          push_token(&mut body, style, text);
        }
      }
      body.push_str("</span>");
    }

    Ok(format!(
      "<pre class=\"highlight\" style=\"{}\" tabindex=\"0\"><code>{body}</code></pre>",
      self.pre_style()
    ))
  }
}

fn push_token(out: &mut String, style: Style, text: &str) {
  out.push_str("<span style=\"color:");
  out.push_str(&css_color(style.foreground));
  if style.font_style.contains(FontStyle::BOLD) {
    out.push_str(";font-weight:bold");
  }
  if style.font_style.contains(FontStyle::ITALIC) {
    out.push_str(";font-style:italic");
  }
  if style.font_style.contains(FontStyle::UNDERLINE) {
    out.push_str(";text-decoration:underline");
  }
  out.push_str("\">");
  out.push_str(&crate::utils::escape_code_text(text));
  out.push_str("</span>");
}

fn css_color(color: Color) -> String {
  if color.a == 0xFF {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
  } else {
    format!("#{:02x}{:02x}{:02x}{:02x}", color.r, color.g, color.b, color.a)
  }
}

/// Load exactly one theme, from syntect's defaults or two-face's extras.
fn load_theme(name: &str) -> SyntaxResult<Theme> {
  let mut defaults = ThemeSet::load_defaults();
  if let Some(theme) = defaults.themes.remove(name) {
    return Ok(theme);
  }

  let embedded = match name {
    "Base16EightiesDark" => EmbeddedThemeName::Base16EightiesDark,
    "Base16MochaDark" => EmbeddedThemeName::Base16MochaDark,
    "Base16OceanDark" => EmbeddedThemeName::Base16OceanDark,
    "Base16OceanLight" => EmbeddedThemeName::Base16OceanLight,
    "ColdarkCold" => EmbeddedThemeName::ColdarkCold,
    "ColdarkDark" => EmbeddedThemeName::ColdarkDark,
    "DarkNeon" => EmbeddedThemeName::DarkNeon,
    "Dracula" => EmbeddedThemeName::Dracula,
    "Github" => EmbeddedThemeName::Github,
    "GruvboxDark" => EmbeddedThemeName::GruvboxDark,
    "GruvboxLight" => EmbeddedThemeName::GruvboxLight,
    "MonokaiExtended" => EmbeddedThemeName::MonokaiExtended,
    "Nord" => EmbeddedThemeName::Nord,
    "OneHalfDark" => EmbeddedThemeName::OneHalfDark,
    "OneHalfLight" => EmbeddedThemeName::OneHalfLight,
    "SolarizedDark" => EmbeddedThemeName::SolarizedDark,
    "SolarizedLight" => EmbeddedThemeName::SolarizedLight,
    "SublimeSnazzy" => EmbeddedThemeName::SublimeSnazzy,
    "TwoDark" => EmbeddedThemeName::TwoDark,
    "VisualStudioDarkPlus" => EmbeddedThemeName::VisualStudioDarkPlus,
    "Zenburn" => EmbeddedThemeName::Zenburn,
    _ => return Err(SyntaxError::ThemeNotFound(name.to_string())),
  };

  Ok(two_face::theme::extra().get(embedded).clone())
}

/// Create a Syntect-based syntax manager for the given theme.
///
/// # Errors
///
/// Returns an error if the theme cannot be loaded.
pub fn create_syntect_manager(
  theme_name: Option<&str>,
) -> SyntaxResult<SyntaxManager> {
  let highlighter = SyntectHighlighter::new(theme_name)?;
  Ok(SyntaxManager::new(
    Box::new(highlighter),
    SyntaxConfig::default(),
  ))
}
