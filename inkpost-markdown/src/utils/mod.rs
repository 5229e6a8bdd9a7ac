use std::collections::HashSet;

pub mod codeblock;
mod entities;

pub use entities::decode_html_entities;

/// Slugify a string for use as an anchor ID.
///
/// Lowercases the text and collapses every run of non-alphanumeric characters
/// into a single dash, trimming dashes at both ends. Non-ASCII letters and
/// digits are kept as they are.
#[must_use]
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_dash = false;

  for c in text.chars().flat_map(char::to_lowercase) {
    if c.is_alphanumeric() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c);
    } else {
      pending_dash = true;
    }
  }

  slug
}

/// Hands out unique heading slugs within one document.
///
/// The first occurrence of a slug is used verbatim, later ones get `-1`, `-2`
/// and so on appended, skipping any suffixed form that is already taken.
#[derive(Debug, Default)]
pub struct SlugAllocator {
  taken: HashSet<String>,
}

impl SlugAllocator {
  /// Slug used when the heading text has no alphanumeric characters at all.
  pub const EMPTY_SLUG: &'static str = "section";

  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Mark an id as used without deriving it from text.
  ///
  /// Returns `false` if the id was already taken.
  pub fn reserve(&mut self, id: &str) -> bool {
    self.taken.insert(id.to_string())
  }

  /// Derive a unique slug for the given heading text.
  pub fn allocate(&mut self, text: &str) -> String {
    let mut base = slugify(text);
    if base.is_empty() {
      base = Self::EMPTY_SLUG.to_string();
    }

    if self.taken.insert(base.clone()) {
      return base;
    }

    let mut counter = 1usize;
    loop {
      let candidate = format!("{base}-{counter}");
      if self.taken.insert(candidate.clone()) {
        return candidate;
      }
      counter += 1;
    }
  }
}

/// Escape source text for placement inside highlighted `<pre>` markup.
///
/// Only `&` and `<` need escaping in HTML text content. They are written as
/// hexadecimal references so that no named entity such as `&lt;` or `&amp;`
/// ends up inside a highlighted block.
#[must_use]
pub fn escape_code_text(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&#x26;"),
      '<' => out.push_str("&#x3C;"),
      _ => out.push(c),
    }
  }
  out
}

/// Strip every HTML tag from a fragment, leaving text and entities untouched.
#[must_use]
pub fn strip_tags(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut rest = html;

  while let Some(start) = rest.find('<') {
    out.push_str(&rest[..start]);
    match rest[start..].find('>') {
      Some(end) => rest = &rest[start + end + 1..],
      None => {
        // An unclosed `<` is not a tag
        out.push_str(&rest[start..]);
        rest = "";
      },
    }
  }

  out.push_str(rest);
  out
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile, so a
/// broken pattern turns its stage into a no-op instead of a panic.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
pub fn never_matching_regex() -> regex::Regex {
  regex::Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(
      clippy::expect_used,
      reason = "This pattern is guaranteed to be valid"
    )]
    regex::Regex::new(r"^\b$").expect("regex pattern ^\\b$ should always compile")
  })
}
