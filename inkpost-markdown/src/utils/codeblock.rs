/// Tracks whether a line-by-line scan is inside a fenced code block.
///
/// Follows the `CommonMark` fence rules closely enough for preprocessing: a
/// fence is three or more backticks or tildes indented by at most three
/// spaces, and a block is closed only by a bare fence of the same character
/// that is at least as long as the opening one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  open: Option<(char, usize)>,
}

impl FenceTracker {
  /// Create a tracker positioned outside of any code block.
  #[must_use]
  pub const fn new() -> Self {
    Self { open: None }
  }

  /// Check if currently inside a code block.
  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.open.is_some()
  }

  /// Feed the next line and return the state after it.
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    let Some((fence_char, count, rest)) = parse_fence(line) else {
      return *self;
    };

    match self.open {
      None => {
        // Backtick fences may not carry backticks in their info string
        if fence_char == '`' && rest.contains('`') {
          return *self;
        }
        Self {
          open: Some((fence_char, count)),
        }
      },
      Some((open_char, open_count))
        if open_char == fence_char
          && count >= open_count
          && rest.trim().is_empty() =>
      {
        Self { open: None }
      },
      Some(_) => *self,
    }
  }
}

/// Split a fence line into its character, run length and trailing text.
fn parse_fence(line: &str) -> Option<(char, usize, &str)> {
  let indent = line.len() - line.trim_start_matches(' ').len();
  if indent > 3 {
    return None;
  }

  let trimmed = &line[indent..];
  let fence_char = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
  let count = trimmed.chars().take_while(|&c| c == fence_char).count();
  if count < 3 {
    return None;
  }

  // Fence characters are ASCII, so the count is also the byte offset
  Some((fence_char, count, &trimmed[count..]))
}
