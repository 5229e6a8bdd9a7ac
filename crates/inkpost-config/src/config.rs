use std::{
  fmt,
  fs,
  path::{Path, PathBuf},
  str::FromStr,
  sync::OnceLock,
};

use inkpost_markdown::{
  HighlightSettings,
  MarkdownOptions,
  MarkdownOptionsBuilder,
  syntax::DEFAULT_THEME,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// File names searched in the working directory when no config file is
/// given explicitly.
const CONFIG_FILENAMES: [&str; 6] = [
  "inkpost.toml",
  "inkpost.json",
  ".inkpost.toml",
  ".inkpost.json",
  ".config/inkpost.toml",
  ".config/inkpost.json",
];

/// On-disk format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
  #[default]
  Toml,
  Json,
}

impl ConfigFormat {
  /// Detect the format from a file extension.
  #[must_use]
  pub fn from_path(path: &Path) -> Option<Self> {
    path
      .extension()
      .and_then(|ext| ext.to_str())
      .and_then(|ext| ext.parse().ok())
  }

  /// Conventional file extension.
  #[must_use]
  pub const fn extension(self) -> &'static str {
    match self {
      Self::Toml => "toml",
      Self::Json => "json",
    }
  }
}

impl FromStr for ConfigFormat {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "toml" => Ok(Self::Toml),
      "json" => Ok(Self::Json),
      other => {
        Err(ConfigError::Config(format!(
          "Unsupported config format: '{other}'. Expected toml or json"
        )))
      },
    }
  }
}

impl fmt::Display for ConfigFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.extension())
  }
}

/// Configuration for an inkpost build.
///
/// Fields are typically loaded from one or more TOML or JSON files, then
/// adjusted by `KEY=VALUE` overrides and finally by explicit CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct Config {
  /// Directory containing the Markdown posts.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub input_dir: Option<PathBuf>,

  /// Directory the rendered fragments are written to.
  pub output_dir: PathBuf,

  /// Number of posts rendered at the same time. Defaults to the number of
  /// CPUs.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub jobs: Option<usize>,

  /// Whether to syntax highlight code blocks.
  pub highlight_code: bool,

  /// Name of the single highlighting theme.
  pub highlight_theme: String,

  /// Enable GitHub Flavored Markdown.
  pub gfm: bool,

  /// Enable dollar math.
  pub math: bool,

  /// Ignore `:::note` lines inside fenced code blocks.
  pub fence_aware_directives: bool,

  /// Write a `<slug>.toc.json` next to every rendered post.
  pub write_toc: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:              None,
      output_dir:             PathBuf::from("build"),
      jobs:                   None,
      highlight_code:         true,
      highlight_theme:        DEFAULT_THEME.to_string(),
      gfm:                    true,
      math:                   true,
      fence_aware_directives: false,
      write_toc:              true,
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let value = read_value(path.as_ref())?;
    Ok(serde_json::from_value(value)?)
  }

  /// Load configuration from files and `KEY=VALUE` overrides.
  ///
  /// Files are merged in order: a key set in a later file replaces the same
  /// key from an earlier one, keys it does not mention are kept. Without any
  /// file, a config file in a standard location is used if one exists.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be read or parsed, or an override is
  /// malformed.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if config_files.is_empty() {
      match Self::find_config_file() {
        Some(discovered) => {
          log::info!("Using discovered config file: {}", discovered.display());
          Self::from_file(&discovered)?
        },
        None => Self::default(),
      }
    } else {
      let mut merged = Value::Object(serde_json::Map::new());
      for config_path in config_files {
        merge_values(&mut merged, read_value(config_path)?);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      serde_json::from_value(merged)?
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in KEY=VALUE format, the key is
  /// unknown, or the value cannot be parsed as the field's type.
  ///
  /// # Example
  ///
  /// ```rust
  /// use inkpost_config::Config;
  ///
  /// let mut config = Config::default();
  /// config
  ///   .apply_overrides(&["math=false".to_string(), "jobs=4".to_string()])
  ///   .unwrap();
  /// assert!(!config.math);
  /// assert_eq!(config.jobs, Some(4));
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
      "input_dir" => {
        self.input_dir = (!value.is_empty()).then(|| PathBuf::from(value));
      },
      "output_dir" => self.output_dir = PathBuf::from(value),
      "jobs" => {
        self.jobs = if value.is_empty() {
          None
        } else {
          Some(parse_value(key, value)?)
        };
      },
      "highlight_code" => self.highlight_code = parse_bool(key, value)?,
      "highlight_theme" => self.highlight_theme = value.to_string(),
      "gfm" => self.gfm = parse_bool(key, value)?,
      "math" => self.math = parse_bool(key, value)?,
      "fence_aware_directives" => {
        self.fence_aware_directives = parse_bool(key, value)?;
      },
      "write_toc" => self.write_toc = parse_bool(key, value)?,
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'"
        )));
      },
    }
    Ok(())
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let current_dir = std::env::current_dir().ok()?;
        for filename in &CONFIG_FILENAMES {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home).join("inkpost");
          for filename in &["config.toml", "config.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Check that the configuration is usable for a build.
  ///
  /// # Errors
  ///
  /// Returns an error listing every problem found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    match self.input_dir {
      None => errors.push("Input directory is not set".to_string()),
      Some(ref input_dir) if !input_dir.is_dir() => {
        errors.push(format!(
          "Input directory does not exist: {}",
          input_dir.display()
        ));
      },
      Some(_) => {},
    }

    if self.jobs == Some(0) {
      errors.push("jobs must be at least 1".to_string());
    }

    if self.highlight_code && self.highlight_theme.trim().is_empty() {
      errors.push("highlight_theme must not be empty".to_string());
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ConfigError::Config(errors.join("\n")))
    }
  }

  /// Serialize the configuration in the given format.
  ///
  /// # Errors
  ///
  /// Returns an error if serialization fails.
  pub fn to_string_in(&self, format: ConfigFormat) -> Result<String, ConfigError> {
    match format {
      ConfigFormat::Toml => Ok(toml::to_string_pretty(self)?),
      ConfigFormat::Json => Ok(serde_json::to_string_pretty(self)?),
    }
  }

  /// Generate a default configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be written.
  pub fn generate_default_config(
    format: ConfigFormat,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let mut config_content = Self::default().to_string_in(format)?;
    if format == ConfigFormat::Toml {
      config_content = format!(
        "# inkpost configuration\n#\n# input_dir = \"posts\"\n# jobs = \
         4\n\n{config_content}"
      );
    }

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Rendering options for the Markdown pipeline.
  #[must_use]
  pub fn markdown_options(&self) -> MarkdownOptions {
    MarkdownOptionsBuilder::new()
      .gfm(self.gfm)
      .math(self.math)
      .highlight_code(self.highlight_code)
      .fence_aware_directives(self.fence_aware_directives)
      .build()
  }

  /// Settings used to build the highlighting engine.
  #[must_use]
  pub fn highlight_settings(&self) -> HighlightSettings {
    HighlightSettings {
      theme: self.highlight_theme.clone(),
    }
  }
}

/// Read a config file into a generic value, whatever its format.
fn read_value(path: &Path) -> Result<Value, ConfigError> {
  let content = fs::read_to_string(path).map_err(|e| {
    ConfigError::Config(format!(
      "Failed to read config file: {}: {}",
      path.display(),
      e
    ))
  })?;

  let format = ConfigFormat::from_path(path).ok_or_else(|| {
    ConfigError::Config(format!(
      "Unsupported config file format: {}",
      path.display()
    ))
  })?;

  match format {
    ConfigFormat::Json => {
      serde_json::from_str(&content).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to parse JSON config from {}: {}",
          path.display(),
          e
        ))
      })
    },
    ConfigFormat::Toml => {
      toml::from_str(&content).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to parse TOML config from {}: {}",
          path.display(),
          e
        ))
      })
    },
  }
}

/// Merge `other` into `base`, recursing into tables.
fn merge_values(base: &mut Value, other: Value) {
  match (base, other) {
    (Value::Object(base), Value::Object(other)) => {
      for (key, value) in other {
        match base.get_mut(&key) {
          Some(existing) => merge_values(existing, value),
          None => {
            base.insert(key, value);
          },
        }
      }
    },
    (base, other) => *base = other,
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "on" | "1" => Ok(true),
    "false" | "no" | "off" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'"
      )))
    },
  }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
  T::Err: fmt::Display,
{
  value.parse().map_err(|e| {
    ConfigError::Config(format!("Invalid value for '{key}': '{value}' ({e})"))
  })
}
