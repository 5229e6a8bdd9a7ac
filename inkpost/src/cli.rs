use std::path::PathBuf;

use clap::{Parser, Subcommand};
use inkpost_config::{Config, ConfigFormat};

/// Command line interface for inkpost
#[derive(Parser, Debug)]
#[command(author, version, about = "inkpost: Markdown posts to HTML fragments")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append, global = true)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", action = clap::ArgAction::Append, global = true)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the inkpost CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new inkpost configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "inkpost.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Render a single post and print the result.
  Render {
    /// Markdown file to render.
    file: PathBuf,

    /// Print the HTML and headings as JSON instead of bare HTML.
    #[arg(long)]
    json: bool,
  },

  /// Render every post in a directory.
  Build {
    /// Path to the directory containing markdown files.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory for rendered fragments.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of posts rendered concurrently.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,

    /// Disable syntax highlighting for code blocks.
    #[arg(long = "no-highlight", action = clap::ArgAction::SetTrue)]
    no_highlight: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Init format as a [`ConfigFormat`].
  ///
  /// Clap restricts the value, so anything else falls back to TOML.
  #[must_use]
  pub fn init_format(format: &str) -> ConfigFormat {
    format.parse().unwrap_or_default()
  }

  /// Apply explicit `build` flags on top of a loaded configuration.
  ///
  /// Flags win over both config files and `--config` overrides.
  pub fn merge_build_flags(&self, config: &mut Config) {
    if let Commands::Build {
      input_dir,
      output_dir,
      jobs,
      no_highlight,
    } = &self.command
    {
      if let Some(input_dir) = input_dir {
        config.input_dir = Some(input_dir.clone());
      }
      if let Some(output_dir) = output_dir {
        config.output_dir.clone_from(output_dir);
      }
      if let Some(jobs) = jobs {
        config.jobs = Some(*jobs);
      }
      if *no_highlight {
        config.highlight_code = false;
      }
    }
  }
}

#[cfg(test)]
#[allow(clippy::panic, reason = "Fine in tests")]
mod tests {
  use super::*;

  #[test]
  fn test_build_flags_override_config() {
    let cli = Cli::parse_from([
      "inkpost",
      "build",
      "-i",
      "posts",
      "-o",
      "public",
      "-p",
      "3",
      "--no-highlight",
    ]);
    let mut config = Config {
      output_dir: PathBuf::from("from-file"),
      ..Config::default()
    };
    cli.merge_build_flags(&mut config);

    assert_eq!(config.input_dir, Some(PathBuf::from("posts")));
    assert_eq!(config.output_dir, PathBuf::from("public"));
    assert_eq!(config.jobs, Some(3));
    assert!(!config.highlight_code);
  }

  #[test]
  fn test_missing_flags_keep_config() {
    let cli = Cli::parse_from(["inkpost", "build"]);
    let mut config = Config {
      output_dir: PathBuf::from("from-file"),
      ..Config::default()
    };
    cli.merge_build_flags(&mut config);
    assert_eq!(config.output_dir, PathBuf::from("from-file"));
    assert!(config.highlight_code);
  }

  #[test]
  fn test_global_options_after_subcommand() {
    let cli = Cli::parse_from([
      "inkpost",
      "render",
      "post.md",
      "--json",
      "-v",
      "--config",
      "math=false",
      "-c",
      "a.toml",
      "-c",
      "b.json",
    ]);
    assert!(cli.verbose);
    assert_eq!(cli.config_overrides, vec!["math=false".to_string()]);
    assert_eq!(cli.config_files.len(), 2);
    assert!(matches!(cli.command, Commands::Render { json: true, .. }));
  }

  #[test]
  fn test_init_defaults() {
    let cli = Cli::parse_from(["inkpost", "init", "-F", "json"]);
    let Commands::Init {
      output,
      format,
      force,
    } = cli.command
    else {
      panic!("expected init");
    };
    assert_eq!(output, PathBuf::from("inkpost.toml"));
    assert_eq!(Cli::init_format(&format), ConfigFormat::Json);
    assert!(!force);
  }
}
