#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use std::{fs, path::PathBuf};

use inkpost_config::{Config, ConfigError, ConfigFormat};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
  let path = dir.path().join(name);
  fs::write(&path, content).expect("write config file");
  path
}

#[test]
fn test_load_toml_file() {
  let dir = TempDir::new().expect("tempdir");
  let path = write(
    &dir,
    "inkpost.toml",
    "input_dir = \"posts\"\nhighlight_theme = \"Nord\"\nmath = false\n",
  );

  let config = Config::from_file(&path).expect("valid toml");
  assert_eq!(config.input_dir, Some(PathBuf::from("posts")));
  assert_eq!(config.highlight_theme, "Nord");
  assert!(!config.math);
  // Unmentioned keys keep their defaults
  assert_eq!(config.output_dir, PathBuf::from("build"));
  assert!(config.gfm);
}

#[test]
fn test_load_json_file() {
  let dir = TempDir::new().expect("tempdir");
  let path = write(
    &dir,
    "inkpost.json",
    r#"{ "output_dir": "public", "jobs": 3, "write_toc": false }"#,
  );

  let config = Config::from_file(&path).expect("valid json");
  assert_eq!(config.output_dir, PathBuf::from("public"));
  assert_eq!(config.jobs, Some(3));
  assert!(!config.write_toc);
}

#[test]
fn test_later_files_override_only_their_keys() {
  let dir = TempDir::new().expect("tempdir");
  let base = write(
    &dir,
    "base.toml",
    "input_dir = \"posts\"\noutput_dir = \"out\"\ngfm = false\n",
  );
  let local = write(&dir, "local.json", r#"{ "output_dir": "dist" }"#);

  let config = Config::load(&[base, local], &[]).expect("configs merge");
  assert_eq!(config.input_dir, Some(PathBuf::from("posts")));
  assert_eq!(config.output_dir, PathBuf::from("dist"));
  assert!(!config.gfm);
}

#[test]
fn test_overrides_apply_after_files() {
  let dir = TempDir::new().expect("tempdir");
  let base = write(&dir, "base.toml", "math = false\njobs = 2\n");

  let config = Config::load(&[base], &[
    "math=true".to_string(),
    "jobs=6".to_string(),
  ])
  .expect("overrides apply");
  assert!(config.math);
  assert_eq!(config.jobs, Some(6));
}

#[test]
fn test_invalid_files() {
  let dir = TempDir::new().expect("tempdir");

  let broken = write(&dir, "broken.toml", "math = [");
  let err = Config::from_file(&broken).expect_err("broken toml");
  assert!(err.to_string().contains("Failed to parse TOML"));

  let yaml = write(&dir, "inkpost.yaml", "math: false\n");
  let err = Config::from_file(&yaml).expect_err("yaml is unsupported");
  assert!(err.to_string().contains("Unsupported config file format"));

  let wrong_type = write(&dir, "wrong.json", r#"{ "math": "sometimes" }"#);
  assert!(matches!(
    Config::from_file(&wrong_type),
    Err(ConfigError::Serde(_))
  ));

  let missing = dir.path().join("missing.toml");
  assert!(Config::from_file(&missing).is_err());
}

#[test]
fn test_generated_default_config_round_trips() {
  let dir = TempDir::new().expect("tempdir");

  for format in [ConfigFormat::Toml, ConfigFormat::Json] {
    let path = dir.path().join(format!("inkpost.{format}"));
    Config::generate_default_config(format, &path)
      .expect("default config is written");
    let loaded = Config::from_file(&path).expect("generated config loads");
    assert_eq!(loaded, Config::default());
  }
}
