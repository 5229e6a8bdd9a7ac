//! Rendering a whole directory of posts.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use color_eyre::eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use inkpost_config::Config;
use inkpost_markdown::{HighlighterHandle, MarkdownProcessor};
use log::{debug, error, info, trace};
use tokio::{sync::Semaphore, task::JoinSet};
use walkdir::WalkDir;

/// Where the outputs of one post go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostJob {
  /// Markdown source.
  pub source: PathBuf,
  /// Path of the source relative to the input directory, without extension.
  pub slug:   String,
  /// `<slug>.html`
  pub html:   PathBuf,
  /// `<slug>.toc.json`, when table of contents files are enabled.
  pub toc:    Option<PathBuf>,
}

/// Outcome of a directory build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
  pub rendered: usize,
  pub failed:   usize,
}

/// Collect all markdown files from the input directory, sorted by path.
#[must_use]
pub fn collect_markdown_files(input_dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
    .follow_links(true)
    .into_iter()
    .filter_map(Result::ok)
    .map(walkdir::DirEntry::into_path)
    .filter(|path| {
      path.is_file() && path.extension().is_some_and(|ext| ext == "md")
    })
    .collect();

  files.sort();
  trace!("Found {} markdown files to process", files.len());
  files
}

/// Work out the output locations for one source file.
///
/// The output tree mirrors the input tree: `posts/2024/hello.md` rendered from
/// `posts` into `build` becomes `build/2024/hello.html`.
#[must_use]
pub fn plan_post(
  input_dir: &Path,
  output_dir: &Path,
  source: &Path,
  write_toc: bool,
) -> PostJob {
  let relative = source.strip_prefix(input_dir).unwrap_or(source);
  let stem = relative.with_extension("");
  let slug = stem
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/");

  PostJob {
    source: source.to_path_buf(),
    slug,
    html: output_dir.join(relative.with_extension("html")),
    toc: write_toc
      .then(|| output_dir.join(relative.with_extension("toc.json"))),
  }
}

/// Number of concurrent renders for a configuration.
#[must_use]
pub fn effective_jobs(config: &Config) -> usize {
  config.jobs.unwrap_or_else(num_cpus::get).max(1)
}

/// Create the processor every post of a build shares.
#[must_use]
pub fn create_processor(config: &Config) -> MarkdownProcessor {
  MarkdownProcessor::new(
    config.markdown_options(),
    HighlighterHandle::new(config.highlight_settings()),
  )
}

/// Render one post and write its outputs.
///
/// # Errors
///
/// Returns an error if the source cannot be read, the render fails, or an
/// output cannot be written.
pub async fn render_post(
  processor: &MarkdownProcessor,
  job: &PostJob,
) -> Result<usize> {
  let markdown = tokio::fs::read_to_string(&job.source)
    .await
    .wrap_err_with(|| format!("Failed to read {}", job.source.display()))?;

  let result = processor
    .render(&markdown)
    .await
    .wrap_err_with(|| format!("Failed to render {}", job.source.display()))?;

  if let Some(parent) = job.html.parent() {
    tokio::fs::create_dir_all(parent).await.wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
  }

  tokio::fs::write(&job.html, &result.html)
    .await
    .wrap_err_with(|| format!("Failed to write {}", job.html.display()))?;

  if let Some(ref toc) = job.toc {
    let json = serde_json::to_string_pretty(&result.headings)
      .wrap_err("Failed to serialize table of contents")?;
    tokio::fs::write(toc, json)
      .await
      .wrap_err_with(|| format!("Failed to write {}", toc.display()))?;
  }

  debug!(
    "Rendered {} ({} headings)",
    job.slug,
    result.headings.len()
  );
  Ok(result.headings.len())
}

/// Render every post under the configured input directory.
///
/// Posts render concurrently, at most `jobs` at a time, all sharing one
/// processor and therefore one highlighting engine. A post that fails is
/// logged and counted; the others still get written.
///
/// # Errors
///
/// Returns an error only if the build cannot start at all, e.g. because the
/// input directory is not configured or the output directory cannot be
/// created.
pub async fn build_posts(
  config: &Config,
  processor: &MarkdownProcessor,
  progress: &ProgressBar,
) -> Result<BuildSummary> {
  let input_dir = config
    .input_dir
    .as_deref()
    .ok_or_else(|| color_eyre::eyre::eyre!("Input directory is not set"))?;

  tokio::fs::create_dir_all(&config.output_dir)
    .await
    .wrap_err_with(|| {
      format!(
        "Failed to create output directory: {}",
        config.output_dir.display()
      )
    })?;

  let files = collect_markdown_files(input_dir);
  progress.set_length(files.len() as u64);
  info!(
    "Rendering {} posts from {} into {}",
    files.len(),
    input_dir.display(),
    config.output_dir.display()
  );

  let permits = Arc::new(Semaphore::new(effective_jobs(config)));
  let mut tasks = JoinSet::new();

  for source in files {
    let job =
      plan_post(input_dir, &config.output_dir, &source, config.write_toc);
    let processor = processor.clone();
    let permits = Arc::clone(&permits);
    tasks.spawn(async move {
      let _permit = permits.acquire_owned().await.ok();
      let outcome = render_post(&processor, &job).await;
      (job, outcome)
    });
  }

  let mut summary = BuildSummary::default();
  while let Some(joined) = tasks.join_next().await {
    match joined {
      Ok((_, Ok(_))) => summary.rendered += 1,
      Ok((job, Err(e))) => {
        error!("Failed to build {}: {e:?}", job.slug);
        summary.failed += 1;
      },
      Err(e) => {
        error!("Render task failed: {e}");
        summary.failed += 1;
      },
    }
    progress.inc(1);
  }

  Ok(summary)
}

/// Progress bar for a directory build.
///
/// # Errors
///
/// Returns an error if the progress template is invalid.
pub fn progress_bar() -> Result<ProgressBar> {
  let progress = ProgressBar::new(0);
  progress.set_style(
    ProgressStyle::default_bar()
      .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} posts ({eta})")
      .wrap_err("Invalid progress bar template")?
      .progress_chars("=> "),
  );
  Ok(progress)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_plan_post_mirrors_tree() {
    let job = plan_post(
      Path::new("posts"),
      Path::new("build"),
      Path::new("posts/2024/hello.world.md"),
      true,
    );
    assert_eq!(job.slug, "2024/hello.world");
    assert_eq!(job.html, PathBuf::from("build/2024/hello.world.html"));
    assert_eq!(job.toc, Some(PathBuf::from("build/2024/hello.world.toc.json")));
  }

  #[test]
  fn test_plan_post_without_toc() {
    let job = plan_post(
      Path::new("posts"),
      Path::new("out"),
      Path::new("posts/intro.md"),
      false,
    );
    assert_eq!(job.slug, "intro");
    assert_eq!(job.html, PathBuf::from("out/intro.html"));
    assert_eq!(job.toc, None);
  }

  #[test]
  fn test_effective_jobs() {
    let config = Config {
      jobs: Some(3),
      ..Config::default()
    };
    assert_eq!(effective_jobs(&config), 3);
    assert!(effective_jobs(&Config::default()) >= 1);
  }
}
