use std::{
  fs,
  io::{self, Write},
  path::Path,
};

use color_eyre::eyre::{Context, Result, bail};
use inkpost::{
  build,
  cli::{Cli, Commands},
};
use inkpost_config::{Config, ConfigFormat};
use log::{LevelFilter, info, warn};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => init_config(output, Cli::init_format(format), *force),

    Commands::Render { file, json } => {
      let config = Config::load(&cli.config_files, &cli.config_overrides)?;
      let runtime = async_runtime()?;
      runtime.block_on(render_file(&config, file, *json))
    },

    Commands::Build { .. } => {
      let mut config = Config::load(&cli.config_files, &cli.config_overrides)?;
      cli.merge_build_flags(&mut config);
      config.validate()?;

      let runtime = async_runtime()?;
      runtime.block_on(build_site(&config))
    },
  }
}

fn async_runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
    .wrap_err("Failed to start async runtime")
}

fn init_config(
  output: &Path,
  format: ConfigFormat,
  force: bool,
) -> Result<()> {
  // Check if file already exists and that we're not forcing overwrite
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent() {
    if !parent.as_os_str().is_empty() && !parent.exists() {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
      info!("Created directory: {}", parent.display());
    }
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!(
      "Failed to generate configuration file: {}",
      output.display()
    )
  })?;

  info!(
    "Configuration file created successfully. Edit it to point input_dir at \
     your posts."
  );
  Ok(())
}

async fn render_file(config: &Config, file: &Path, json: bool) -> Result<()> {
  let markdown = tokio::fs::read_to_string(file)
    .await
    .wrap_err_with(|| format!("Failed to read {}", file.display()))?;

  let processor = build::create_processor(config);
  let result = processor
    .render(&markdown)
    .await
    .wrap_err_with(|| format!("Failed to render {}", file.display()))?;

  let output = if json {
    serde_json::to_string_pretty(&result)
      .wrap_err("Failed to serialize render result")?
  } else {
    result.html
  };

  let mut stdout = io::stdout().lock();
  writeln!(stdout, "{output}").wrap_err("Failed to write to stdout")?;
  Ok(())
}

async fn build_site(config: &Config) -> Result<()> {
  let processor = build::create_processor(config);
  let progress = build::progress_bar()?;

  let summary = build::build_posts(config, &processor, &progress).await?;
  progress.finish_and_clear();

  if !config.highlight_code {
    info!("Syntax highlighting was disabled");
  } else if processor.highlighter().is_initialized()
    && processor.highlighter().get().await.is_none()
  {
    warn!("Code blocks were left unhighlighted: the engine failed to load");
  }

  info!(
    "Rendered {} posts into {}",
    summary.rendered,
    config.output_dir.display()
  );

  if summary.failed > 0 {
    bail!(
      "{} of {} posts failed to build",
      summary.failed,
      summary.rendered + summary.failed
    );
  }
  Ok(())
}
