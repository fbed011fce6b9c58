mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sitebuild_lib::Engine;
use sitebuild_lib::consts::APP_NAME;

use crate::output::OutputFormat;

/// sitebuild - build GitHub-hosted sites and publish them
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to a JSON build configuration (defaults apply when omitted)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a site and publish it
  Build {
    /// Build engine: static, jekyll or hugo
    engine: Engine,

    /// Path to a JSON build request
    #[arg(short, long)]
    request: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show the steps a build would run, without running them
  Plan {
    /// Build engine: static, jekyll or hugo
    engine: Engine,

    /// Path to a JSON build request
    #[arg(short, long)]
    request: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// List the available build engines
  Engines {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config = cli.config.as_deref();

  match cli.command {
    Commands::Build {
      engine,
      request,
      output,
    } => cmd::cmd_build(engine, &request, config, output),
    Commands::Plan {
      engine,
      request,
      output,
    } => cmd::cmd_plan(engine, &request, config, output),
    Commands::Engines { output } => cmd::cmd_engines(output),
  }
}
