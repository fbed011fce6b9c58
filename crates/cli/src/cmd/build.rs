//! Implementation of the `sitebuild build` command.
//!
//! Runs one build request through the selected engine and publishes the
//! result. Exits with status 1 when the pipeline fails.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use sitebuild_lib::process::{SequenceError, StepError};
use sitebuild_lib::{BuildError, Builder, Engine, PipelineResult, PublishPolicy};

use super::{credential_store, load_config, load_request};
use crate::output::{OutputFormat, format_duration, print_error, print_json, print_stat, print_success};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildReport {
  id: String,
  engine: Engine,
  owner: String,
  repository: String,
  branch: String,
  publish: String,
  success: bool,
  error: Option<String>,
  duration_ms: u64,
}

impl BuildReport {
  fn new(engine: Engine, policy: PublishPolicy, result: &PipelineResult, elapsed: Duration) -> Self {
    let request = result.request();
    Self {
      id: request.id.clone(),
      engine,
      owner: request.site.owner.clone(),
      repository: request.site.repository.clone(),
      branch: request.branch.clone(),
      publish: policy.to_string(),
      success: result.is_success(),
      error: result.error().map(|e| e.to_string()),
      duration_ms: elapsed.as_millis() as u64,
    }
  }
}

pub fn cmd_build(engine: Engine, request_path: &Path, config_path: Option<&Path>, output: OutputFormat) -> Result<()> {
  let start = Instant::now();

  let config = load_config(config_path)?;
  let request = load_request(request_path)?;
  let credentials = credential_store(&config);
  let builder = Builder::with_system_runner(config, credentials);

  info!(engine = %engine, working_dir = %builder.config().working_dir.display(), "starting");

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt.block_on(builder.build(engine, request));

  let report = BuildReport::new(engine, builder.publisher().policy(), &result, start.elapsed());

  if output.is_json() {
    print_json(&report)?;
  } else {
    print_text(&report, &result);
  }

  if !result.is_success() {
    std::process::exit(1);
  }

  Ok(())
}

fn print_text(report: &BuildReport, result: &PipelineResult) {
  println!();
  match result.error() {
    None => print_success("Build published"),
    Some(error) => {
      print_error(&format!("Build failed: {}", error));
      if let Some(stderr) = failed_stderr(error) {
        for line in stderr.lines() {
          eprintln!("    {}", line);
        }
      }
    }
  }

  print_stat("Site", &format!("{}/{}", report.owner, report.repository));
  print_stat("Branch", &report.branch);
  print_stat("Engine", report.engine.as_str());
  print_stat("Publish", &report.publish);
  print_stat("Duration", &format_duration(Duration::from_millis(report.duration_ms)));
}

/// Captured stderr of a failed program, if that is what stopped the build.
fn failed_stderr(error: &BuildError) -> Option<&str> {
  match error {
    BuildError::Step(SequenceError {
      source: StepError::Failed { stderr, .. },
      ..
    }) if !stderr.trim().is_empty() => Some(stderr.trim_end()),
    _ => None,
  }
}
