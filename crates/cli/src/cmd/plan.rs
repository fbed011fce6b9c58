//! Implementation of the `sitebuild plan` command.
//!
//! Resolves a build request into the concrete steps an engine would run and
//! prints them with the access token masked. Nothing is executed.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use sitebuild_lib::template::join_commands;
use sitebuild_lib::{Builder, Engine};

use super::{credential_store, load_config, load_request};
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_step};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanReport {
  engine: Engine,
  branch: String,
  publish: String,
  steps: Vec<String>,
  command_line: String,
}

pub fn cmd_plan(engine: Engine, request_path: &Path, config_path: Option<&Path>, output: OutputFormat) -> Result<()> {
  let config = load_config(config_path)?;
  let request = load_request(request_path)?;
  let credentials = credential_store(&config);
  let builder = Builder::with_system_runner(config, credentials);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let steps = rt
    .block_on(builder.plan(engine, &request))
    .with_context(|| format!("Failed to plan {} build", engine))?;

  let rendered: Vec<String> = steps.iter().map(|step| step.to_string()).collect();
  let report = PlanReport {
    engine,
    branch: request.branch.clone(),
    publish: builder.publisher().policy().to_string(),
    command_line: join_commands(&rendered, " && "),
    steps: rendered,
  };

  if output.is_json() {
    print_json(&report)?;
  } else {
    print_info(&format!(
      "{} build of {}/{} ({})",
      engine, request.site.owner, request.site.repository, request.branch
    ));
    for (index, step) in report.steps.iter().enumerate() {
      print_step(index + 1, step);
    }
    println!();
    print_stat("Steps", &report.steps.len().to_string());
    print_stat("Publish", &report.publish);
  }

  Ok(())
}
