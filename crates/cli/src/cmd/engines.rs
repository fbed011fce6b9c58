use anyhow::Result;
use serde::Serialize;

use sitebuild_lib::Engine;

use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Debug, Serialize)]
struct EngineInfo {
  name: Engine,
  steps: usize,
}

pub fn cmd_engines(output: OutputFormat) -> Result<()> {
  let engines: Vec<EngineInfo> = Engine::ALL
    .into_iter()
    .map(|engine| EngineInfo {
      name: engine,
      steps: engine.steps().len(),
    })
    .collect();

  if output.is_json() {
    print_json(&engines)?;
  } else {
    println!("Engines:");
    for engine in &engines {
      print_stat(engine.name.as_str(), &format!("{} steps", engine.steps));
    }
  }

  Ok(())
}
