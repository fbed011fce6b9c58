//! Build engines and their fixed step lists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::process::Step;
use crate::template::{Arg, StepTemplate, TemplateError, expand_steps};
use crate::tokens::TokenSet;

/// Returned when parsing an unknown engine name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown build engine '{0}' (expected static, jekyll or hugo)")]
pub struct UnknownEngine(pub String);

/// A strategy for turning a cloned repository into a publishable site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
  /// Publish the repository contents as they are.
  Static,
  /// Build with a Jekyll-compatible generator.
  Jekyll,
  /// Build with a Hugo-compatible generator.
  Hugo,
}

const CLEAN_SOURCE: StepTemplate = StepTemplate::RemoveDir("${sourcePath}");
const CREATE_SOURCE: StepTemplate = StepTemplate::CreateDir("${sourcePath}");
const CLEAN_DESTINATION: StepTemplate = StepTemplate::RemoveDir("${destinationPath}");
const CREATE_DESTINATION: StepTemplate = StepTemplate::CreateDir("${destinationPath}");

/// Shallow single-branch clone. The only step that sees the access token.
const CLONE: StepTemplate = StepTemplate::Exec {
  program: "git",
  args: &[
    Arg::Text("clone"),
    Arg::Text("-b"),
    Arg::Text("${branch}"),
    Arg::Text("--single-branch"),
    Arg::Text("--depth"),
    Arg::Text("1"),
    Arg::Text("https://${accessToken}@github.com/${owner}/${repository}.git"),
    Arg::Text("${sourcePath}"),
  ],
  env: &[("GIT_TERMINAL_PROMPT", "0")],
};

const STATIC_STEPS: &[StepTemplate] = &[
  CLEAN_SOURCE,
  CREATE_SOURCE,
  CLONE,
  CLEAN_DESTINATION,
  StepTemplate::CopyDir {
    from: "${sourcePath}",
    to: "${destinationPath}",
    exclude: &[".git"],
  },
  CLEAN_SOURCE,
];

const JEKYLL_STEPS: &[StepTemplate] = &[
  CLEAN_SOURCE,
  CREATE_SOURCE,
  CLONE,
  StepTemplate::WriteFile {
    path: "${sourcePath}/_config_base.yml",
    contents: "baseurl: ${baseUrl}\nbranch: ${branch}\n${generatorConfig}\n",
  },
  StepTemplate::Exec {
    program: "jekyll",
    args: &[
      Arg::Text("build"),
      Arg::Text("--safe"),
      Arg::Text("--config"),
      Arg::Path("${sourcePath}/_config.yml,${sourcePath}/_config_base.yml"),
      Arg::Text("--source"),
      Arg::Text("${sourcePath}"),
      Arg::Text("--destination"),
      Arg::Path("${sourcePath}/_site"),
    ],
    env: &[],
  },
  CLEAN_DESTINATION,
  CREATE_DESTINATION,
  StepTemplate::CopyDir {
    from: "${sourcePath}/_site",
    to: "${destinationPath}",
    exclude: &[],
  },
  CLEAN_SOURCE,
];

const HUGO_STEPS: &[StepTemplate] = &[
  CLEAN_SOURCE,
  CREATE_SOURCE,
  CLONE,
  StepTemplate::Exec {
    program: "hugo",
    args: &[Arg::Text("--baseUrl=${baseUrlValue}"), Arg::Text("--source=${sourcePath}")],
    env: &[],
  },
  CLEAN_DESTINATION,
  CREATE_DESTINATION,
  StepTemplate::CopyDir {
    from: "${sourcePath}/public",
    to: "${destinationPath}",
    exclude: &[],
  },
  CLEAN_SOURCE,
];

impl Engine {
  pub const ALL: [Engine; 3] = [Engine::Static, Engine::Jekyll, Engine::Hugo];

  pub fn as_str(self) -> &'static str {
    match self {
      Engine::Static => "static",
      Engine::Jekyll => "jekyll",
      Engine::Hugo => "hugo",
    }
  }

  /// The engine's step templates, in execution order.
  pub fn steps(self) -> &'static [StepTemplate] {
    match self {
      Engine::Static => STATIC_STEPS,
      Engine::Jekyll => JEKYLL_STEPS,
      Engine::Hugo => HUGO_STEPS,
    }
  }

  /// Resolve the engine's steps against `tokens`.
  pub fn expand(self, tokens: &TokenSet) -> Result<Vec<Step>, TemplateError> {
    expand_steps(self.steps(), tokens)
  }
}

impl fmt::Display for Engine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Engine {
  type Err = UnknownEngine;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Engine::ALL
      .into_iter()
      .find(|engine| engine.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| UnknownEngine(s.to_string()))
  }
}
