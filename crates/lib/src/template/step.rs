//! Step templates.
//!
//! A [`StepTemplate`] is the compile-time shape of one pipeline step with
//! `${token}` placeholders in its paths, contents and arguments. Expanding it
//! against a [`TokenSet`] yields a concrete [`Step`]. Program invocations stay
//! argument vectors throughout, so token values are never interpreted by a shell.

use std::path::PathBuf;

use crate::process::{Invocation, Step};
use crate::template::{TemplateError, substitute};
use crate::tokens::TokenSet;
use crate::util::paths::to_native_separators;

/// One argument of an [`StepTemplate::Exec`] template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
  /// Substituted verbatim.
  Text(&'static str),
  /// Substituted, then rewritten to host path separators.
  Path(&'static str),
}

impl Arg {
  fn expand(self, tokens: &TokenSet) -> Result<String, TemplateError> {
    match self {
      Arg::Text(template) => substitute(template, tokens),
      Arg::Path(template) => substitute(template, tokens).map(|s| to_native_separators(&s)),
    }
  }
}

/// A step with unresolved `${token}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTemplate {
  RemoveDir(&'static str),
  CreateDir(&'static str),
  CopyDir {
    from: &'static str,
    to: &'static str,
    exclude: &'static [&'static str],
  },
  WriteFile {
    path: &'static str,
    contents: &'static str,
  },
  Exec {
    program: &'static str,
    args: &'static [Arg],
    env: &'static [(&'static str, &'static str)],
  },
}

impl StepTemplate {
  /// Resolve every placeholder against `tokens`.
  ///
  /// The access token is registered as a secret on program invocations so it
  /// is masked whenever the step is rendered.
  pub fn expand(&self, tokens: &TokenSet) -> Result<Step, TemplateError> {
    let step = match *self {
      StepTemplate::RemoveDir(path) => Step::RemoveDir {
        path: expand_path(path, tokens)?,
      },
      StepTemplate::CreateDir(path) => Step::CreateDir {
        path: expand_path(path, tokens)?,
      },
      StepTemplate::CopyDir { from, to, exclude } => Step::CopyDir {
        from: expand_path(from, tokens)?,
        to: expand_path(to, tokens)?,
        exclude: exclude.iter().map(|name| name.to_string()).collect(),
      },
      StepTemplate::WriteFile { path, contents } => Step::WriteFile {
        path: expand_path(path, tokens)?,
        contents: substitute(contents, tokens)?,
      },
      StepTemplate::Exec { program, args, env } => {
        let args = args
          .iter()
          .map(|arg| arg.expand(tokens))
          .collect::<Result<Vec<_>, _>>()?;

        let mut invocation = Invocation::new(program, args).with_secret(tokens.access_token.as_str());
        for (key, value) in env {
          invocation = invocation.with_env(*key, substitute(value, tokens)?);
        }
        Step::Exec(invocation)
      }
    };
    Ok(step)
  }
}

/// Expand a list of templates in order.
pub fn expand_steps(templates: &[StepTemplate], tokens: &TokenSet) -> Result<Vec<Step>, TemplateError> {
  templates.iter().map(|template| template.expand(tokens)).collect()
}

fn expand_path(template: &str, tokens: &TokenSet) -> Result<PathBuf, TemplateError> {
  substitute(template, tokens).map(|s| PathBuf::from(to_native_separators(&s)))
}
