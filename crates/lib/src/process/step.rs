//! Concrete, fully resolved pipeline steps.

use std::fmt;
use std::path::PathBuf;

use crate::consts::REDACTED;

/// A program invocation as an argument vector. No shell is involved.
///
/// Secret values registered with [`Invocation::with_secret`] are masked
/// wherever the invocation is rendered, including `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
  program: String,
  args: Vec<String>,
  env: Vec<(String, String)>,
  secrets: Vec<String>,
}

impl Invocation {
  pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      program: program.into(),
      args,
      env: Vec::new(),
      secrets: Vec::new(),
    }
  }

  pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.push((key.into(), value.into()));
    self
  }

  /// Mask `secret` when rendering. Empty secrets are ignored.
  pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
    let secret = secret.into();
    if !secret.is_empty() {
      self.secrets.push(secret);
    }
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn args(&self) -> &[String] {
    &self.args
  }

  pub fn env(&self) -> &[(String, String)] {
    &self.env
  }

  /// Replace every registered secret in `text` with the mask.
  pub fn redact(&self, text: &str) -> String {
    self
      .secrets
      .iter()
      .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), REDACTED))
  }

  /// The command line for display, with secrets masked.
  pub fn display_line(&self) -> String {
    let mut line = self.program.clone();
    for arg in &self.args {
      line.push(' ');
      line.push_str(&self.redact(arg));
    }
    line
  }
}

impl fmt::Debug for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let args: Vec<String> = self.args.iter().map(|a| self.redact(a)).collect();
    f.debug_struct("Invocation")
      .field("program", &self.program)
      .field("args", &args)
      .field("env", &self.env)
      .finish()
  }
}

/// One resolved step of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  /// Remove a directory tree. A missing directory is not an error.
  RemoveDir { path: PathBuf },

  /// Create a directory and any missing parents.
  CreateDir { path: PathBuf },

  /// Recursively copy the contents of `from` into `to`, creating `to`.
  /// Top-level entries of `from` named in `exclude` are skipped.
  CopyDir {
    from: PathBuf,
    to: PathBuf,
    exclude: Vec<String>,
  },

  /// Write `contents` to a file, replacing it.
  WriteFile { path: PathBuf, contents: String },

  /// Run a program.
  Exec(Invocation),
}

impl Step {
  /// Short name of the step kind, for structured logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Step::RemoveDir { .. } => "remove",
      Step::CreateDir { .. } => "mkdir",
      Step::CopyDir { .. } => "copy",
      Step::WriteFile { .. } => "write",
      Step::Exec(_) => "exec",
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Step::RemoveDir { path } => write!(f, "remove {}", path.display()),
      Step::CreateDir { path } => write!(f, "mkdir {}", path.display()),
      Step::CopyDir { from, to, exclude } => {
        write!(f, "copy {} -> {}", from.display(), to.display())?;
        if !exclude.is_empty() {
          write!(f, " (excluding {})", exclude.join(", "))?;
        }
        Ok(())
      }
      Step::WriteFile { path, .. } => write!(f, "write {}", path.display()),
      Step::Exec(invocation) => f.write_str(&invocation.display_line()),
    }
  }
}
