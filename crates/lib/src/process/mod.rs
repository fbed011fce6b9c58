//! Step execution.
//!
//! A [`ProcessRunner`] executes one resolved [`Step`] at a time. The
//! [`SystemRunner`] spawns programs directly, without a shell, and performs
//! filesystem steps natively. [`run_sequence`] drives an ordered list of steps
//! and stops at the first failure.

pub mod step;

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};
use walkdir::WalkDir;

pub use step::{Invocation, Step};

/// Captured output of a step. Filesystem steps produce empty streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
  pub stdout: String,
  pub stderr: String,
}

/// Errors from executing a single step.
#[derive(Debug, Error)]
pub enum StepError {
  /// The program could not be started.
  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The program exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {command}")]
  Failed {
    command: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// A filesystem step failed.
  #[error("{step}: {source}")]
  Io {
    step: String,
    #[source]
    source: io::Error,
  },
}

/// A step in a sequence failed. Steps after it did not run.
#[derive(Debug, Error)]
#[error("step {} ({step}) failed: {source}", .index + 1)]
pub struct SequenceError {
  /// Zero-based index of the failed step.
  pub index: usize,
  /// Redacted rendering of the failed step.
  pub step: String,
  #[source]
  pub source: StepError,
}

/// Executes a single step.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
  /// Run one step to completion. Output on stderr alone is not a failure.
  async fn run(&self, step: &Step) -> Result<StepOutput, StepError>;
}

/// Run steps strictly in order, stopping at the first failure.
pub async fn run_sequence(runner: &dyn ProcessRunner, steps: &[Step]) -> Result<(), SequenceError> {
  for (index, step) in steps.iter().enumerate() {
    debug!(step = index + 1, total = steps.len(), kind = step.kind(), "running {}", step);

    runner.run(step).await.map_err(|source| SequenceError {
      index,
      step: step.to_string(),
      source,
    })?;
  }
  Ok(())
}

/// Runs steps against the real system.
///
/// Relative paths and program working directories resolve against `working_dir`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
  working_dir: PathBuf,
}

impl SystemRunner {
  pub fn new(working_dir: impl Into<PathBuf>) -> Self {
    Self {
      working_dir: working_dir.into(),
    }
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    self.working_dir.join(path)
  }

  async fn exec(&self, invocation: &Invocation) -> Result<StepOutput, StepError> {
    let command_line = invocation.display_line();
    info!(cmd = %command_line, "executing command");

    let mut command = Command::new(invocation.program());
    command
      .args(invocation.args())
      .current_dir(&self.working_dir)
      .stdin(Stdio::null())
      .kill_on_drop(true);

    for (key, value) in invocation.env() {
      command.env(key, value);
    }

    debug!(working_dir = ?self.working_dir, "spawning process");

    let output = command.output().await.map_err(|source| StepError::Spawn {
      program: invocation.program().to_string(),
      source,
    })?;

    let stdout = invocation.redact(&String::from_utf8_lossy(&output.stdout));
    let stderr = invocation.redact(&String::from_utf8_lossy(&output.stderr));

    if !stdout.is_empty() {
      debug!(stdout = %stdout.trim_end(), "command stdout");
    }
    if !stderr.is_empty() {
      debug!(stderr = %stderr.trim_end(), "command stderr");
    }

    if !output.status.success() {
      return Err(StepError::Failed {
        command: command_line,
        code: output.status.code(),
        stdout,
        stderr,
      });
    }

    Ok(StepOutput { stdout, stderr })
  }

  async fn remove_dir(&self, path: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(self.resolve(path)).await {
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }

  async fn copy_dir(&self, from: &Path, to: &Path, exclude: &[String]) -> io::Result<()> {
    let from = self.resolve(from);
    let to = self.resolve(to);
    let exclude = exclude.to_vec();

    let copied = tokio::task::spawn_blocking(move || copy_tree(&from, &to, &exclude))
      .await
      .map_err(io::Error::other)??;

    debug!(files = copied, "copied files");
    Ok(())
  }

  async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
    let path = self.resolve(path);
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await
  }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
  async fn run(&self, step: &Step) -> Result<StepOutput, StepError> {
    let result = match step {
      Step::Exec(invocation) => return self.exec(invocation).await,
      Step::RemoveDir { path } => self.remove_dir(path).await,
      Step::CreateDir { path } => tokio::fs::create_dir_all(self.resolve(path)).await,
      Step::CopyDir { from, to, exclude } => self.copy_dir(from, to, exclude).await,
      Step::WriteFile { path, contents } => self.write_file(path, contents).await,
    };

    result.map(|()| StepOutput::default()).map_err(|source| StepError::Io {
      step: step.to_string(),
      source,
    })
  }
}

/// Copy the contents of `from` into `to`. Returns the number of files copied.
fn copy_tree(from: &Path, to: &Path, exclude: &[String]) -> io::Result<u64> {
  if !from.is_dir() {
    return Err(io::Error::new(
      io::ErrorKind::NotFound,
      format!("source directory not found: {}", from.display()),
    ));
  }

  std::fs::create_dir_all(to)?;

  let walker = WalkDir::new(from)
    .min_depth(1)
    .into_iter()
    .filter_entry(|entry| entry.depth() != 1 || !exclude.iter().any(|name| entry.file_name() == name.as_str()));

  let mut copied = 0;
  for entry in walker {
    let entry = entry?;
    let relative = entry.path().strip_prefix(from).map_err(io::Error::other)?;
    let target = to.join(relative);

    if entry.file_type().is_symlink() {
      if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
      }
      match std::fs::symlink_metadata(&target) {
        Ok(existing) if existing.is_dir() => std::fs::remove_dir_all(&target)?,
        Ok(_) => std::fs::remove_file(&target)?,
        Err(_) => {}
      }
      copy_symlink(entry.path(), &target)?;
      copied += 1;
    } else if entry.file_type().is_dir() {
      std::fs::create_dir_all(&target)?;
    } else {
      if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
      }
      std::fs::copy(entry.path(), &target)?;
      copied += 1;
    }
  }

  Ok(copied)
}

/// Recreate the link at `link` as a link to the same target. Dangling links are kept.
#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
  let destination = std::fs::read_link(link)?;
  std::os::unix::fs::symlink(destination, target)
}

#[cfg(windows)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
  let destination = std::fs::read_link(link)?;
  let resolved = link.parent().map(|parent| parent.join(&destination));
  if resolved.is_some_and(|path| path.is_dir()) {
    std::os::windows::fs::symlink_dir(destination, target)
  } else {
    std::os::windows::fs::symlink_file(destination, target)
  }
}
