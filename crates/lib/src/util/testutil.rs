//! Test utilities for sitebuild-lib.
//!
//! Cross-platform invocations for runner tests, plus recording stubs for the
//! runner, remote sync, and credential store seams.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::credentials::{Credential, CredentialError, CredentialStore};
use crate::process::{Invocation, ProcessRunner, Step, StepError, StepOutput};
use crate::publish::{RemoteSync, SyncDescriptor, SyncError};
use crate::request::{BuildRequest, Site, User};

/// An invocation that prints a message on stdout.
#[cfg(unix)]
pub fn echo_msg(msg: &str) -> Invocation {
  Invocation::new("/bin/echo", vec![msg.to_string()])
}

#[cfg(windows)]
pub fn echo_msg(msg: &str) -> Invocation {
  Invocation::new("cmd.exe", vec!["/C".to_string(), format!("echo {}", msg)])
}

/// An invocation that prints a message on stderr and exits successfully.
#[cfg(unix)]
pub fn stderr_only(msg: &str) -> Invocation {
  Invocation::new("/bin/sh", vec!["-c".to_string(), format!("echo {} >&2", msg)])
}

#[cfg(windows)]
pub fn stderr_only(msg: &str) -> Invocation {
  Invocation::new("cmd.exe", vec!["/C".to_string(), format!("echo {} 1>&2", msg)])
}

/// An invocation that exits with the given code.
#[cfg(unix)]
pub fn exit_with(code: i32) -> Invocation {
  Invocation::new("/bin/sh", vec!["-c".to_string(), format!("exit {}", code)])
}

#[cfg(windows)]
pub fn exit_with(code: i32) -> Invocation {
  Invocation::new("cmd.exe", vec!["/C".to_string(), format!("exit {}", code)])
}

/// A build request for `acme/site1` with default branch `main`.
pub fn sample_request(branch: &str) -> BuildRequest {
  BuildRequest {
    id: "build-1".to_string(),
    site: Site {
      owner: "acme".to_string(),
      repository: "site1".to_string(),
      default_branch: "main".to_string(),
      domain: None,
      config: "title: Acme".to_string(),
    },
    branch: branch.to_string(),
    user: User { id: "u1".to_string() },
  }
}

/// A runner that records every step and optionally fails one of them.
#[derive(Default)]
pub struct RecordingRunner {
  fail_at: Option<usize>,
  steps: Mutex<Vec<Step>>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fail the step with this zero-based index (counted across all calls).
  pub fn failing_at(index: usize) -> Self {
    Self {
      fail_at: Some(index),
      steps: Mutex::new(Vec::new()),
    }
  }

  pub fn steps(&self) -> Vec<Step> {
    self.steps.lock().unwrap().clone()
  }

  pub fn count(&self) -> usize {
    self.steps.lock().unwrap().len()
  }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
  async fn run(&self, step: &Step) -> Result<StepOutput, StepError> {
    let mut steps = self.steps.lock().unwrap();
    let index = steps.len();
    steps.push(step.clone());

    if self.fail_at == Some(index) {
      return Err(StepError::Failed {
        command: step.to_string(),
        code: Some(1),
        stdout: String::new(),
        stderr: format!("injected failure at step {}", index),
      });
    }

    Ok(StepOutput::default())
  }
}

/// A remote sync that records descriptors and optionally fails.
#[derive(Default)]
pub struct RecordingSync {
  fail: bool,
  calls: Mutex<Vec<SyncDescriptor>>,
}

impl RecordingSync {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn failing() -> Self {
    Self {
      fail: true,
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn calls(&self) -> Vec<SyncDescriptor> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl RemoteSync for RecordingSync {
  async fn sync(&self, descriptor: &SyncDescriptor) -> Result<(), SyncError> {
    self.calls.lock().unwrap().push(descriptor.clone());
    if self.fail {
      return Err(SyncError::Step(StepError::Failed {
        command: "sync".to_string(),
        code: Some(1),
        stdout: String::new(),
        stderr: "remote refused upload".to_string(),
      }));
    }
    Ok(())
  }
}

/// A credential store whose lookups always fail.
pub struct FailingCredentials;

#[async_trait]
impl CredentialStore for FailingCredentials {
  async fn lookup(&self, _user_id: &str) -> Result<Option<Credential>, CredentialError> {
    Err(CredentialError::Unavailable("connection refused".to_string()))
  }
}
