//! Remote sync through an external program.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::config::RemoteTarget;
use crate::process::{Invocation, ProcessRunner, Step, SystemRunner};
use crate::publish::{RemoteSync, SyncDescriptor, SyncError};
use crate::template::expand_all;

/// Syncs by running the configured program.
///
/// Each argument template may reference `${prefix}` and `${directory}`. For
/// example `["-a", "${directory}/", "deploy@host:/www/${prefix}"]` with `rsync`.
#[derive(Debug, Clone)]
pub struct CommandSync {
  target: RemoteTarget,
  runner: SystemRunner,
}

impl CommandSync {
  pub fn new(target: RemoteTarget, working_dir: impl Into<PathBuf>) -> Self {
    Self {
      target,
      runner: SystemRunner::new(working_dir),
    }
  }

  /// The concrete invocation for `descriptor`.
  pub fn invocation(&self, descriptor: &SyncDescriptor) -> Result<Invocation, SyncError> {
    let values = HashMap::from([
      ("prefix".to_string(), descriptor.prefix.clone()),
      ("directory".to_string(), descriptor.directory.to_string_lossy().into_owned()),
    ]);

    let args = expand_all(&self.target.args, &values)?;
    Ok(Invocation::new(self.target.program.clone(), args))
  }
}

#[async_trait]
impl RemoteSync for CommandSync {
  async fn sync(&self, descriptor: &SyncDescriptor) -> Result<(), SyncError> {
    let invocation = self.invocation(descriptor)?;
    info!(target = %self.target.name, directory = %descriptor.directory.display(), "syncing");

    self.runner.run(&Step::Exec(invocation)).await?;
    Ok(())
  }
}
