//! sitebuild-lib: build orchestration core for sitebuild
//!
//! This crate turns a site build request into an ordered list of concrete steps
//! and runs them:
//! - `tokens`: derives the substitution values for one build request
//! - `template`: expands `${token}` templates into concrete steps
//! - `process`: executes one step at a time (subprocess or filesystem)
//! - `pipeline`: the per-engine step lists and the sequential driver
//! - `publish`: hands the built artifact to a local tree or a remote sync target

pub mod config;
pub mod consts;
pub mod credentials;
pub mod pipeline;
pub mod process;
pub mod publish;
pub mod request;
pub mod template;
pub mod tokens;
pub mod util;

pub use config::{BuildConfig, ConfigError, RemoteTarget};
pub use credentials::{Credential, CredentialError, CredentialStore, FileCredentials, NoCredentials, StaticCredentials};
pub use pipeline::{BuildError, Builder, Engine, PipelineResult};
pub use process::{ProcessRunner, Step, StepError, StepOutput, SystemRunner};
pub use publish::{CommandSync, PublishError, PublishPolicy, Publisher, RemoteSync, SyncDescriptor, SyncError};
pub use request::{BuildRequest, Site, User};
pub use tokens::TokenSet;
