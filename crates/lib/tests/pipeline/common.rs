//! Shared helpers for pipeline integration tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use sitebuild_lib::process::Invocation;
use sitebuild_lib::{
  BuildConfig, BuildRequest, Builder, ProcessRunner, Site, StaticCredentials, Step, StepError, StepOutput,
  SystemRunner, User,
};

pub const TOKEN: &str = "ghp_integration_token";

/// Runs filesystem steps for real and fakes the external tools.
///
/// `git clone` populates the target with a small site and a `.git` directory.
/// `jekyll` and `hugo` write their usual output directories. Everything else
/// goes to a [`SystemRunner`] rooted at the same directory.
pub struct FixtureRunner {
  root: PathBuf,
  system: SystemRunner,
  fail_program: Option<&'static str>,
  programs: Mutex<Vec<String>>,
}

impl FixtureRunner {
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
      system: SystemRunner::new(root),
      fail_program: None,
      programs: Mutex::new(Vec::new()),
    }
  }

  /// Make every invocation of `program` exit with status 1.
  pub fn failing(mut self, program: &'static str) -> Self {
    self.fail_program = Some(program);
    self
  }

  pub fn programs(&self) -> Vec<String> {
    self.programs.lock().unwrap().clone()
  }

  fn fake(&self, invocation: &Invocation) {
    let args = invocation.args();
    match invocation.program() {
      "git" => {
        let target = self.root.join(args.last().expect("clone target"));
        write(&target.join("index.html"), "<h1>acme</h1>");
        write(&target.join("css/site.css"), "body {}");
        write(&target.join(".git/HEAD"), "ref: refs/heads/main");
      }
      "jekyll" => {
        let source = self.root.join(arg_after(args, "--source"));
        assert!(
          source.join("_config_base.yml").is_file(),
          "jekyll ran before the base config was written"
        );
        let destination = self.root.join(arg_after(args, "--destination"));
        write(&destination.join("index.html"), "<h1>jekyll</h1>");
      }
      "hugo" => {
        let source = args
          .iter()
          .find_map(|a| a.strip_prefix("--source="))
          .expect("hugo source argument");
        write(&self.root.join(source).join("public/index.html"), "<h1>hugo</h1>");
      }
      other => panic!("unexpected program {}", other),
    }
  }
}

#[async_trait]
impl ProcessRunner for FixtureRunner {
  async fn run(&self, step: &Step) -> Result<StepOutput, StepError> {
    let Step::Exec(invocation) = step else {
      return self.system.run(step).await;
    };

    self.programs.lock().unwrap().push(invocation.program().to_string());

    if self.fail_program == Some(invocation.program()) {
      return Err(StepError::Failed {
        command: invocation.display_line(),
        code: Some(1),
        stdout: String::new(),
        stderr: format!("{} failed", invocation.program()),
      });
    }

    self.fake(invocation);
    Ok(StepOutput::default())
  }
}

fn arg_after<'a>(args: &'a [String], flag: &str) -> &'a str {
  let index = args.iter().position(|a| a == flag).expect("flag present");
  &args[index + 1]
}

fn write(path: &Path, contents: &str) {
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, contents).unwrap();
}

/// An isolated working directory with its own temp and publish roots.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn config(&self) -> BuildConfig {
    BuildConfig {
      working_dir: self.root().to_path_buf(),
      ..BuildConfig::default()
    }
  }

  pub fn builder(&self, runner: Arc<FixtureRunner>) -> Builder {
    Builder::new(
      self.config(),
      Arc::new(StaticCredentials::new().with_token("u1", TOKEN)),
      runner,
    )
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root().join(relative)
  }
}

pub fn request(branch: &str) -> BuildRequest {
  BuildRequest {
    id: format!("it-{}", branch),
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
