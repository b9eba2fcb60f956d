//! Fetching the build prerequisites: the framework itself and the provider
//! collection.
//!
//! The framework is fetched with `go get` on every run; the provider tree is
//! cloned only when its directory is missing. Both run concurrently and all
//! failures are reported together.

mod command;
mod group;

pub use command::{CommandError, CommandRunner, CommandSpec, ProcessRunner};
pub use group::{GroupError, TaskFailure, TaskGroup};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{info, warn};

/// Import path of the framework.
pub const DEFAULT_FRAMEWORK_PACKAGE: &str = "github.com/mholt/caddy";

/// Clone URL of the provider collection.
pub const DEFAULT_PROVIDERS_REPOSITORY: &str = "https://github.com/caddyserver/dnsproviders";

/// Error of [`DependencyFetcher::fetch_all`].
pub type DependencyError = GroupError<CommandError>;

/// Inputs of the dependency fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySettings {
    /// Go workspace, exported as `GOPATH` to the framework fetch.
    pub gopath: PathBuf,
    /// Framework import path.
    pub framework_package: String,
    /// Provider repository URL.
    pub providers_repository: String,
    /// Clone destination of the provider repository.
    pub providers_dir: PathBuf,
    /// Go toolchain program.
    pub go_program: String,
    /// Git program.
    pub git_program: String,
}

impl DependencySettings {
    /// Conventional layout for a Go workspace.
    #[must_use]
    pub fn for_gopath(gopath: impl Into<PathBuf>) -> Self {
        let gopath = gopath.into();
        let providers_dir = gopath
            .join("src")
            .join(crate::providers::DEFAULT_PACKAGE_ROOT);
        Self {
            gopath,
            framework_package: DEFAULT_FRAMEWORK_PACKAGE.to_string(),
            providers_repository: DEFAULT_PROVIDERS_REPOSITORY.to_string(),
            providers_dir,
            go_program: "go".to_string(),
            git_program: "git".to_string(),
        }
    }
}

/// Lifecycle of one prerequisite during a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrerequisiteState {
    /// Not on disk.
    Absent,
    /// A fetch command is running.
    Fetching,
    /// On disk.
    Present,
    /// The fetch command failed.
    Failed,
}

impl fmt::Display for PrerequisiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Absent => "absent",
            Self::Fetching => "fetching",
            Self::Present => "present",
            Self::Failed => "failed",
        })
    }
}

/// Fetches the framework and the provider collection.
pub struct DependencyFetcher {
    settings: DependencySettings,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for DependencyFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyFetcher")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl DependencyFetcher {
    /// Fetcher that runs commands through `runner`.
    #[must_use]
    pub fn new(settings: DependencySettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self { settings, runner }
    }

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> &DependencySettings {
        &self.settings
    }

    /// `go get -v <framework>` with `GOPATH` set.
    #[must_use]
    pub fn framework_command(&self) -> CommandSpec {
        CommandSpec::new(&self.settings.go_program)
            .arg("get")
            .arg("-v")
            .arg(&self.settings.framework_package)
            .env("GOPATH", self.settings.gopath.to_string_lossy())
    }

    /// `git clone <repository> <destination>` without interactive prompts.
    #[must_use]
    pub fn clone_command(&self) -> CommandSpec {
        CommandSpec::new(&self.settings.git_program)
            .arg("clone")
            .arg(&self.settings.providers_repository)
            .arg(self.settings.providers_dir.to_string_lossy())
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_SSH_COMMAND", "ssh -o BatchMode=yes")
    }

    /// Whether the provider tree is already on disk.
    #[must_use]
    pub fn providers_state(&self) -> PrerequisiteState {
        if self.settings.providers_dir.is_dir() {
            PrerequisiteState::Present
        } else {
            PrerequisiteState::Absent
        }
    }

    /// Fetch or update the framework.
    ///
    /// # Errors
    ///
    /// Returns the [`CommandError`] of the `go get` run.
    pub async fn fetch_framework(&self) -> Result<(), CommandError> {
        let package = self.settings.framework_package.as_str();
        info!(prerequisite = "framework", package, state = %PrerequisiteState::Fetching, "Fetching");
        let result = self.runner.run(&self.framework_command()).await;
        report("framework", &result);
        result
    }

    /// Clone the provider collection unless it is present.
    ///
    /// # Errors
    ///
    /// Returns the [`CommandError`] of the `git clone` run.
    pub async fn fetch_providers(&self) -> Result<(), CommandError> {
        let dest = self.settings.providers_dir.display();
        let state = self.providers_state();
        if state == PrerequisiteState::Present {
            info!(prerequisite = "providers", dest = %dest, %state, "Already present, skipping clone");
            return Ok(());
        }
        info!(
            prerequisite = "providers",
            repository = %self.settings.providers_repository,
            dest = %dest,
            state = %PrerequisiteState::Fetching,
            "Cloning"
        );
        let result = self.runner.run(&self.clone_command()).await;
        report("providers", &result);
        result
    }

    /// Fetch both prerequisites concurrently.
    ///
    /// # Errors
    ///
    /// Returns a [`DependencyError`] listing every failed fetch.
    pub async fn fetch_all(&self) -> Result<(), DependencyError> {
        let mut group = TaskGroup::new();
        group.add("framework", self.fetch_framework().boxed());
        group.add("providers", self.fetch_providers().boxed());
        group.exec().await
    }
}

fn report(prerequisite: &str, result: &Result<(), CommandError>) {
    match result {
        Ok(()) => info!(prerequisite, state = %PrerequisiteState::Present, "Fetched"),
        Err(e) => warn!(prerequisite, state = %PrerequisiteState::Failed, error = %e, "Fetch failed"),
    }
}
