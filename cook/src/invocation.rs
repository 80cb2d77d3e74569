//! Per-run invocation record.
//!
//! An [`Invocation`] is built once from command-line flags and never
//! mutated afterwards. Optional fields are either present and non-empty or
//! absent: empty strings are dropped when the record is built, so a step
//! that needs a value only has to check for `None`.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Requested actions. Config selection is implied by a config name and
/// has no flag of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions {
    /// Print supported targets or configurations.
    pub list: bool,
    /// Copy the built image to a remote board.
    pub transfer: bool,
    /// Print setup instructions.
    pub manual: bool,
    /// Clean build output.
    pub clean: bool,
    /// Delete the build directory.
    pub remove: bool,
    /// Clean output and generated configuration.
    pub distclean: bool,
    /// Generate tags.
    pub tags: bool,
    /// Run the interactive configuration tool.
    pub menuconfig: bool,
    /// Configure and compile.
    pub build: bool,
    /// Boot the built image in an emulator.
    pub emulator: bool,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFormat {
    /// One entry per line.
    #[default]
    Plain,
    /// A JSON array of strings.
    Json,
}

/// Fully specified remote copy destination.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RemoteTarget {
    /// Board address.
    pub ip: String,
    /// Login user.
    pub user: String,
    /// Destination path on the board.
    pub path: String,
}

impl RemoteTarget {
    /// `user@ip:path` destination as understood by scp.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}:{}", self.user, self.ip, self.path)
    }
}

/// Invocation record for one run.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    actions: Actions,
    project: Option<String>,
    toolchain: Option<PathBuf>,
    config_name: Option<String>,
    remote_ip: Option<String>,
    remote_user: Option<String>,
    remote_path: Option<String>,
    jobs: Option<u32>,
    list_format: ListFormat,
}

fn non_empty<S: Into<String>>(value: Option<S>) -> Option<String> {
    value.map(Into::into).filter(|s| !s.trim().is_empty())
}

impl Invocation {
    /// Create an invocation with the given actions and no parameters.
    pub fn new(actions: Actions) -> Self {
        Self {
            actions,
            ..Self::default()
        }
    }

    /// Set the build target.
    #[must_use]
    pub fn with_project<S: Into<String>>(mut self, project: Option<S>) -> Self {
        self.project = non_empty(project);
        self
    }

    /// Set the toolchain directory or toolchain file.
    #[must_use]
    pub fn with_toolchain<P: Into<PathBuf>>(mut self, toolchain: Option<P>) -> Self {
        self.toolchain = toolchain
            .map(Into::into)
            .filter(|p| !p.as_os_str().is_empty());
        self
    }

    /// Set the configuration name.
    #[must_use]
    pub fn with_config_name<S: Into<String>>(mut self, name: Option<S>) -> Self {
        self.config_name = non_empty(name);
        self
    }

    /// Set the remote copy destination parts.
    #[must_use]
    pub fn with_remote<S: Into<String>>(
        mut self,
        ip: Option<S>,
        user: Option<S>,
        path: Option<S>,
    ) -> Self {
        self.remote_ip = non_empty(ip);
        self.remote_user = non_empty(user);
        self.remote_path = non_empty(path);
        self
    }

    /// Set build parallelism. Zero is treated as unset.
    #[must_use]
    pub fn with_jobs(mut self, jobs: Option<u32>) -> Self {
        self.jobs = jobs.filter(|j| *j > 0);
        self
    }

    /// Set the listing format.
    #[must_use]
    pub fn with_list_format(mut self, format: ListFormat) -> Self {
        self.list_format = format;
        self
    }

    /// Requested actions.
    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    /// Build target, if given.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Toolchain directory or file, if given.
    pub fn toolchain(&self) -> Option<&Path> {
        self.toolchain.as_deref()
    }

    /// Configuration name, if given.
    pub fn config_name(&self) -> Option<&str> {
        self.config_name.as_deref()
    }

    /// Build parallelism, if given.
    pub fn jobs(&self) -> Option<u32> {
        self.jobs
    }

    /// Listing format.
    pub fn list_format(&self) -> ListFormat {
        self.list_format
    }

    /// Remote destination. Every part is required.
    pub fn remote(&self) -> Result<RemoteTarget> {
        let ip = self
            .remote_ip
            .clone()
            .ok_or_else(|| Error::MissingParameter("-i, --ip".to_string()))?;
        let user = self
            .remote_user
            .clone()
            .ok_or_else(|| Error::MissingParameter("-n, --user".to_string()))?;
        let path = self
            .remote_path
            .clone()
            .ok_or_else(|| Error::MissingParameter("-o, --rpath".to_string()))?;
        Ok(RemoteTarget { ip, user, path })
    }
}
