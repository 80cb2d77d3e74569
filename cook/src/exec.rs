//! External command execution.
//!
//! Every action cook performs ends in one blocking call to an external
//! tool. The router describes each call as an [`ExternalCommand`] and hands
//! it to a [`Runner`], which decides what "running" means:
//!
//! ```text
//! +------------------+
//! |      Router      |   builds ExternalCommand, checks ActionResult
//! +--------+---------+
//!          |
//!          v
//! +--------+---------+
//! |   Runner trait   |
//! +--------+---------+
//!          |
//!    +-----+------+
//!    v            v
//! SystemRunner  DryRunRunner
//! (spawn+wait)  (print only)
//! ```
//!
//! Environment variables needed by a tool are attached to its command and
//! only reach that one child process.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};

/// A single external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
    dir: PathBuf,
    env: BTreeMap<String, String>,
}

impl ExternalCommand {
    /// Create a command for `program`, run from the current directory.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: PathBuf::from("."),
            env: BTreeMap::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Add an environment variable for this command only.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Working directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Environment scoped to this command.
    pub fn get_env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Outcome of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    /// Whether the command succeeded.
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Extra detail for diagnostics.
    pub diagnostic: Option<String>,
}

impl ActionResult {
    /// Successful result with exit code 0.
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
            diagnostic: None,
        }
    }

    /// Failed result with the given exit code.
    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
            diagnostic: None,
        }
    }
}

/// Executes external commands on behalf of the router.
pub trait Runner {
    /// Run `command` to completion.
    ///
    /// A non-zero exit is reported through [`ActionResult`], not as an
    /// error; `Err` is reserved for commands that could not be started.
    fn run(&mut self, command: &ExternalCommand) -> Result<ActionResult>;

    /// Make sure `path` exists as a directory.
    fn create_dir(&mut self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    /// Pause between two dependent commands.
    fn settle(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}

/// Runs commands as child processes with inherited stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner.
    pub fn new() -> Self {
        Self
    }
}

impl Runner for SystemRunner {
    fn run(&mut self, command: &ExternalCommand) -> Result<ActionResult> {
        debug!("Running `{command}` in {}", command.dir().display());

        let status = Command::new(command.program())
            .args(command.get_args())
            .current_dir(command.dir())
            .envs(command.get_env())
            .status()
            .map_err(|source| Error::Spawn {
                program: command.program().to_string(),
                source,
            })?;

        debug!("`{}` exited with {status}", command.program());

        Ok(ActionResult {
            success: status.success(),
            code: status.code(),
            diagnostic: if status.code().is_none() {
                Some(status.to_string())
            } else {
                None
            },
        })
    }
}

/// Prints each command instead of running it.
///
/// Every command is reported as successful, so the whole pipeline can be
/// previewed without touching the build tree.
pub struct DryRunRunner<W: Write> {
    out: W,
}

impl<W: Write> DryRunRunner<W> {
    /// Create a dry-run runner writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the runner and return its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Runner for DryRunRunner<W> {
    fn run(&mut self, command: &ExternalCommand) -> Result<ActionResult> {
        if command.dir() == Path::new(".") {
            writeln!(self.out, "{command}")?;
        } else {
            writeln!(self.out, "(cd {} && {command})", command.dir().display())?;
        }
        Ok(ActionResult::ok())
    }

    fn create_dir(&mut self, path: &Path) -> Result<()> {
        writeln!(self.out, "mkdir -p {}", path.display())?;
        Ok(())
    }

    fn settle(&mut self, _delay: Duration) {}
}

/// Records commands and answers with scripted results.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingRunner {
    pub(crate) commands: Vec<ExternalCommand>,
    pub(crate) created_dirs: Vec<PathBuf>,
    pub(crate) settled: Vec<Duration>,
    /// Commands whose rendered form starts with this text fail with code 2.
    pub(crate) fail_on: Option<String>,
}

#[cfg(test)]
impl RecordingRunner {
    pub(crate) fn failing_on(prefix: &str) -> Self {
        Self {
            fail_on: Some(prefix.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn rendered(&self) -> Vec<String> {
        self.commands.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
impl Runner for RecordingRunner {
    fn run(&mut self, command: &ExternalCommand) -> Result<ActionResult> {
        self.commands.push(command.clone());
        let rendered = command.to_string();
        match &self.fail_on {
            Some(prefix) if rendered.starts_with(prefix.as_str()) => Ok(ActionResult::failed(2)),
            _ => Ok(ActionResult::ok()),
        }
    }

    fn create_dir(&mut self, path: &Path) -> Result<()> {
        self.created_dirs.push(path.to_path_buf());
        Ok(())
    }

    fn settle(&mut self, delay: Duration) {
        self.settled.push(delay);
    }
}
