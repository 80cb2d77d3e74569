//! Command router.
//!
//! The router turns an [`Invocation`] into external tool calls for one
//! [`Profile`]. Parameters of every requested step are validated before
//! the first command is started; after that, steps run in pipeline order
//! and the first failing command ends the run.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::exec::{ExternalCommand, Runner};
use crate::invocation::{Invocation, ListFormat};
use crate::profile::{BuildSystem, Profile};
use crate::step::Step;
use crate::toolchain::resolve_prefix;

const DEFAULT_JOBS: u32 = 32;

const EMULATOR: &str = "qemu-system-aarch64";
const EMULATOR_ARGS: &[&str] = &[
    "-machine",
    "virt,gic-version=3,virtualization=true",
    "-cpu",
    "cortex-a57",
    "-nographic",
    "-smp",
    "8",
    "-m",
    "512M",
];

/// Reduce a configuration name to its base file name.
///
/// Only the final path component is ever handed to the build system, so
/// `../../etc/passwd` becomes `passwd`. Names without a normal final
/// component (`..`, `/`, `a/..`) are rejected.
pub fn config_file_name(name: &str) -> Result<&str> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::InvalidConfigName(name.to_string()))
}

/// Routes an invocation to external commands.
pub struct Router<'a> {
    profile: Profile,
    root: PathBuf,
    runner: &'a mut dyn Runner,
    out: &'a mut dyn Write,
    interrupted: Box<dyn Fn() -> bool + 'a>,
}

impl<'a> Router<'a> {
    /// Create a router for `profile` operating on the tree at `root`.
    ///
    /// Listings and manuals are written to `out`.
    pub fn new(
        profile: Profile,
        root: impl Into<PathBuf>,
        runner: &'a mut dyn Runner,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            profile,
            root: root.into(),
            runner,
            out,
            interrupted: Box::new(crate::is_interrupted_requested),
        }
    }

    /// Replace the check consulted between steps to stop the run early.
    #[must_use]
    pub fn with_interrupt_check<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + 'a,
    {
        self.interrupted = Box::new(check);
        self
    }

    /// Validate and run every requested step. Returns the steps executed.
    pub fn run(&mut self, invocation: &Invocation) -> Result<Vec<Step>> {
        let plan = Step::plan(invocation);
        self.validate(invocation, &plan)?;

        for step in &plan {
            if (self.interrupted)() {
                return Err(Error::Interrupted);
            }
            info!("-- {} {step}", self.profile);
            self.execute(*step, invocation)?;
        }

        Ok(plan)
    }

    /// Check that every planned step is offered by the profile and has the
    /// parameters it needs. Spawns nothing.
    pub fn validate(&self, invocation: &Invocation, plan: &[Step]) -> Result<()> {
        for step in plan {
            if !self.profile.supports(*step) {
                return Err(Error::UnsupportedAction {
                    profile: self.profile.to_string(),
                    action: step.to_string(),
                });
            }

            match step {
                Step::SelectConfig => {
                    if let Some(name) = invocation.config_name() {
                        config_file_name(name)?;
                    }
                },
                Step::Transfer => {
                    invocation.remote()?;
                },
                Step::Build => self.validate_build(invocation)?,
                _ => {},
            }
        }
        Ok(())
    }

    fn validate_build(&self, invocation: &Invocation) -> Result<()> {
        if !self.profile.targets().is_empty() {
            let project = invocation
                .project()
                .ok_or_else(|| Error::MissingParameter("-b, --build <PROJECT>".to_string()))?;
            if !self.profile.supports_target(project) {
                return Err(Error::UnsupportedProject(project.to_string()));
            }
        }

        if invocation.toolchain().is_none() && self.profile.default_toolchain_file().is_none() {
            return Err(Error::MissingParameter("-t, --toolchain".to_string()));
        }

        if !self.profile.cc_prefixes().is_empty() {
            self.cross_prefix(invocation)?;
        }
        Ok(())
    }

    fn execute(&mut self, step: Step, invocation: &Invocation) -> Result<()> {
        match step {
            Step::SelectConfig => match invocation.config_name() {
                Some(name) => self.select_config(name),
                None => Ok(()),
            },
            Step::List => self.list_targets(invocation.list_format()),
            Step::Transfer => self.transfer_artifact(invocation),
            Step::Manual => self.show_manual(),
            Step::Clean => self.clean(),
            Step::Remove => self.remove(),
            Step::Distclean => self.distclean(),
            Step::Tags => self.generate_tags(),
            Step::Menuconfig => self.enable_interactive_config(),
            Step::Build => self.build(invocation),
            Step::Emulator => self.run_emulator(),
        }
    }

    fn build_dir(&self) -> PathBuf {
        self.root.join(self.profile.build_dir())
    }

    fn at_root(&self, program: &str) -> ExternalCommand {
        ExternalCommand::new(program).current_dir(&self.root)
    }

    fn exec(&mut self, command: &ExternalCommand) -> Result<()> {
        let result = self.runner.run(command)?;
        if result.success {
            Ok(())
        } else {
            if let Some(diagnostic) = &result.diagnostic {
                debug!("`{command}`: {diagnostic}");
            }
            Err(Error::CommandFailed {
                command: command.to_string(),
                code: result.code,
            })
        }
    }

    /// Remove build output.
    pub fn clean(&mut self) -> Result<()> {
        info!("-- cleaning up all built objects ...");
        let command = match self.profile.build_system() {
            BuildSystem::Kbuild => self
                .at_root("make")
                .arg("clean")
                .arg(format!("O={}", self.profile.build_dir())),
            BuildSystem::ZephyrMake | BuildSystem::CmakeNinja => self.remove_build_dir_command(),
        };
        self.exec(&command)
    }

    /// Delete the build directory.
    pub fn remove(&mut self) -> Result<()> {
        info!("-- removing {}", self.profile.build_dir());
        let command = self.remove_build_dir_command();
        self.exec(&command)
    }

    /// Remove build output together with generated configuration.
    pub fn distclean(&mut self) -> Result<()> {
        let command = self
            .at_root("make")
            .arg("distclean")
            .arg(format!("O={}", self.profile.build_dir()));
        self.exec(&command)
    }

    fn remove_build_dir_command(&self) -> ExternalCommand {
        self.at_root("rm").args(["-rf", self.profile.build_dir()])
    }

    /// Print supported target identifiers, or the available configurations
    /// for profiles that select a configuration instead of a target.
    pub fn list_targets(&mut self, format: ListFormat) -> Result<()> {
        let entries: Vec<String> = match self.profile.config_dir() {
            Some(dir) => self.config_files(dir)?,
            None => self
                .profile
                .targets()
                .iter()
                .map(ToString::to_string)
                .collect(),
        };

        match format {
            ListFormat::Plain => {
                for entry in &entries {
                    writeln!(self.out, "{entry}")?;
                }
            },
            ListFormat::Json => {
                let json = serde_json::to_string_pretty(&entries)
                    .map_err(|e| Error::Io(e.into()))?;
                writeln!(self.out, "{json}")?;
            },
        }
        Ok(())
    }

    fn config_files(&self, dir: &str) -> Result<Vec<String>> {
        let path = self.root.join(dir);
        if !path.is_dir() {
            return Err(Error::ConfigNotFound(path));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with("defconfig") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Apply a named configuration from the profile's config directory.
    pub fn select_config(&mut self, name: &str) -> Result<()> {
        let file_name = config_file_name(name)?;
        let dir = self
            .profile
            .config_dir()
            .ok_or_else(|| Error::UnsupportedAction {
                profile: self.profile.to_string(),
                action: Step::SelectConfig.to_string(),
            })?;

        let path = self.root.join(dir).join(file_name);
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path));
        }

        info!("-- using {file_name}");
        let command = self
            .at_root("make")
            .arg(file_name)
            .arg(format!("O={}", self.profile.build_dir()));
        self.exec(&command)
    }

    /// Configure and compile.
    pub fn build(&mut self, invocation: &Invocation) -> Result<()> {
        self.validate_build(invocation)?;
        match self.profile.build_system() {
            BuildSystem::ZephyrMake => self.build_zephyr(invocation),
            BuildSystem::Kbuild => self.build_kbuild(invocation),
            BuildSystem::CmakeNinja => self.build_cmake_ninja(invocation),
        }
    }

    fn cross_prefix(&self, invocation: &Invocation) -> Result<String> {
        let toolchain = invocation
            .toolchain()
            .ok_or_else(|| Error::MissingParameter("-t, --toolchain".to_string()))?;
        // Commands run inside the project tree, so the prefix must not
        // depend on the working directory.
        let toolchain = std::path::absolute(toolchain)?;
        resolve_prefix(&toolchain, self.profile.cc_prefixes())
    }

    fn build_zephyr(&mut self, invocation: &Invocation) -> Result<()> {
        // validate_build guarantees a supported project here
        let project = invocation.project().unwrap_or_default();
        let prefix = self.cross_prefix(invocation)?;
        info!("-- building {project} ...");

        let build_dir = self.build_dir();
        self.runner.create_dir(&build_dir)?;

        let zephyr_base = std::path::absolute(&self.root)?;
        let configure = ExternalCommand::new("cmake")
            .current_dir(&build_dir)
            .arg("..")
            .arg(format!("-DBOARD={project}"))
            .arg(format!("-DCROSS_COMPILE={prefix}"))
            .env("ZEPHYR_BASE", zephyr_base.display().to_string());
        self.exec(&configure)?;

        let compile = ExternalCommand::new("make").current_dir(&build_dir);
        self.exec(&compile)
    }

    fn build_kbuild(&mut self, invocation: &Invocation) -> Result<()> {
        let prefix = self.cross_prefix(invocation)?;
        let jobs = invocation.jobs().unwrap_or(DEFAULT_JOBS);

        let command = self
            .at_root("make")
            .arg("ARCH=arm")
            .arg(format!("CROSS_COMPILE={prefix}"))
            .arg(format!("O={}", self.profile.build_dir()))
            .arg(format!("-j{jobs}"));
        self.exec(&command)
    }

    fn build_cmake_ninja(&mut self, invocation: &Invocation) -> Result<()> {
        let toolchain_file = invocation
            .toolchain()
            .map(Path::to_path_buf)
            .or_else(|| self.profile.default_toolchain_file().map(PathBuf::from))
            .ok_or_else(|| Error::MissingParameter("-t, --toolchain".to_string()))?;
        let build_dir = self.profile.build_dir();

        if self.profile.wipes_build_dir() {
            let remove = self.remove_build_dir_command();
            self.exec(&remove)?;
        }

        let configure = self
            .at_root("cmake")
            .arg(format!("-B{build_dir}"))
            .arg("-GNinja")
            .arg(format!(
                "-DCMAKE_TOOLCHAIN_FILE={}",
                toolchain_file.display()
            ));
        self.exec(&configure)?;

        let settle = self.profile.settle_secs();
        if settle > 0 {
            self.runner.settle(Duration::from_secs(settle));
        }

        if self.profile.requires_ninja_file() && !self.build_dir().join("build.ninja").exists() {
            warn!("{build_dir}/build.ninja was not generated, skipping compile");
            return Ok(());
        }

        let compile = self.at_root("cmake").args(["--build", build_dir]);
        self.exec(&compile)
    }

    /// Boot the built image in QEMU.
    pub fn run_emulator(&mut self) -> Result<()> {
        let image = self.profile.artifact().ok_or_else(|| Error::UnsupportedAction {
            profile: self.profile.to_string(),
            action: Step::Emulator.to_string(),
        })?;
        let command = self
            .at_root(EMULATOR)
            .args(EMULATOR_ARGS.iter().copied())
            .arg("-bios")
            .arg(image);
        self.exec(&command)
    }

    /// Copy the built image to a remote board.
    pub fn transfer_artifact(&mut self, invocation: &Invocation) -> Result<()> {
        let remote = invocation.remote()?;
        let artifact = self.profile.artifact().ok_or_else(|| Error::UnsupportedAction {
            profile: self.profile.to_string(),
            action: Step::Transfer.to_string(),
        })?;

        info!("-- sending {artifact} to {}@{}", remote.user, remote.ip);
        let command = self.at_root("scp").arg(artifact).arg(remote.destination());
        self.exec(&command)
    }

    /// Generate a tags file for the whole tree.
    pub fn generate_tags(&mut self) -> Result<()> {
        info!("-- generating tags for code tracking ...");
        let command = self
            .at_root("ctags")
            .args(["--languages=Asm,c,c++", "-R"]);
        self.exec(&command)
    }

    /// Print setup instructions.
    pub fn show_manual(&mut self) -> Result<()> {
        if let Some(manual) = self.profile.manual() {
            writeln!(self.out, "{manual}")?;
        }
        Ok(())
    }

    /// Run `make menuconfig` in an already configured build directory.
    ///
    /// Without a generated Makefile this only reports guidance.
    pub fn enable_interactive_config(&mut self) -> Result<()> {
        let build_dir = self.build_dir();
        if !build_dir.join("Makefile").exists() {
            warn!("please build {} first.", self.profile);
            return Ok(());
        }

        let command = ExternalCommand::new("make")
            .current_dir(build_dir)
            .arg("menuconfig");
        self.exec(&command)
    }
}
