//! The fixed execution pipeline.
//!
//! Requested actions always run in [`Step::PIPELINE`] order, whatever order
//! the flags were given in.

use crate::invocation::Invocation;
use std::fmt;

/// A named pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Step {
    /// Apply a named build configuration.
    SelectConfig,
    /// Print supported targets or configurations.
    List,
    /// Copy the built image to a remote board.
    Transfer,
    /// Print setup instructions.
    Manual,
    /// Clean build output.
    Clean,
    /// Delete the build directory.
    Remove,
    /// Clean build output and generated configuration.
    Distclean,
    /// Generate a tags file.
    Tags,
    /// Run the interactive configuration tool.
    Menuconfig,
    /// Configure and compile.
    Build,
    /// Boot the built image in an emulator.
    Emulator,
}

impl Step {
    /// Execution order.
    pub const PIPELINE: [Self; 11] = [
        Self::SelectConfig,
        Self::List,
        Self::Transfer,
        Self::Manual,
        Self::Clean,
        Self::Remove,
        Self::Distclean,
        Self::Tags,
        Self::Menuconfig,
        Self::Build,
        Self::Emulator,
    ];

    /// Whether the invocation requests this step.
    pub fn is_requested(&self, invocation: &Invocation) -> bool {
        let actions = invocation.actions();
        match self {
            Self::SelectConfig => invocation.config_name().is_some(),
            Self::List => actions.list,
            Self::Transfer => actions.transfer,
            Self::Manual => actions.manual,
            Self::Clean => actions.clean,
            Self::Remove => actions.remove,
            Self::Distclean => actions.distclean,
            Self::Tags => actions.tags,
            Self::Menuconfig => actions.menuconfig,
            Self::Build => actions.build,
            Self::Emulator => actions.emulator,
        }
    }

    /// Requested steps, in execution order.
    pub fn plan(invocation: &Invocation) -> Vec<Self> {
        Self::PIPELINE
            .into_iter()
            .filter(|step| step.is_requested(invocation))
            .collect()
    }

    /// Short name used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectConfig => "select-config",
            Self::List => "list",
            Self::Transfer => "transfer",
            Self::Manual => "manual",
            Self::Clean => "clean",
            Self::Remove => "remove",
            Self::Distclean => "distclean",
            Self::Tags => "tags",
            Self::Menuconfig => "menuconfig",
            Self::Build => "build",
            Self::Emulator => "emulator",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
