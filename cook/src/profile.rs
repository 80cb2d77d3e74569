//! Project profiles.
//!
//! Each profile describes one firmware tree that cook knows how to drive:
//! where its build output goes, which targets and compiler prefixes it
//! accepts, and which pipeline steps it offers. All of this is fixed at
//! compile time; nothing here is discovered at runtime.

use crate::step::Step;
use std::fmt;

/// Build system flavor used by a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BuildSystem {
    /// Zephyr: `cmake ..` from inside the build dir, then `make`.
    ZephyrMake,
    /// Kbuild: a single `make` with `O=` pointing at the build dir.
    Kbuild,
    /// CMake generating Ninja files from a toolchain file.
    CmakeNinja,
}

/// Supported project profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Profile {
    /// Zephyr based application.
    Zeus,
    /// U-Boot tree.
    Up,
    /// Top-level coordinator.
    Deux,
    /// Coordinator support libraries.
    Utility,
}

const ZEUS_TARGETS: &[&str] = &[
    "radxa_zero3w/rk3568/xen_dom0",
    "qemu_cortex_a53/qemu_cortex_a53",
];

const ZEUS_CC_PREFIXES: &[&str] = &["aarch64-none-elf-", "aarch64-zephyr-elf-"];

const UP_CC_PREFIXES: &[&str] = &["aarch64-none-linux-gnu-", "aarch64-linux-gnu-"];

const ZEUS_STEPS: &[Step] = &[
    Step::List,
    Step::Transfer,
    Step::Manual,
    Step::Clean,
    Step::Tags,
    Step::Menuconfig,
    Step::Build,
];

const UP_STEPS: &[Step] = &[
    Step::SelectConfig,
    Step::List,
    Step::Clean,
    Step::Remove,
    Step::Distclean,
    Step::Build,
    Step::Emulator,
];

const DEUX_STEPS: &[Step] = &[Step::Clean, Step::Tags, Step::Build];

const UTILITY_STEPS: &[Step] = &[Step::Clean, Step::Build];

const CRUX_BANNER: &str = "  __  __      __\n / _\\/__\\/\\/\\/ _\\\n/ / /  \\/ / /\\ \\\n\\_\\ \\/\\/\\__/\\__/ CRUX 2025\n";

const ZEUS_MANUAL: &str = "\
This project requires python 3.12+

python3.12 -m pip install pykwalify
python3.12 -m pip install packaging
python3.12 -m pip install pyelftools
";

impl Profile {
    /// All profiles, in the order they are presented to users.
    pub const ALL: [Self; 4] = [Self::Zeus, Self::Up, Self::Deux, Self::Utility];

    /// Lowercase profile name as used on the command line.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Zeus => "zeus",
            Self::Up => "up",
            Self::Deux => "deux",
            Self::Utility => "utility",
        }
    }

    /// Build system driving this profile.
    #[must_use]
    pub fn build_system(&self) -> BuildSystem {
        match self {
            Self::Zeus => BuildSystem::ZephyrMake,
            Self::Up => BuildSystem::Kbuild,
            Self::Deux | Self::Utility => BuildSystem::CmakeNinja,
        }
    }

    /// Build output directory, relative to the project root.
    #[must_use]
    pub fn build_dir(&self) -> &'static str {
        match self {
            Self::Zeus => "zeus/out",
            Self::Up | Self::Deux | Self::Utility => "build",
        }
    }

    /// Target identifiers accepted by `--build`. Empty when the profile
    /// builds a single fixed configuration.
    #[must_use]
    pub fn targets(&self) -> &'static [&'static str] {
        match self {
            Self::Zeus => ZEUS_TARGETS,
            _ => &[],
        }
    }

    /// Whether `project` is one of the supported target identifiers.
    pub fn supports_target(&self, project: &str) -> bool {
        self.targets().contains(&project)
    }

    /// Cross-compiler prefixes, in probing priority order.
    #[must_use]
    pub fn cc_prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Zeus => ZEUS_CC_PREFIXES,
            Self::Up => UP_CC_PREFIXES,
            Self::Deux | Self::Utility => &[],
        }
    }

    /// Directory holding named build configurations, if any.
    #[must_use]
    pub fn config_dir(&self) -> Option<&'static str> {
        match self {
            Self::Up => Some("configs"),
            _ => None,
        }
    }

    /// CMake toolchain file used when none is given on the command line.
    #[must_use]
    pub fn default_toolchain_file(&self) -> Option<&'static str> {
        match self {
            Self::Utility => Some("cmake/aarch64.cmake"),
            _ => None,
        }
    }

    /// Seconds to pause between configure and compile.
    #[must_use]
    pub fn settle_secs(&self) -> u64 {
        match self {
            Self::Deux => 3,
            _ => 0,
        }
    }

    /// Whether a build starts from an empty build directory.
    #[must_use]
    pub fn wipes_build_dir(&self) -> bool {
        matches!(self, Self::Deux)
    }

    /// Whether the compile step only runs once configure has produced
    /// `build.ninja`.
    #[must_use]
    pub fn requires_ninja_file(&self) -> bool {
        matches!(self, Self::Deux)
    }

    /// Firmware image produced by a build, relative to the project root.
    #[must_use]
    pub fn artifact(&self) -> Option<String> {
        match self {
            Self::Zeus => Some(format!("{}/zephyr/zephyr.bin", self.build_dir())),
            Self::Up => Some(format!("{}/up.bin", self.build_dir())),
            Self::Deux | Self::Utility => None,
        }
    }

    /// Banner printed at startup, if the profile has one.
    #[must_use]
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            Self::Zeus | Self::Deux => Some(CRUX_BANNER),
            Self::Up | Self::Utility => None,
        }
    }

    /// Setup instructions shown by `--man`.
    #[must_use]
    pub fn manual(&self) -> Option<&'static str> {
        match self {
            Self::Zeus => Some(ZEUS_MANUAL),
            _ => None,
        }
    }

    /// Pipeline steps this profile offers.
    #[must_use]
    pub fn steps(&self) -> &'static [Step] {
        match self {
            Self::Zeus => ZEUS_STEPS,
            Self::Up => UP_STEPS,
            Self::Deux => DEUX_STEPS,
            Self::Utility => UTILITY_STEPS,
        }
    }

    /// Whether this profile offers `step`.
    pub fn supports(&self, step: Step) -> bool {
        self.steps().contains(&step)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
