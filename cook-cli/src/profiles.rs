//! Per-profile command-line flags.
//!
//! Each profile exposes only the flags for the steps it offers. Flags are
//! folded together with config file defaults into a [`cook::Invocation`].

use clap::Args;
use cook::{Actions, Invocation, ListFormat};
use std::path::PathBuf;

use crate::config::Config;

/// Flags for the Zephyr based `zeus` tree.
#[derive(Args, Debug)]
pub(crate) struct ZeusArgs {
    /// Board to build.
    #[arg(short, long, value_name = "PROJECT")]
    pub(crate) build: Option<String>,

    /// Cross-compile toolchain path.
    #[arg(short, long, value_name = "TOOLCHAIN PATH", env = "COOK_TOOLCHAIN")]
    pub(crate) toolchain: Option<PathBuf>,

    /// List supported projects.
    #[arg(short, long)]
    pub(crate) list: bool,

    /// Print the list as a JSON array.
    #[arg(long, requires = "list")]
    pub(crate) json: bool,

    /// Remove build directory.
    #[arg(short, long)]
    pub(crate) clean: bool,

    /// Create tags for code tracking.
    #[arg(short = 'g', long)]
    pub(crate) ctags: bool,

    /// Show setup manual.
    #[arg(short, long)]
    pub(crate) man: bool,

    /// Run menuconfig in the build directory.
    #[arg(short = 'u', long)]
    pub(crate) menuconfig: bool,

    /// Copy zephyr.bin to a remote board with scp.
    #[arg(short, long)]
    pub(crate) scp: bool,

    /// Remote board IP.
    #[arg(short, long, value_name = "IP", env = "COOK_REMOTE_IP")]
    pub(crate) ip: Option<String>,

    /// Remote board user name.
    #[arg(short = 'n', long, value_name = "USER NAME", env = "COOK_REMOTE_USER")]
    pub(crate) user: Option<String>,

    /// Remote board target path.
    #[arg(short = 'o', long, value_name = "TARGET PATH", env = "COOK_REMOTE_PATH")]
    pub(crate) rpath: Option<String>,
}

impl ZeusArgs {
    pub(crate) fn invocation(&self, config: &Config) -> Invocation {
        let actions = Actions {
            list: self.list,
            transfer: self.scp,
            manual: self.man,
            clean: self.clean,
            tags: self.ctags,
            menuconfig: self.menuconfig,
            build: self.build.is_some(),
            ..Actions::default()
        };

        Invocation::new(actions)
            .with_project(self.build.clone())
            .with_toolchain(
                self.toolchain
                    .clone()
                    .or_else(|| config.toolchain.path.clone()),
            )
            .with_remote(
                self.ip.clone().or_else(|| config.remote.ip.clone()),
                self.user.clone().or_else(|| config.remote.user.clone()),
                self.rpath.clone().or_else(|| config.remote.path.clone()),
            )
            .with_list_format(list_format(self.json))
    }
}

/// Flags for the U-Boot `up` tree.
#[derive(Args, Debug)]
pub(crate) struct UpArgs {
    /// Build u-boot.
    #[arg(short, long)]
    pub(crate) build: bool,

    /// Clean u-boot (make clean).
    #[arg(short, long)]
    pub(crate) clean: bool,

    /// List defconfig files under configs/.
    #[arg(short, long)]
    pub(crate) list: bool,

    /// Print the list as a JSON array.
    #[arg(long, requires = "list")]
    pub(crate) json: bool,

    /// Remove the build directory.
    #[arg(short, long)]
    pub(crate) remove: bool,

    /// Distclean u-boot.
    #[arg(short, long)]
    pub(crate) distclean: bool,

    /// Run u-boot on qemu aarch64.
    #[arg(short = 'e', long)]
    pub(crate) qemu: bool,

    /// Cross-compile toolchain path.
    #[arg(short, long, value_name = "TOOLCHAIN PATH", env = "COOK_TOOLCHAIN")]
    pub(crate) toolchain: Option<PathBuf>,

    /// Config file under configs/.
    #[arg(short = 'f', long, value_name = "CONFIG FILE")]
    pub(crate) defconfig: Option<String>,

    /// Parallel make jobs (default: 32).
    #[arg(short, long, value_name = "N")]
    pub(crate) jobs: Option<u32>,
}

impl UpArgs {
    pub(crate) fn invocation(&self, config: &Config) -> Invocation {
        let actions = Actions {
            list: self.list,
            clean: self.clean,
            remove: self.remove,
            distclean: self.distclean,
            build: self.build,
            emulator: self.qemu,
            ..Actions::default()
        };

        Invocation::new(actions)
            .with_config_name(self.defconfig.clone())
            .with_toolchain(
                self.toolchain
                    .clone()
                    .or_else(|| config.toolchain.path.clone()),
            )
            .with_jobs(self.jobs.or(config.build.jobs))
            .with_list_format(list_format(self.json))
    }
}

/// Flags for the `deux` coordinator.
#[derive(Args, Debug)]
pub(crate) struct DeuxArgs {
    /// Build deux target.
    #[arg(short, long)]
    pub(crate) build: bool,

    /// Target toolchain file (see cmake/).
    #[arg(short, long, value_name = "TOOLCHAIN-FILE", env = "COOK_TOOLCHAIN_FILE")]
    pub(crate) toolchain: Option<PathBuf>,

    /// Create tags.
    #[arg(short = 'g', long)]
    pub(crate) ctags: bool,

    /// Clean built target.
    #[arg(short, long)]
    pub(crate) clean: bool,
}

impl DeuxArgs {
    pub(crate) fn invocation(&self, config: &Config) -> Invocation {
        let actions = Actions {
            build: self.build,
            tags: self.ctags,
            clean: self.clean,
            ..Actions::default()
        };

        Invocation::new(actions).with_toolchain(
            self.toolchain
                .clone()
                .or_else(|| config.toolchain.file.clone()),
        )
    }
}

/// Flags for the coordinator support libraries.
#[derive(Args, Debug)]
pub(crate) struct UtilityArgs {
    /// Build the libraries.
    #[arg(short, long)]
    pub(crate) build: bool,

    /// Clean built libraries.
    #[arg(short, long)]
    pub(crate) clean: bool,

    /// Override the toolchain file (default: cmake/aarch64.cmake).
    #[arg(short, long, value_name = "TOOLCHAIN-FILE")]
    pub(crate) toolchain: Option<PathBuf>,
}

impl UtilityArgs {
    pub(crate) fn invocation(&self) -> Invocation {
        let actions = Actions {
            build: self.build,
            clean: self.clean,
            ..Actions::default()
        };

        Invocation::new(actions).with_toolchain(self.toolchain.clone())
    }
}

fn list_format(json: bool) -> ListFormat {
    if json {
        ListFormat::Json
    } else {
        ListFormat::Plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config_with_defaults() -> Config {
        let mut config = Config::default();
        config.toolchain.path = Some(PathBuf::from("/opt/from-config/bin"));
        config.toolchain.file = Some(PathBuf::from("cmake/from-config.cmake"));
        config.remote.ip = Some("10.0.0.9".to_string());
        config.remote.user = Some("root".to_string());
        config.remote.path = Some("/boot".to_string());
        config.build.jobs = Some(12);
        config
    }

    fn zeus() -> ZeusArgs {
        ZeusArgs {
            build: None,
            toolchain: None,
            list: false,
            json: false,
            clean: false,
            ctags: false,
            man: false,
            menuconfig: false,
            scp: false,
            ip: None,
            user: None,
            rpath: None,
        }
    }

    #[test]
    fn test_zeus_build_flag_names_project() {
        let args = ZeusArgs {
            build: Some("qemu_cortex_a53/qemu_cortex_a53".to_string()),
            ..zeus()
        };
        let invocation = args.invocation(&Config::default());
        assert!(invocation.actions().build);
        assert_eq!(
            invocation.project(),
            Some("qemu_cortex_a53/qemu_cortex_a53")
        );
    }

    #[test]
    fn test_zeus_no_flags_no_actions() {
        let invocation = zeus().invocation(&Config::default());
        assert_eq!(*invocation.actions(), Actions::default());
    }

    #[test]
    fn test_zeus_config_fills_missing_values() {
        let invocation = zeus().invocation(&config_with_defaults());
        assert_eq!(invocation.toolchain(), Some(Path::new("/opt/from-config/bin")));
        assert_eq!(invocation.remote().unwrap().destination(), "root@10.0.0.9:/boot");
    }

    #[test]
    fn test_zeus_flags_override_config() {
        let args = ZeusArgs {
            toolchain: Some(PathBuf::from("/opt/cli/bin")),
            user: Some("pi".to_string()),
            ..zeus()
        };
        let invocation = args.invocation(&config_with_defaults());
        assert_eq!(invocation.toolchain(), Some(Path::new("/opt/cli/bin")));
        assert_eq!(invocation.remote().unwrap().user, "pi");
    }

    #[test]
    fn test_up_invocation() {
        let args = UpArgs {
            build: true,
            clean: false,
            list: false,
            json: false,
            remove: false,
            distclean: false,
            qemu: true,
            toolchain: None,
            defconfig: Some("qemu_arm64_defconfig".to_string()),
            jobs: None,
        };
        let invocation = args.invocation(&config_with_defaults());
        assert!(invocation.actions().build);
        assert!(invocation.actions().emulator);
        assert_eq!(invocation.config_name(), Some("qemu_arm64_defconfig"));
        assert_eq!(invocation.jobs(), Some(12));
    }

    #[test]
    fn test_deux_uses_toolchain_file_from_config() {
        let args = DeuxArgs {
            build: true,
            toolchain: None,
            ctags: false,
            clean: false,
        };
        let invocation = args.invocation(&config_with_defaults());
        assert_eq!(
            invocation.toolchain(),
            Some(Path::new("cmake/from-config.cmake"))
        );
    }

    #[test]
    fn test_utility_without_override() {
        let args = UtilityArgs {
            build: true,
            clean: true,
            toolchain: None,
        };
        let invocation = args.invocation();
        assert!(invocation.toolchain().is_none());
        assert!(invocation.actions().clean);
    }
}
