//! cook CLI - Build driver for the zeus, up and deux firmware trees.
//!
//! ## Features
//!
//! - Build Zephyr (zeus), U-Boot (up) and cmake/Ninja (deux) trees
//! - Cross-compiler prefix detection from a toolchain directory
//! - defconfig selection and listing
//! - QEMU boot and scp transfer of built images
//! - Dry-run preview of every external command
//! - Config file and environment variable defaults
//! - Shell completion generation

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use cook::Profile;
use env_logger::Env;
use log::debug;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

mod commands;
mod config;
mod profiles;

use config::Config;
use profiles::{DeuxArgs, UpArgs, UtilityArgs, ZeusArgs};

/// Whether stderr is a terminal (set once at startup).
static STDERR_IS_TTY: AtomicBool = AtomicBool::new(true);

/// Set by the Ctrl-C handler.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Check if colors and animations should be used (TTY and colors enabled).
pub(crate) fn use_fancy_output() -> bool {
    STDERR_IS_TTY.load(Ordering::Relaxed) && console::colors_enabled_stderr()
}

/// Whether Ctrl-C was pressed during this run.
pub(crate) fn was_interrupted() -> bool {
    INTERRUPTED.load(Ordering::Relaxed)
}

/// Errors raised by the CLI itself rather than by the router.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    /// Invalid combination of arguments.
    #[error("{0}")]
    Usage(String),
    /// Unusable project directory or configuration.
    #[error("{0}")]
    Config(String),
    /// Run was cancelled by the user.
    #[error("{0}")]
    Cancelled(String),
}

/// cook - Build driver for the zeus, up and deux firmware trees.
///
/// Environment variables:
///   COOK_TOOLCHAIN       - Default cross-compile toolchain directory (zeus, up)
///   COOK_TOOLCHAIN_FILE  - Default CMake toolchain file (deux)
///   COOK_REMOTE_IP       - Default remote board IP (zeus --scp)
///   COOK_REMOTE_USER     - Default remote board user (zeus --scp)
///   COOK_REMOTE_PATH     - Default remote board path (zeus --scp)
///   RUST_LOG             - Log filter (overrides -v/-q)
#[derive(Parser)]
#[command(name = "cook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Verbose output level (-v, -vv for increasing detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long, global = true)]
    pub(crate) quiet: bool,

    /// Print external commands instead of running them.
    #[arg(long, global = true)]
    pub(crate) dry_run: bool,

    /// Project root directory.
    #[arg(
        short = 'C',
        long,
        global = true,
        value_name = "DIR",
        default_value = "."
    )]
    pub(crate) directory: PathBuf,

    /// Path to a configuration file.
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Zephyr based zeus tree.
    Zeus(ZeusArgs),

    /// U-Boot tree.
    Up(UpArgs),

    /// deux coordinator (cmake + Ninja).
    Deux(DeuxArgs),

    /// deux support libraries.
    Utility(UtilityArgs),

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (auto-detected if not specified).
        #[arg(value_enum)]
        shell: Option<Shell>,
    },
}

/// Map an error to the process exit code.
///
/// 1 external command failure or unexpected error, 2 usage error,
/// 3 missing parameter or configuration error, 130 interrupted.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::Usage(_) => 2,
            CliError::Config(_) => 3,
            CliError::Cancelled(_) => 130,
        };
    }

    if was_interrupted() {
        return 130;
    }

    match err.downcast_ref::<cook::Error>() {
        Some(cook::Error::Interrupted) => 130,
        Some(lib_err) if lib_err.is_parameter_error() => 3,
        _ => 1,
    }
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();
}

fn install_interrupt_handler() {
    if let Err(e) = ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::Relaxed)) {
        debug!("Could not install Ctrl-C handler: {e}");
        return;
    }
    cook::set_interrupt_checker(was_interrupted);
}

fn main() {
    // No arguments at all: show help and exit successfully.
    if env::args().len() <= 1 {
        let _ = Cli::command().print_help();
        std::process::exit(0);
    }

    // --- NO_COLOR and TTY detection ---
    let stderr_is_tty = console::Term::stderr().is_term();
    STDERR_IS_TTY.store(stderr_is_tty, Ordering::Relaxed);

    if env::var("NO_COLOR").is_ok() || !stderr_is_tty {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let cli = Cli::parse();
    init_logging(&cli);
    install_interrupt_handler();

    debug!(
        "cook v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    if let Err(err) = run(&cli) {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(exit_code_for(&err));
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        return commands::completions::cmd_completions(*shell);
    }

    if !cli.directory.is_dir() {
        return Err(CliError::Config(format!(
            "Project directory not found: {}",
            cli.directory.display()
        ))
        .into());
    }

    // Load configuration
    let config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load(&cli.directory)
    };

    let (profile, invocation) = match &cli.command {
        Commands::Zeus(args) => (Profile::Zeus, args.invocation(&config)),
        Commands::Up(args) => (Profile::Up, args.invocation(&config)),
        Commands::Deux(args) => (Profile::Deux, args.invocation(&config)),
        Commands::Utility(args) => (Profile::Utility, args.invocation()),
        Commands::Completions { .. } => return Ok(()),
    };

    commands::run::cmd_run(cli, profile, &invocation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_command_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_zeus_build() {
        let cli = Cli::try_parse_from([
            "cook",
            "zeus",
            "-b",
            "qemu_cortex_a53/qemu_cortex_a53",
            "-t",
            "/opt/zephyr-sdk/bin",
        ])
        .unwrap();
        if let Commands::Zeus(args) = cli.command {
            assert_eq!(
                args.build.as_deref(),
                Some("qemu_cortex_a53/qemu_cortex_a53")
            );
            assert_eq!(
                args.toolchain.unwrap().to_str().unwrap(),
                "/opt/zephyr-sdk/bin"
            );
        } else {
            panic!("Expected Zeus command");
        }
    }

    #[test]
    fn test_cli_parse_zeus_scp() {
        let cli = Cli::try_parse_from([
            "cook", "zeus", "-s", "-i", "10.0.0.2", "-n", "root", "-o", "/boot",
        ])
        .unwrap();
        if let Commands::Zeus(args) = cli.command {
            assert!(args.scp);
            assert_eq!(args.ip.as_deref(), Some("10.0.0.2"));
            assert_eq!(args.user.as_deref(), Some("root"));
            assert_eq!(args.rpath.as_deref(), Some("/boot"));
        } else {
            panic!("Expected Zeus command");
        }
    }

    #[test]
    fn test_cli_parse_zeus_combined_short_flags() {
        let cli = Cli::try_parse_from(["cook", "zeus", "-cgm"]).unwrap();
        if let Commands::Zeus(args) = cli.command {
            assert!(args.clean);
            assert!(args.ctags);
            assert!(args.man);
            assert!(!args.list);
        } else {
            panic!("Expected Zeus command");
        }
    }

    #[test]
    fn test_cli_parse_up() {
        let cli = Cli::try_parse_from([
            "cook",
            "up",
            "--qemu",
            "-b",
            "-f",
            "configs/qemu_arm64_defconfig",
            "-j",
            "8",
        ])
        .unwrap();
        if let Commands::Up(args) = cli.command {
            assert!(args.build);
            assert!(args.qemu);
            assert_eq!(
                args.defconfig.as_deref(),
                Some("configs/qemu_arm64_defconfig")
            );
            assert_eq!(args.jobs, Some(8));
        } else {
            panic!("Expected Up command");
        }
    }

    #[test]
    fn test_cli_parse_deux() {
        let cli =
            Cli::try_parse_from(["cook", "deux", "-b", "-t", "cmake/aarch64.cmake"]).unwrap();
        assert!(matches!(cli.command, Commands::Deux(DeuxArgs { build: true, .. })));
    }

    #[test]
    fn test_cli_parse_utility() {
        let cli = Cli::try_parse_from(["cook", "utility", "-c"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Utility(UtilityArgs { clean: true, build: false, .. })
        ));
    }

    #[test]
    fn test_cli_json_requires_list() {
        assert!(Cli::try_parse_from(["cook", "zeus", "--json"]).is_err());
        assert!(Cli::try_parse_from(["cook", "zeus", "--list", "--json"]).is_ok());
    }

    #[test]
    fn test_cli_flag_not_offered_by_profile() {
        assert!(Cli::try_parse_from(["cook", "deux", "--qemu"]).is_err());
        assert!(Cli::try_parse_from(["cook", "utility", "--ctags"]).is_err());
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["cook", "utility"]).unwrap();
        assert!(!cli.quiet);
        assert!(!cli.dry_run);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.directory, PathBuf::from("."));
        assert!(cli.config_path.is_none());
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cook", "up", "-l", "--dry-run", "-C", "/src/up", "-vv", "--config", "ci.toml",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.directory, PathBuf::from("/src/up"));
        assert_eq!(cli.config_path, Some(PathBuf::from("ci.toml")));
    }

    #[test]
    fn test_cli_missing_subcommand() {
        assert!(Cli::try_parse_from(["cook"]).is_err());
    }

    #[test]
    fn test_exit_code_mapping() {
        let usage: anyhow::Error = CliError::Usage("bad".into()).into();
        assert_eq!(exit_code_for(&usage), 2);

        let config: anyhow::Error = CliError::Config("bad".into()).into();
        assert_eq!(exit_code_for(&config), 3);

        let cancelled: anyhow::Error = CliError::Cancelled("stop".into()).into();
        assert_eq!(exit_code_for(&cancelled), 130);

        let missing = anyhow::Error::new(cook::Error::MissingParameter("-t".into()))
            .context("zeus failed");
        assert_eq!(exit_code_for(&missing), 3);

        let failed = anyhow::Error::new(cook::Error::CommandFailed {
            command: "make".into(),
            code: Some(2),
        });
        assert_eq!(exit_code_for(&failed), 1);

        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), 1);
    }
}
