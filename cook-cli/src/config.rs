//! Configuration file support for cook.
//!
//! Configuration is loaded from multiple sources with the following priority (highest first):
//! 1. Command-line arguments
//! 2. Environment variables (COOK_*)
//! 3. Local config file (./cook.toml in the project root)
//! 4. Global config file (~/.config/cook/config.toml)

use directories::ProjectDirs;
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Local configuration file name, looked up in the project root.
pub const LOCAL_CONFIG_FILE: &str = "cook.toml";

/// Toolchain defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolchainConfig {
    /// Directory holding `<prefix>gcc` (zeus, up).
    pub path: Option<PathBuf>,
    /// CMake toolchain file (deux).
    pub file: Option<PathBuf>,
}

/// Remote board defaults for `--scp`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteConfig {
    /// Board address.
    pub ip: Option<String>,
    /// Login user.
    pub user: Option<String>,
    /// Destination path on the board.
    pub path: Option<String>,
}

/// Build defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildConfig {
    /// Parallel jobs for Kbuild.
    pub jobs: Option<u32>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Toolchain configuration.
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    /// Remote configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Build configuration.
    #[serde(default)]
    pub build: BuildConfig,
}

impl Config {
    /// Load configuration from the global file and the project root.
    pub fn load(root: &Path) -> Self {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global_config) = Self::load_from_file(&global_path) {
                debug!("Loaded global config from {}", global_path.display());
                config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        let local_path = root.join(LOCAL_CONFIG_FILE);
        if let Some(local_config) = Self::load_from_file(&local_path) {
            debug!("Loaded local config from {}", local_path.display());
            config.merge(local_config);
        }

        config
    }

    /// Load configuration from a specific file path (--config flag).
    pub fn load_from_path(path: &Path) -> Self {
        if let Some(config) = Self::load_from_file(path) {
            debug!("Loaded config from {}", path.display());
            config
        } else {
            warn!(
                "Could not load config from {}, using defaults",
                path.display()
            );
            Self::default()
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("Failed to parse TOML config file {}: {}", path.display(), e);
                    None
                },
            },
            Err(e) => {
                warn!("Failed to read config file {}: {}", path.display(), e);
                None
            },
        }
    }

    /// Get the global configuration directory.
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cook").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the global configuration file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Merge another config into this one. Values set in `other` win.
    fn merge(&mut self, other: Self) {
        if other.toolchain.path.is_some() {
            self.toolchain.path = other.toolchain.path;
        }
        if other.toolchain.file.is_some() {
            self.toolchain.file = other.toolchain.file;
        }

        if other.remote.ip.is_some() {
            self.remote.ip = other.remote.ip;
        }
        if other.remote.user.is_some() {
            self.remote.user = other.remote.user;
        }
        if other.remote.path.is_some() {
            self.remote.path = other.remote.path;
        }

        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
    }
}
