//! # cook
//!
//! Command router behind the `cook` firmware build driver.
//!
//! cook does not build anything itself. It maps a small set of flags onto
//! calls to external tools (cmake, ninja, make, qemu, scp, ctags) for a
//! handful of firmware trees, runs them one at a time in a fixed order and
//! stops at the first failure.
//!
//! ## Supported Profiles
//!
//! - `zeus`: Zephyr based application (cmake + make, cross prefix probing)
//! - `up`: U-Boot (Kbuild `make O=build`, defconfig selection, QEMU)
//! - `deux`: top-level coordinator (cmake + Ninja from a toolchain file)
//! - `utility`: coordinator support libraries (fixed toolchain file)
//!
//! ## Features
//!
//! - `serde`: `Serialize` for [`Profile`], [`Step`], [`BuildSystem`] and
//!   [`RemoteTarget`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use cook::{Actions, Invocation, Profile, Router, SystemRunner};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let invocation = Invocation::new(Actions {
//!         clean: true,
//!         build: true,
//!         ..Actions::default()
//!     })
//!     .with_toolchain(Some("/opt/aarch64-linux-gnu/bin"));
//!
//!     let mut runner = SystemRunner::new();
//!     let mut stdout = std::io::stdout();
//!     Router::new(Profile::Up, ".", &mut runner, &mut stdout).run(&invocation)?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::{Arc, OnceLock};

pub mod error;
pub mod exec;
pub mod invocation;
pub mod profile;
pub mod router;
pub mod step;
pub mod toolchain;

static INTERRUPT_CHECKER: OnceLock<Arc<dyn Fn() -> bool + Send + Sync>> = OnceLock::new();

/// Register a global interruption checker consulted between pipeline steps.
///
/// The checker should return `true` when the run should stop (for example
/// after receiving Ctrl-C in CLI applications).
pub fn set_interrupt_checker<F>(checker: F)
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    let _ = INTERRUPT_CHECKER.set(Arc::new(checker));
}

/// Returns whether interruption was requested by the embedding application.
#[must_use]
pub fn is_interrupted_requested() -> bool {
    INTERRUPT_CHECKER
        .get()
        .is_some_and(|checker| checker())
}

// Re-exports for convenience
pub use {
    error::{Error, Result},
    exec::{ActionResult, DryRunRunner, ExternalCommand, Runner, SystemRunner},
    invocation::{Actions, Invocation, ListFormat, RemoteTarget},
    profile::{BuildSystem, Profile},
    router::{Router, config_file_name},
    step::Step,
    toolchain::resolve_prefix,
};
