//! Profile command implementation.

use anyhow::{Context, Result};
use console::style;
use cook::{
    ActionResult, DryRunRunner, ExternalCommand, Invocation, Profile, Router, Runner, Step,
    SystemRunner,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::{Cli, CliError, use_fancy_output, was_interrupted};

/// Runs commands as child processes, echoing each one to stderr and
/// rendering the pause before compiling as a countdown.
struct ConsoleRunner {
    inner: SystemRunner,
    quiet: bool,
}

impl Runner for ConsoleRunner {
    fn run(&mut self, command: &ExternalCommand) -> cook::Result<ActionResult> {
        if !self.quiet {
            eprintln!("{} {}", style("$").cyan().bold(), style(command).dim());
        }
        self.inner.run(command)
    }

    fn settle(&mut self, delay: Duration) {
        let secs = delay.as_secs();
        let pb = if self.quiet || !use_fancy_output() {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(secs);
            #[allow(clippy::unwrap_used)] // Static template string
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            pb
        };

        for remaining in (1..=secs).rev() {
            if was_interrupted() {
                break;
            }
            pb.set_message(format!("Start building in {remaining} secs"));
            pb.tick();
            thread::sleep(Duration::from_secs(1));
            pb.inc(1);
        }
        pb.finish_and_clear();
    }
}

/// Run the requested steps of `profile`.
pub(crate) fn cmd_run(cli: &Cli, profile: Profile, invocation: &Invocation) -> Result<()> {
    if !cli.quiet {
        if let Some(banner) = profile.banner() {
            eprintln!("{}", style(banner).magenta());
        }
    }

    let root: &Path = &cli.directory;
    debug!("Running {profile} in {}", root.display());

    let mut stdout = io::stdout();
    let result = if cli.dry_run {
        let mut runner = DryRunRunner::new(io::stdout());
        Router::new(profile, root, &mut runner, &mut stdout).run(invocation)
    } else {
        let mut runner = ConsoleRunner {
            inner: SystemRunner::new(),
            quiet: cli.quiet,
        };
        Router::new(profile, root, &mut runner, &mut stdout).run(invocation)
    };

    let steps = match result {
        Ok(steps) => steps,
        Err(cook::Error::Interrupted) => {
            return Err(CliError::Cancelled("Interrupted".to_string()).into());
        },
        Err(err) => {
            return Err(err).with_context(|| format!("{profile} failed"));
        },
    };

    if !cli.quiet && steps.contains(&Step::Build) {
        eprintln!(
            "\n{} {}",
            style("✓").green().bold(),
            style(format!("{profile} build completed")).green()
        );
    }

    Ok(())
}
