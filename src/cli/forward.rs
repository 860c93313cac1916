//! Forwarding a unipm operation to the detected package manager.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::core::UnipmError;
use crate::pm::{Operation, detect_package_manager, run_inherited};
use crate::update::SelfUpdater;

/// Arguments passed through verbatim to the underlying package manager.
#[derive(Args)]
pub struct ForwardArgs {
    /// Arguments forwarded to the package manager, including flags
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl ForwardArgs {
    /// Detect the project's package manager and run the operation with it.
    ///
    /// The child process inherits unipm's stdio, and its exit code becomes
    /// unipm's exit code. A background update check runs alongside the
    /// command; it is fire-and-forget and never delays or fails the
    /// operation.
    pub async fn execute(self, op: Operation) -> Result<()> {
        // Dropped handle: the advisory prints if it finishes in time,
        // otherwise it dies with the process.
        drop(SelfUpdater::spawn_background_check());

        let cwd = std::env::current_dir()?;
        let detection = detect_package_manager(&cwd).await;

        let Some(manager) = detection.manager else {
            return Err(UnipmError::NoPackageManager.into());
        };

        let (program, leading_args) = manager.command(op);
        if which::which(program).is_err() {
            return Err(UnipmError::PackageManagerNotFound {
                name: program.to_string(),
            }
            .into());
        }

        println!(
            "{} {} {}",
            "Using".dimmed(),
            manager.name().cyan().bold(),
            format!("({})", detection.hint).dimmed()
        );

        let mut full_args: Vec<String> =
            leading_args.iter().map(|s| (*s).to_string()).collect();
        full_args.extend(self.args);

        println!(
            "{} {} {}",
            "$".dimmed(),
            program.bold(),
            full_args.join(" ")
        );

        let code = run_inherited(program, &full_args, None).await?;
        if code != 0 {
            std::process::exit(code);
        }
        Ok(())
    }
}
