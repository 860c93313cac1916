//! Command-line interface for unipm.
//!
//! Each subcommand lives in its own module with its own argument structures
//! and execution logic. The forwarded operations (`add`, `remove`,
//! `install`, `update`, `run`, `exec`) all share one implementation in
//! [`forward`]; [`detect`] reports the detection result without running
//! anything, and [`update_self`] drives the self-update engine.
//!
//! # Usage
//!
//! ```bash
//! # Install dependencies with whatever manager the project uses
//! unipm install
//!
//! # Add a package
//! unipm add left-pad
//!
//! # See what was detected and why
//! unipm detect
//!
//! # Update unipm itself
//! unipm update-self
//! ```

mod detect;
mod forward;
mod update_self;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::pm::Operation;

/// Main CLI structure for unipm.
#[derive(Parser)]
#[command(name = "unipm")]
#[command(author, version, about = "Universal package manager dispatcher", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available unipm subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Add packages to the project
    Add(forward::ForwardArgs),

    /// Remove packages from the project
    Remove(forward::ForwardArgs),

    /// Install project dependencies
    Install(forward::ForwardArgs),

    /// Update packages
    Update(forward::ForwardArgs),

    /// Run a package.json script (or deno task)
    Run(forward::ForwardArgs),

    /// Execute a package binary (npx, bunx, pnpm dlx, ...)
    Exec(forward::ForwardArgs),

    /// Show which package manager this project uses and why
    Detect,

    /// Update unipm to the latest version
    #[command(name = "update-self", alias = "self-update")]
    UpdateSelf(update_self::UpdateSelfArgs),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// Initializes logging from the verbosity flags first, then dispatches
    /// to the subcommand handler.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Add(cmd) => cmd.execute(Operation::Add).await,
            Commands::Remove(cmd) => cmd.execute(Operation::Remove).await,
            Commands::Install(cmd) => cmd.execute(Operation::Install).await,
            Commands::Update(cmd) => cmd.execute(Operation::Update).await,
            Commands::Run(cmd) => cmd.execute(Operation::Run).await,
            Commands::Exec(cmd) => cmd.execute(Operation::Exec).await,
            Commands::Detect => detect::execute().await,
            Commands::UpdateSelf(cmd) => cmd.execute().await,
        }
    }

    /// Set up the tracing subscriber.
    ///
    /// `--verbose` forces debug level and `--quiet` disables logging
    /// entirely; otherwise `RUST_LOG` is honored with an `info` fallback.
    /// Logs go to stderr so forwarded command output on stdout stays clean.
    fn init_logging(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = if self.quiet {
            EnvFilter::new("off")
        } else if self.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
