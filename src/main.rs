//! unipm CLI entry point
//!
//! This is the main executable for unipm, the universal package manager
//! dispatcher. It handles command-line argument parsing, error display, and
//! command execution.
//!
//! The CLI forwards common project operations to the detected package manager:
//! - `add` / `remove` - Add or remove packages
//! - `install` - Install project dependencies
//! - `update` - Update packages
//! - `run` / `exec` - Run scripts and package binaries
//! - `detect` - Show which package manager a project uses
//! - `update-self` - Update the unipm binary itself

use anyhow::Result;
use clap::Parser;
use unipm::cli;
use unipm::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
