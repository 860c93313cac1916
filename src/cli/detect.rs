//! The `detect` command: report the project's package manager.

use anyhow::Result;
use colored::Colorize;

use crate::pm::detect_package_manager;

pub async fn execute() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let detection = detect_package_manager(&cwd).await;

    match detection.manager {
        Some(manager) => {
            println!(
                "{} {}",
                "Package manager:".bold(),
                manager.name().cyan().bold()
            );
            if let Some(version) = &detection.version {
                println!("{} {version}", "Version:".bold());
            }
            println!("{} {}", "Detected via:".bold(), detection.source);
            println!("{} {}", "Hint:".bold(), detection.hint.dimmed());
        }
        None => {
            println!("{}", "No package manager detected".yellow());
            println!("{}", detection.hint.dimmed());
        }
    }

    Ok(())
}
