//! The `update-self` command: check for, configure, and install updates of
//! the unipm binary.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::UnipmError;
use crate::update::platform_identifier;
use crate::update::preferences::{ConfigField, UpdateConfig};
use crate::update::self_updater::{SelfUpdater, UpdateCheckResult, UpdateInfo};

#[derive(Args)]
pub struct UpdateSelfArgs {
    #[command(subcommand)]
    action: Option<UpdateSelfAction>,
}

#[derive(Subcommand)]
enum UpdateSelfAction {
    /// Check whether an update is available without installing it
    Check,

    /// View or change update settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a configuration value
    Set {
        /// Configuration key (auto-check, check-interval, auto-download,
        /// show-notifications)
        key: String,
        /// New value
        value: String,
    },

    /// Reset all update settings to their defaults
    Reset,
}

impl UpdateSelfArgs {
    pub async fn execute(self) -> Result<()> {
        match self.action {
            Some(UpdateSelfAction::Check) => check().await,
            Some(UpdateSelfAction::Config { action }) => config(action).await,
            None => update().await,
        }
    }
}

async fn check_with(updater: &SelfUpdater) -> Result<UpdateInfo> {
    println!("Checking for updates...");
    match updater.check_for_update().await {
        UpdateCheckResult::Success(info) => Ok(info),
        UpdateCheckResult::Failed(reason) => {
            bail!("Failed to check for updates: {reason}")
        }
    }
}

async fn check() -> Result<()> {
    let updater = SelfUpdater::new()?;
    let info = check_with(&updater).await?;

    println!();
    println!("  Current version: {}", info.current_version);
    println!("  Latest version:  {}", info.latest_version);
    println!();

    if !info.has_update {
        println!("{}", "You're running the latest version!".green());
        return Ok(());
    }

    println!("{}", "Update available!".green().bold());

    match &info.download_url {
        Some(url) => println!("  Download URL: {url}"),
        None => match platform_identifier() {
            Ok(platform) => println!(
                "{}",
                format!("No binary available for your platform ({platform})").yellow()
            ),
            Err(_) => println!("{}", "Could not determine your platform".yellow()),
        },
    }

    if let Some(notes) = &info.release_notes {
        println!();
        println!("  Release notes:");
        for line in notes.lines() {
            println!("    {line}");
        }
    }

    println!();
    println!("Run {} to install the update", "'unipm update-self'".cyan());
    Ok(())
}

async fn update() -> Result<()> {
    let updater = SelfUpdater::new()?;
    let info = check_with(&updater).await?;

    if !info.has_update {
        println!(
            "{}",
            format!("You're already on the latest version ({})", info.current_version)
                .green()
        );
        return Ok(());
    }

    let Some(download_url) = info.download_url.as_deref() else {
        let platform = platform_identifier()?;
        return Err(UnipmError::NoAssetForPlatform { platform }.into());
    };

    println!();
    println!(
        "  Updating: {} {} {}",
        info.current_version.dimmed(),
        "->".dimmed(),
        info.latest_version.green().bold()
    );
    println!();

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "  {bar:30.cyan/blue} {bytes}/{total_bytes} ({percent}%)",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut length_set = false;
    let mut on_progress = |downloaded: u64, total: u64| {
        if !length_set {
            bar.set_length(total);
            length_set = true;
        }
        bar.set_position(downloaded);
    };

    let success = updater
        .perform_update(
            download_url,
            info.checksum_url.as_deref(),
            Some(&mut on_progress),
        )
        .await;
    bar.finish_and_clear();

    if !success {
        bail!("Update failed. Please try again or update manually.");
    }

    println!("{}", "Update complete!".green().bold());
    Ok(())
}

async fn config(action: Option<ConfigAction>) -> Result<()> {
    let updater = SelfUpdater::new()?;
    let prefs = updater.preferences();

    match action {
        None => {
            let config = prefs.load().await;
            println!();
            println!("  Update configuration:");
            println!("    Auto-check:         {}", config.auto_check);
            println!("    Check interval:     {} hours", config.check_interval);
            println!("    Auto-download:      {}", config.auto_download);
            println!("    Show notifications: {}", config.show_notifications);
            println!();
            println!("  Usage:");
            println!("    unipm update-self config set <key> <value>");
            println!("    unipm update-self config reset");
        }
        Some(ConfigAction::Set { key, value }) => {
            let field: ConfigField = key.parse()?;
            let mut config = prefs.load().await;
            config.set(field, &value)?;
            prefs.save(&config).await?;
            println!(
                "{}",
                format!("Configuration updated: {field} = {value}").green()
            );
        }
        Some(ConfigAction::Reset) => {
            prefs.save(&UpdateConfig::default()).await?;
            println!("{}", "Configuration reset to defaults".green());
        }
    }

    Ok(())
}
