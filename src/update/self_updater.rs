//! Orchestrates update checks and installs for the unipm binary itself.

use std::cmp::Ordering;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use colored::Colorize;
use tracing::{debug, error};

use crate::constants::release_cache_ttl;
use crate::update::download::ProgressFn;
use crate::update::installer::{InstallOutcome, Installer};
use crate::update::platform::platform_identifier;
use crate::update::preferences::PreferencesStore;
use crate::update::release::{
    ReleaseCache, ReleaseClient, ReleaseMetadata, find_asset_url, find_checksum_url,
};
use crate::update::version::compare_versions;

/// The result of comparing the running binary against the latest release.
#[derive(Debug, Clone)]
pub struct UpdateInfo {
    /// Version of the running binary.
    pub current_version: String,
    /// Version tag of the latest published release.
    pub latest_version: String,
    /// Whether the latest release is strictly newer than the running binary.
    pub has_update: bool,
    /// Download URL for this platform's binary. Populated only when
    /// `has_update` is true and a matching asset exists.
    pub download_url: Option<String>,
    /// URL of the checksum sidecar for the binary, when published.
    pub checksum_url: Option<String>,
    /// Release notes body, when the release carries one.
    pub release_notes: Option<String>,
    /// Publication timestamp of the latest release.
    pub published_at: Option<DateTime<Utc>>,
}

/// Outcome of an update check. A check either produces comparison data or a
/// reportable reason it could not, never a panic or a propagated error.
#[derive(Debug, Clone)]
pub enum UpdateCheckResult {
    Success(UpdateInfo),
    Failed(String),
}

impl UpdateCheckResult {
    /// The comparison data, when the check succeeded.
    #[must_use]
    pub fn info(&self) -> Option<&UpdateInfo> {
        match self {
            Self::Success(info) => Some(info),
            Self::Failed(_) => None,
        }
    }
}

/// Coordinates the release feed, version comparison, preferences, and the
/// installer.
///
/// Owns a [`ReleaseCache`] so repeated checks within its TTL reuse the same
/// fetched release instead of hammering the feed.
pub struct SelfUpdater {
    current_version: String,
    client: reqwest::Client,
    releases: ReleaseClient,
    prefs: PreferencesStore,
    cache: Mutex<ReleaseCache>,
}

impl SelfUpdater {
    /// Create an updater for the running binary with default preferences
    /// storage.
    ///
    /// # Errors
    ///
    /// Fails only when the preferences directory cannot be resolved.
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::new();
        Ok(Self {
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            releases: ReleaseClient::new(client.clone()),
            client,
            prefs: PreferencesStore::new()?,
            cache: Mutex::new(ReleaseCache::new(release_cache_ttl())),
        })
    }

    /// Override the version the updater considers itself to be. Test hook.
    #[must_use]
    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = version.into();
        self
    }

    /// Use an explicit preferences store. Test hook.
    #[must_use]
    pub fn with_preferences(mut self, prefs: PreferencesStore) -> Self {
        self.prefs = prefs;
        self
    }

    /// Fetch releases from an explicit endpoint instead of the official
    /// feed. Test hook.
    #[must_use]
    pub fn with_release_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.releases = ReleaseClient::with_endpoint(self.client.clone(), endpoint.into());
        self
    }

    /// The preferences store backing this updater.
    #[must_use]
    pub fn preferences(&self) -> &PreferencesStore {
        &self.prefs
    }

    /// Fetch the latest release, consulting the cache first.
    async fn latest_release(&self) -> Option<ReleaseMetadata> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(release) = cache.get() {
                debug!("Using cached release metadata");
                return Some(release.clone());
            }
        }

        let release = self.releases.fetch_latest().await?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.store(release.clone());
        }
        Some(release)
    }

    /// Drop any cached release so the next check fetches fresh data.
    pub fn invalidate_release_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.invalidate();
        }
    }

    /// Compare the running binary against the latest release.
    ///
    /// Download and checksum URLs are resolved only when an update actually
    /// exists; on the latest version both stay `None`. Successful checks
    /// stamp the last-check time regardless of whether an update was found.
    pub async fn check_for_update(&self) -> UpdateCheckResult {
        let Some(release) = self.latest_release().await else {
            return UpdateCheckResult::Failed(
                "Could not fetch release information".to_string(),
            );
        };

        let has_update =
            compare_versions(&self.current_version, &release.tag) == Ordering::Less;

        let (download_url, checksum_url) = if has_update {
            match platform_identifier() {
                Ok(platform_id) => (
                    find_asset_url(&release, &platform_id),
                    find_checksum_url(&release, &platform_id),
                ),
                Err(e) => {
                    debug!("Cannot resolve platform asset: {e}");
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        if let Err(e) = self.prefs.mark_checked().await {
            debug!("Could not record last-check time: {e:#}");
        }

        UpdateCheckResult::Success(UpdateInfo {
            current_version: self.current_version.clone(),
            latest_version: release.tag.clone(),
            has_update,
            download_url,
            checksum_url,
            release_notes: release.body.clone(),
            published_at: release.published_at,
        })
    }

    /// Download and install an update from the given URLs.
    ///
    /// Returns `true` when the binary was replaced or the swap was handed
    /// off to a deferred script (in which case a restart advisory is
    /// printed). Returns `false` on any failure, with the cause logged.
    pub async fn perform_update(
        &self,
        download_url: &str,
        checksum_url: Option<&str>,
        on_progress: Option<ProgressFn<'_>>,
    ) -> bool {
        let installer = match Installer::new(
            self.client.clone(),
            self.prefs.config_dir().to_path_buf(),
        ) {
            Ok(installer) => installer,
            Err(e) => {
                error!("Could not prepare installer: {e:#}");
                return false;
            }
        };

        match installer.install(download_url, checksum_url, on_progress).await {
            Ok(InstallOutcome::Installed) => true,
            Ok(InstallOutcome::PendingRestart) => {
                println!(
                    "{}",
                    "Update staged. Restart your terminal to finish installing.".yellow()
                );
                true
            }
            Err(e) => {
                error!("Update failed: {e}");
                false
            }
        }
    }

    /// Launch a fire-and-forget background check that prints a short
    /// advisory when an update is available.
    ///
    /// Nothing here may ever fail the foreground command or produce output
    /// of its own: faults are swallowed and logged at debug level only. The
    /// advisory goes to stderr so it cannot corrupt piped output.
    pub fn spawn_background_check() -> tokio::task::JoinHandle<()> {
        tokio::spawn(async {
            let Ok(updater) = SelfUpdater::new() else {
                return;
            };

            let config = updater.prefs.load().await;
            if !config.show_notifications {
                return;
            }
            if !updater.prefs.should_check().await {
                return;
            }

            let result = updater.check_for_update().await;
            if let Some(advisory) = background_advisory(&result) {
                eprintln!("{advisory}");
            }
        })
    }
}

/// Advisory text for a background check result.
///
/// Only a successful check that actually found an update produces output; a
/// check that finds nothing or fails outright is invisible to the user,
/// leaving a debug log entry as the sole trace.
pub(crate) fn background_advisory(result: &UpdateCheckResult) -> Option<String> {
    match result {
        UpdateCheckResult::Success(info) if info.has_update => Some(format!(
            "{} {} {} {}\n{}",
            "Update available:".yellow(),
            info.current_version.dimmed(),
            "->".dimmed(),
            info.latest_version.green(),
            "Run 'unipm update-self' to install it.".dimmed()
        )),
        UpdateCheckResult::Success(_) => None,
        UpdateCheckResult::Failed(reason) => {
            debug!("Background update check failed: {reason}");
            None
        }
    }
}
