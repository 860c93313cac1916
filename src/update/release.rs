use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::constants::{CHECKSUM_SUFFIX, GITHUB_API_URL, USER_AGENT};

/// A downloadable file attached to a release: a platform binary or its
/// checksum sidecar.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset file name, e.g. `unipm-linux-x64` or `unipm-linux-x64.sha256`.
    pub name: String,
    /// Direct download URL for the asset.
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// Remote release descriptor fetched from the release feed.
///
/// Immutable once fetched; never persisted. Only the fields unipm consumes
/// are deserialized (`tag_name`, `body`, `published_at`, `assets`).
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseMetadata {
    /// Version tag, e.g. `v1.3.0`.
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Free-text release notes.
    pub body: Option<String>,
    /// When the release was published.
    #[serde(rename = "published_at")]
    pub published_at: Option<DateTime<Utc>>,
    /// Attached assets in feed order.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Client for the fixed latest-release endpoint.
///
/// This layer classifies failures but does not retry: rate limiting (HTTP
/// 403/429) is logged with a human-readable wait hint, every other failure
/// at debug level, and all of them collapse to `None`. Turning `None` into a
/// reportable "could not fetch release information" result is the
/// orchestrator's job.
pub struct ReleaseClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ReleaseClient {
    /// Create a client against the official release endpoint.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: GITHUB_API_URL.to_string(),
        }
    }

    /// Create a client against an explicit endpoint. Test hook.
    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Fetch the latest release metadata.
    ///
    /// Returns `None` on rate limiting, any non-2xx status, transport
    /// faults, or malformed JSON. Never panics and never propagates an
    /// error across this boundary.
    pub async fn fetch_latest(&self) -> Option<ReleaseMetadata> {
        debug!("Fetching latest release from {}", self.endpoint);

        let response = match self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("Failed to fetch release info: {e}");
                return None;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            let headers = response.headers();
            let retry_after = headers
                .get("retry-after")
                .and_then(|v| v.to_str().ok());
            let reset = headers
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok());
            warn!(
                "Rate limited by GitHub API. {}",
                rate_limit_hint(retry_after, reset)
            );
            return None;
        }

        if !status.is_success() {
            debug!("GitHub API returned status {status}");
            return None;
        }

        match response.json::<ReleaseMetadata>().await {
            Ok(release) => Some(release),
            Err(e) => {
                debug!("Failed to parse release info: {e}");
                None
            }
        }
    }
}

/// Build a human-readable wait hint from rate-limit response headers.
///
/// Prefers `Retry-After` (seconds) over `X-RateLimit-Reset` (epoch seconds);
/// falls back to a generic hint when neither parses.
#[must_use]
pub fn rate_limit_hint(retry_after: Option<&str>, reset_epoch: Option<&str>) -> String {
    if let Some(secs) = retry_after.and_then(|v| v.trim().parse::<u64>().ok()) {
        return format!("Try again in {secs} seconds.");
    }

    if let Some(reset) = reset_epoch.and_then(|v| v.trim().parse::<i64>().ok()) {
        if let Some(at) = DateTime::<Utc>::from_timestamp(reset, 0) {
            return format!("Rate limit resets at {}.", at.format("%H:%M:%S UTC"));
        }
    }

    "Try again later.".to_string()
}

/// Find the binary asset URL for a platform token.
///
/// Case-insensitive substring match of the token against asset names,
/// excluding checksum sidecars. Returns `None` when no asset matches - "no
/// build for this platform" is an expected state, not an error.
#[must_use]
pub fn find_asset_url(release: &ReleaseMetadata, platform_id: &str) -> Option<String> {
    let token = platform_id.to_lowercase();
    release
        .assets
        .iter()
        .find(|asset| {
            let name = asset.name.to_lowercase();
            name.contains(&token) && !name.ends_with(CHECKSUM_SUFFIX)
        })
        .map(|asset| asset.download_url.clone())
}

/// Find the checksum sidecar URL for a platform token.
///
/// Same matching rules as [`find_asset_url`], but the name must end with the
/// checksum suffix - an asset can never satisfy both lookups.
#[must_use]
pub fn find_checksum_url(release: &ReleaseMetadata, platform_id: &str) -> Option<String> {
    let token = platform_id.to_lowercase();
    release
        .assets
        .iter()
        .find(|asset| {
            let name = asset.name.to_lowercase();
            name.contains(&token) && name.ends_with(CHECKSUM_SUFFIX)
        })
        .map(|asset| asset.download_url.clone())
}

/// In-memory cache of the last fetched release, with an explicit TTL and an
/// explicit invalidation method. Owned by the orchestrator; there is no
/// ambient module-level state.
pub struct ReleaseCache {
    entry: Option<(ReleaseMetadata, Instant)>,
    ttl: Duration,
}

impl ReleaseCache {
    /// Create an empty cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    /// Return the cached release if it is still within its TTL.
    pub fn get(&self) -> Option<&ReleaseMetadata> {
        match &self.entry {
            Some((release, fetched_at)) if fetched_at.elapsed() < self.ttl => Some(release),
            _ => None,
        }
    }

    /// Replace the cached release and reset its age.
    pub fn store(&mut self, release: ReleaseMetadata) {
        self.entry = Some((release, Instant::now()));
    }

    /// Drop the cached release, forcing the next read to fetch fresh data.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
