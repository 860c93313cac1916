//! Global constants used throughout the unipm codebase.
//!
//! Endpoint URLs, file names, and timing parameters that are shared across
//! modules. Defining them centrally keeps the wire- and disk-format contracts
//! (asset naming, checksum sidecars, config file locations) in one place.

use std::time::Duration;

/// GitHub repository that publishes unipm releases.
pub const GITHUB_REPO: &str = "opticalsecurity/unipm";

/// Fixed endpoint for latest-release metadata.
pub const GITHUB_API_URL: &str =
    "https://api.github.com/repos/opticalsecurity/unipm/releases/latest";

/// User agent sent with every request to the release feed and asset URLs.
pub const USER_AGENT: &str = "unipm-updater";

/// Name of the per-user configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".unipm";

/// Environment variable overriding the configuration directory (used by tests).
pub const CONFIG_DIR_ENV: &str = "UNIPM_CONFIG_DIR";

/// Update preferences file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// File recording the epoch-millis timestamp of the last update check.
pub const LAST_CHECK_FILE_NAME: &str = "last-update-check";

/// Lock file guarding the install phase against concurrent invocations.
pub const UPDATE_LOCK_FILE_NAME: &str = "update.lock";

/// Deferred replacement script written on Windows.
pub const UPDATE_SCRIPT_NAME: &str = "update.bat";

/// Suffix that distinguishes checksum sidecar assets from binary assets.
///
/// Release assets follow the `unipm-{os}-{arch}` naming convention, with the
/// matching checksum published as `unipm-{os}-{arch}.sha256`. This must stay
/// bit-exact for interop with the existing release pipeline.
pub const CHECKSUM_SUFFIX: &str = ".sha256";

/// How long a fetched release stays valid in the in-memory cache.
pub fn release_cache_ttl() -> Duration {
    Duration::from_secs(300)
}
