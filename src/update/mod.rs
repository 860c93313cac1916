//! Self-update engine for the unipm binary.
//!
//! The pipeline runs in stages: fetch the latest release from the feed
//! ([`release`]), compare versions ([`version`]), pick the asset for this
//! platform ([`platform`]), stream the download ([`download`]), verify its
//! SHA-256 checksum ([`verification`]), and swap the binary into place
//! crash-safely ([`installer`]). [`self_updater::SelfUpdater`] orchestrates
//! the stages and [`preferences`] persists the user's update settings.
//!
//! Failures during a check degrade to a reportable result rather than an
//! error; failures during an install either roll back or leave a recoverable
//! backup next to the binary.

pub mod download;
pub mod installer;
pub mod platform;
pub mod preferences;
pub mod release;
pub mod self_updater;
pub mod verification;
pub mod version;


pub use download::{ProgressFn, download_file};
pub use installer::{InstallOutcome, Installer, ReplaceStrategy};
pub use platform::platform_identifier;
pub use preferences::{ConfigField, PreferencesStore, UpdateConfig};
pub use release::{
    ReleaseAsset, ReleaseCache, ReleaseClient, ReleaseMetadata, find_asset_url,
    find_checksum_url,
};
pub use self_updater::{SelfUpdater, UpdateCheckResult, UpdateInfo};
pub use verification::{ChecksumVerifier, digest_matches};
pub use version::compare_versions;
