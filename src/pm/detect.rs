//! Project package manager detection.
//!
//! Three signals, tried in order of trustworthiness: the `packageManager`
//! field in package.json, a lockfile on disk, and finally whichever manager
//! binaries are on the PATH. A project without a package.json is reported
//! as not detected rather than guessed at.

use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use crate::pm::PackageManager;
use crate::pm::exec::run_captured;

/// Which signal identified the package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    /// The `packageManager` field in package.json.
    PackageJson,
    /// A lockfile on disk.
    Lockfile,
    /// A manager binary found on the PATH.
    CommandAvailability,
    /// No signal matched.
    NotDetected,
}

impl std::fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PackageJson => "package.json",
            Self::Lockfile => "lockfile",
            Self::CommandAvailability => "command",
            Self::NotDetected => "not detected",
        };
        f.write_str(s)
    }
}

/// The outcome of a detection pass over a project directory.
#[derive(Debug, Clone)]
pub struct Detection {
    /// The detected manager, or `None` when nothing matched.
    pub manager: Option<PackageManager>,
    /// Manager version, when one could be determined.
    pub version: Option<String>,
    /// Which signal produced the result.
    pub source: DetectionSource,
    /// Human-readable explanation of the result.
    pub hint: String,
}

/// Lockfile names and the manager each one implies, in check order. Both bun
/// lockfile formats (binary and text) map to bun.
const LOCKFILES: [(&str, PackageManager); 6] = [
    ("package-lock.json", PackageManager::Npm),
    ("yarn.lock", PackageManager::Yarn),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("deno.lock", PackageManager::Deno),
];

/// PATH probe order when neither package.json nor a lockfile decides.
const PATH_PRIORITY: [PackageManager; 4] = [
    PackageManager::Bun,
    PackageManager::Pnpm,
    PackageManager::Yarn,
    PackageManager::Npm,
];

#[derive(Deserialize)]
struct PackageJson {
    #[serde(rename = "packageManager")]
    package_manager: Option<String>,
}

/// Detect the package manager for the project rooted at `dir`.
///
/// Never fails: unreadable or malformed files just mean the corresponding
/// signal is skipped, and a fully undetectable project yields a
/// [`DetectionSource::NotDetected`] result.
pub async fn detect_package_manager(dir: &Path) -> Detection {
    let package_json_path = dir.join("package.json");
    let raw = match fs::read_to_string(&package_json_path).await {
        Ok(raw) => Some(raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Detection {
                manager: None,
                version: None,
                source: DetectionSource::NotDetected,
                hint: "No package.json file found".to_string(),
            };
        }
        Err(e) => {
            debug!("Could not read package.json: {e}");
            None
        }
    };

    if let Some(raw) = raw {
        match serde_json::from_str::<PackageJson>(&raw) {
            Ok(parsed) => {
                if let Some(field) = parsed.package_manager {
                    if let Some(detection) = detect_from_field(&field) {
                        return detection;
                    }
                    debug!("Unrecognized packageManager field: {field}");
                }
            }
            Err(e) => debug!("Could not parse package.json: {e}"),
        }
    }

    for (lockfile, manager) in LOCKFILES {
        if dir.join(lockfile).exists() {
            return Detection {
                manager: Some(manager),
                version: manager_version(manager).await,
                source: DetectionSource::Lockfile,
                hint: format!("Found {lockfile}"),
            };
        }
    }

    for manager in PATH_PRIORITY {
        if which::which(manager.name()).is_ok() {
            return Detection {
                manager: Some(manager),
                version: manager_version(manager).await,
                source: DetectionSource::CommandAvailability,
                hint: format!("Found '{}' on PATH", manager.name()),
            };
        }
    }

    Detection {
        manager: None,
        version: None,
        source: DetectionSource::NotDetected,
        hint: "No package manager detected".to_string(),
    }
}

/// Parse a `packageManager` field value of the form `name@version` (the
/// version part is optional).
fn detect_from_field(field: &str) -> Option<Detection> {
    let (name, version) = match field.split_once('@') {
        Some((name, version)) => (name, Some(version)),
        None => (field, None),
    };

    let manager = PackageManager::from_name(name)?;
    Some(Detection {
        manager: Some(manager),
        version: version.filter(|v| !v.is_empty()).map(str::to_string),
        source: DetectionSource::PackageJson,
        hint: format!("Found '{field}' in package.json"),
    })
}

/// Ask a manager binary for its version. Returns `None` when the binary is
/// missing or its output is empty.
async fn manager_version(manager: PackageManager) -> Option<String> {
    match run_captured(manager.name(), &["--version"]).await {
        Ok(result) if result.success => {
            let version = result.stdout.trim();
            if version.is_empty() {
                None
            } else {
                // yarn prints a bare version; npm and friends do too, but
                // trim a leading 'v' in case a shim adds one.
                Some(version.trim_start_matches('v').to_string())
            }
        }
        Ok(_) => None,
        Err(e) => {
            debug!("Could not get {} version: {e:#}", manager.name());
            None
        }
    }
}
