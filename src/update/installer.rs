//! Crash-safe in-place replacement of the running binary.
//!
//! The installer downloads the new binary to a sibling `.new` path, verifies
//! its checksum when one is published, then swaps it into place. On Unix the
//! swap is a pair of renames with the old binary parked at a `.backup` path
//! so a failure midway can be rolled back. On Windows the running executable
//! is locked, so the swap is deferred to a detached batch script that runs
//! after the process exits.

use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use tokio::fs;
use tracing::{debug, warn};

use crate::constants::{UPDATE_LOCK_FILE_NAME, UPDATE_SCRIPT_NAME};
use crate::core::UnipmError;
use crate::update::download::{ProgressFn, download_file};
use crate::update::verification::{ChecksumVerifier, digest_matches};

/// How an update concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The binary was replaced; the new version runs on next invocation.
    Installed,
    /// The swap was handed off to a deferred script; it completes after the
    /// current process exits.
    PendingRestart,
}

/// Platform-appropriate mechanism for swapping the new binary into place.
///
/// Selected once per install rather than branching on the OS at each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceStrategy {
    /// Rename the old binary aside, rename the new one in. Unix only: the
    /// OS allows renaming over a running executable's path.
    DirectRename,
    /// Write a batch script that performs the swap after the process exits.
    /// Required on Windows, where the running executable is locked.
    DeferredScript,
}

impl ReplaceStrategy {
    /// The strategy for the platform this binary was compiled for.
    #[must_use]
    pub fn for_current_platform() -> Self {
        if cfg!(windows) {
            Self::DeferredScript
        } else {
            Self::DirectRename
        }
    }

    async fn replace(
        self,
        exe_path: &Path,
        temp_path: &Path,
        backup_path: &Path,
        config_dir: &Path,
    ) -> Result<InstallOutcome, UnipmError> {
        match self {
            Self::DirectRename => {
                try_direct_replace(exe_path, temp_path, backup_path).await?;
                Ok(InstallOutcome::Installed)
            }
            Self::DeferredScript => {
                deferred_replace(exe_path, temp_path, backup_path, config_dir).await?;
                Ok(InstallOutcome::PendingRestart)
            }
        }
    }
}

/// Exclusive advisory lock held for the duration of an install.
///
/// Acquisition is fail-fast: a second concurrent update errors out
/// immediately instead of queueing behind the first. The lock file is
/// removed on drop, best-effort.
pub(crate) struct InstallLock {
    _file: std::fs::File,
    path: PathBuf,
}

impl InstallLock {
    pub(crate) async fn acquire(config_dir: &Path) -> Result<Self, UnipmError> {
        if let Err(e) = fs::create_dir_all(config_dir).await {
            return Err(UnipmError::InstallFailed {
                reason: format!("could not create config directory: {e}"),
            });
        }

        let path = config_dir.join(UPDATE_LOCK_FILE_NAME);
        let lock_path = path.clone();
        let file = tokio::task::spawn_blocking(move || -> Result<std::fs::File, UnipmError> {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&lock_path)
                .map_err(|e| UnipmError::InstallFailed {
                    reason: format!("could not open lock file: {e}"),
                })?;

            match file.try_lock_exclusive() {
                Ok(true) => Ok(file),
                Ok(false) | Err(_) => Err(UnipmError::InstallFailed {
                    reason: "another unipm update is already in progress".to_string(),
                }),
            }
        })
        .await
        .map_err(|e| UnipmError::InstallFailed {
            reason: format!("lock task failed: {e}"),
        })??;

        Ok(Self { _file: file, path })
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        // The lock itself is released when the file handle closes; removing
        // the file just keeps the config directory tidy.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Downloads, verifies, and installs a new binary over the running one.
pub struct Installer {
    client: reqwest::Client,
    exe_path: PathBuf,
    config_dir: PathBuf,
    strategy: ReplaceStrategy,
}

impl Installer {
    /// Create an installer targeting the currently running executable.
    ///
    /// # Errors
    ///
    /// Fails when the current executable path cannot be determined.
    pub fn new(client: reqwest::Client, config_dir: PathBuf) -> anyhow::Result<Self> {
        use anyhow::Context;
        let exe_path =
            std::env::current_exe().context("Could not determine current executable path")?;
        Ok(Self {
            client,
            exe_path,
            config_dir,
            strategy: ReplaceStrategy::for_current_platform(),
        })
    }

    /// Create an installer with explicit paths and strategy. Used by tests
    /// to exercise the replace sequence against scratch files.
    pub fn with_paths(
        client: reqwest::Client,
        exe_path: PathBuf,
        config_dir: PathBuf,
        strategy: ReplaceStrategy,
    ) -> Self {
        Self {
            client,
            exe_path,
            config_dir,
            strategy,
        }
    }

    /// Download the new binary, verify it, and swap it into place.
    ///
    /// When `checksum_url` is `None` or the sidecar cannot be fetched, the
    /// install proceeds unverified with a warning. A checksum that fetches
    /// but does not match is fatal: the downloaded file is removed and the
    /// original binary is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`UnipmError::InstallFailed`] on download or filesystem
    /// faults and [`UnipmError::ChecksumMismatch`] on a failed verification.
    pub async fn install(
        &self,
        download_url: &str,
        checksum_url: Option<&str>,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<InstallOutcome, UnipmError> {
        let _lock = InstallLock::acquire(&self.config_dir).await?;

        let temp_path = sibling_path(&self.exe_path, ".new");
        let backup_path = sibling_path(&self.exe_path, ".backup");

        debug!("Downloading update to {}", temp_path.display());
        if !download_file(&self.client, download_url, &temp_path, on_progress).await {
            return Err(UnipmError::InstallFailed {
                reason: "failed to download the new binary".to_string(),
            });
        }

        match checksum_url {
            Some(url) => match ChecksumVerifier::fetch_expected(&self.client, url).await {
                Some(expected) => {
                    let actual = match ChecksumVerifier::compute_sha256(&temp_path).await {
                        Ok(actual) => actual,
                        Err(e) => {
                            let _ = fs::remove_file(&temp_path).await;
                            return Err(UnipmError::InstallFailed {
                                reason: format!("could not hash downloaded file: {e}"),
                            });
                        }
                    };
                    if !digest_matches(&expected, &actual) {
                        let _ = fs::remove_file(&temp_path).await;
                        return Err(UnipmError::ChecksumMismatch {
                            expected: expected.trim().to_lowercase(),
                            actual,
                        });
                    }
                    debug!("Checksum verified");
                }
                None => {
                    warn!("Could not fetch checksum, proceeding without verification");
                }
            },
            None => {
                warn!("No checksum available for this release, proceeding without verification");
            }
        }

        self.strategy
            .replace(&self.exe_path, &temp_path, &backup_path, &self.config_dir)
            .await
    }
}

/// Build a sibling of `path` with `suffix` appended to its file name,
/// e.g. `/usr/local/bin/unipm` -> `/usr/local/bin/unipm.new`.
pub(crate) fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    sibling.set_file_name(format!("{name}{suffix}"));
    sibling
}

/// Swap `temp_path` into `exe_path` via `backup_path`, rolling back on
/// failure.
///
/// Sequence: mark the new binary executable, park the current binary at the
/// backup path, rename the new binary into place, delete the backup. Every
/// failure path runs [`recover_failed_replace`], so a failed swap restores
/// the backup when needed and never leaves the downloaded temp file behind.
pub(crate) async fn try_direct_replace(
    exe_path: &Path,
    temp_path: &Path,
    backup_path: &Path,
) -> Result<(), UnipmError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o755);
        if let Err(e) = fs::set_permissions(temp_path, permissions).await {
            recover_failed_replace(exe_path, temp_path, backup_path).await;
            return Err(UnipmError::InstallFailed {
                reason: format!("could not mark new binary executable: {e}"),
            });
        }
    }

    // A backup left over from a previous interrupted update would make the
    // first rename fail on some platforms.
    if backup_path.exists() {
        let _ = fs::remove_file(backup_path).await;
    }

    if let Err(e) = fs::rename(exe_path, backup_path).await {
        recover_failed_replace(exe_path, temp_path, backup_path).await;
        return Err(UnipmError::InstallFailed {
            reason: format!("could not move current binary aside: {e}"),
        });
    }

    if let Err(e) = fs::rename(temp_path, exe_path).await {
        recover_failed_replace(exe_path, temp_path, backup_path).await;
        return Err(UnipmError::InstallFailed {
            reason: format!("could not move new binary into place: {e}"),
        });
    }

    if let Err(e) = fs::remove_file(backup_path).await {
        debug!("Could not remove backup {}: {e}", backup_path.display());
    }

    Ok(())
}

/// Best-effort rollback after a failed swap: restore the backup if the
/// binary's own path is empty, then clean up the downloaded file. All
/// errors are swallowed - recovery must never make things worse.
pub(crate) async fn recover_failed_replace(
    exe_path: &Path,
    temp_path: &Path,
    backup_path: &Path,
) {
    if backup_path.exists() && !exe_path.exists() {
        if let Err(e) = fs::rename(backup_path, exe_path).await {
            warn!("Could not restore backup binary: {e}");
        }
    }
    let _ = fs::remove_file(temp_path).await;
}

/// Where the deferred swap script is written inside the config directory.
pub(crate) fn deferred_script_path(config_dir: &Path) -> PathBuf {
    config_dir.join(UPDATE_SCRIPT_NAME)
}

/// Batch script that performs the swap once the current process has exited.
pub(crate) fn deferred_replace_script(
    exe_path: &Path,
    temp_path: &Path,
    backup_path: &Path,
) -> String {
    let exe = exe_path.display();
    let temp = temp_path.display();
    let backup = backup_path.display();
    format!(
        "@echo off\r\n\
         timeout /t 2 /nobreak > nul\r\n\
         move /y \"{exe}\" \"{backup}\"\r\n\
         move /y \"{temp}\" \"{exe}\"\r\n\
         del \"{backup}\"\r\n\
         del \"%~f0\"\r\n"
    )
}

#[cfg(windows)]
async fn deferred_replace(
    exe_path: &Path,
    temp_path: &Path,
    backup_path: &Path,
    config_dir: &Path,
) -> Result<(), UnipmError> {
    use std::os::windows::process::CommandExt;
    use std::process::Stdio;

    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

    let script_path = deferred_script_path(config_dir);
    let script = deferred_replace_script(exe_path, temp_path, backup_path);
    fs::write(&script_path, script)
        .await
        .map_err(|e| UnipmError::InstallFailed {
            reason: format!("could not write update script: {e}"),
        })?;

    std::process::Command::new("cmd")
        .args(["/c", &script_path.to_string_lossy()])
        .creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| UnipmError::InstallFailed {
            reason: format!("could not launch update script: {e}"),
        })?;

    Ok(())
}

#[cfg(not(windows))]
async fn deferred_replace(
    _exe_path: &Path,
    _temp_path: &Path,
    _backup_path: &Path,
    _config_dir: &Path,
) -> Result<(), UnipmError> {
    Err(UnipmError::InstallFailed {
        reason: "deferred replacement is only supported on Windows".to_string(),
    })
}
