//! Error handling for unipm
//!
//! The error system is built around two types:
//! - [`UnipmError`] - enumerated error types for the failure cases unipm can
//!   classify (network faults, rate limiting, unsupported platforms, checksum
//!   mismatches, install failures, invalid configuration)
//! - [`ErrorContext`] - wrapper that adds a user-friendly message and an
//!   actionable suggestion when the error reaches the CLI boundary
//!
//! No error from the self-update engine is allowed to escape as a panic or an
//! unformatted stack trace: every public entry point returns an explicit
//! success/failure value, and [`user_friendly_error`] turns whatever does
//! bubble up into a colored message with a suggestion.

use colored::Colorize;
use thiserror::Error;

/// Enumerated error types for unipm operations.
///
/// The update-related variants mirror the failure taxonomy of the self-update
/// engine. A [`UnipmError::ChecksumMismatch`] is security-relevant and always
/// fatal to the operation that produced it; [`UnipmError::RateLimited`] and
/// [`UnipmError::NoAssetForPlatform`] are expected, reportable states rather
/// than bugs.
#[derive(Error, Debug)]
pub enum UnipmError {
    /// The release feed or an asset URL could not be reached.
    #[error("Network unavailable: {reason}")]
    NetworkUnavailable {
        /// Transport-level detail (DNS, timeout, connection refused).
        reason: String,
    },

    /// The release feed responded with HTTP 403 or 429.
    #[error("Rate limited by the release server. {hint}")]
    RateLimited {
        /// Human-readable wait hint derived from the response headers.
        hint: String,
    },

    /// The running OS or CPU architecture has no supported platform token.
    #[error("Unsupported platform: {os}-{arch}")]
    UnsupportedPlatform {
        /// Operating system reported by the environment.
        os: String,
        /// CPU architecture reported by the environment.
        arch: String,
    },

    /// The latest release has no binary asset for the current platform.
    #[error("No release binary available for platform '{platform}'")]
    NoAssetForPlatform {
        /// The `{os}-{arch}` token that failed to match any asset.
        platform: String,
    },

    /// A downloaded artifact did not match its published SHA-256 digest.
    #[error("Checksum verification failed: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Digest published in the checksum sidecar.
        expected: String,
        /// Digest computed over the downloaded file.
        actual: String,
    },

    /// The install phase failed; the previous binary was left in place.
    #[error("Failed to install update: {reason}")]
    InstallFailed {
        /// What went wrong during download, verification, or replacement.
        reason: String,
    },

    /// A configuration value failed validation.
    #[error("Invalid configuration: {reason}")]
    ConfigInvalid {
        /// Which field or key was rejected and why.
        reason: String,
    },

    /// No package manager could be detected for the current project.
    #[error("No package manager detected in this project")]
    NoPackageManager,

    /// The detected package manager's binary is not on PATH.
    #[error("Package manager '{name}' is not installed or not found in PATH")]
    PackageManagerNotFound {
        /// The binary that could not be found.
        name: String,
    },
}

/// An error paired with a suggestion, displayed at the CLI boundary.
pub struct ErrorContext {
    error: anyhow::Error,
    suggestion: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no suggestion attached.
    pub fn new(error: anyhow::Error) -> Self {
        Self {
            error,
            suggestion: None,
        }
    }

    /// Attach an actionable suggestion to the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Print the error (and suggestion, if any) to stderr in color.
    pub fn display(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self.error);
        for cause in self.error.chain().skip(1) {
            eprintln!("  {} {}", "Caused by:".dimmed(), cause);
        }
        if let Some(suggestion) = &self.suggestion {
            eprintln!("{} {}", "Hint:".yellow().bold(), suggestion);
        }
    }
}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Known [`UnipmError`] variants get a suggestion matched to the failure;
/// everything else is displayed as-is with its cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = match error.downcast_ref::<UnipmError>() {
        Some(UnipmError::NetworkUnavailable { .. }) => {
            Some("Check your internet connection and try again".to_string())
        }
        Some(UnipmError::RateLimited { .. }) => {
            Some("Wait for the rate limit to reset before retrying".to_string())
        }
        Some(UnipmError::UnsupportedPlatform { .. } | UnipmError::NoAssetForPlatform { .. }) => {
            Some("You may need to build unipm from source for this platform".to_string())
        }
        Some(UnipmError::ChecksumMismatch { .. }) => Some(
            "The download may be corrupted or tampered with. Retry the update; if this persists, report it"
                .to_string(),
        ),
        Some(UnipmError::InstallFailed { .. }) => Some(
            "Check that you have write permission to the directory containing the unipm binary"
                .to_string(),
        ),
        Some(UnipmError::ConfigInvalid { .. }) => Some(
            "Valid keys are auto-check, check-interval, auto-download, show-notifications"
                .to_string(),
        ),
        Some(UnipmError::NoPackageManager) => Some(
            "Run this inside a project with a package.json, or install one of: bun, pnpm, yarn, npm"
                .to_string(),
        ),
        Some(UnipmError::PackageManagerNotFound { name }) => {
            Some(format!("Install '{name}' and make sure it is on your PATH"))
        }
        None => None,
    };

    let ctx = ErrorContext::new(error);
    match suggestion {
        Some(s) => ctx.with_suggestion(s),
        None => ctx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = UnipmError::ChecksumMismatch {
            expected: "abc".to_string(),
            actual: "def".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Checksum verification failed: expected abc, got def"
        );

        let err = UnipmError::UnsupportedPlatform {
            os: "freebsd".to_string(),
            arch: "riscv64".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported platform: freebsd-riscv64");
    }

    #[test]
    fn test_user_friendly_error_attaches_suggestion() {
        let ctx = user_friendly_error(UnipmError::NoPackageManager.into());
        assert!(ctx.suggestion.is_some());

        let ctx = user_friendly_error(anyhow::anyhow!("unclassified"));
        assert!(ctx.suggestion.is_none());
    }
}
