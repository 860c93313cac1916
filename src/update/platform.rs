use crate::core::UnipmError;

/// Derive the `{os}-{arch}` platform token used to select release assets.
///
/// Supported tokens are the cross product of `{linux, darwin, windows}` and
/// `{x64, arm64}`, matching the names the release pipeline attaches to
/// assets (e.g. `unipm-linux-x64`, `unipm-darwin-arm64`).
///
/// # Errors
///
/// Returns [`UnipmError::UnsupportedPlatform`] when the running OS or CPU
/// architecture is outside the supported set. This propagates as a
/// reportable error, never a panic - "no build for this platform" is a
/// state the caller surfaces to the user.
pub fn platform_identifier() -> Result<String, UnipmError> {
    platform_token(std::env::consts::OS, std::env::consts::ARCH)
}

/// Map an OS/arch pair to a platform token. Split out from
/// [`platform_identifier`] so the mapping is testable on any host.
pub(crate) fn platform_token(os: &str, arch: &str) -> Result<String, UnipmError> {
    let os_name = match os {
        "linux" => "linux",
        "macos" => "darwin",
        "windows" => "windows",
        _ => {
            return Err(UnipmError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            });
        }
    };

    let arch_name = match arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        _ => {
            return Err(UnipmError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            });
        }
    };

    Ok(format!("{os_name}-{arch_name}"))
}
