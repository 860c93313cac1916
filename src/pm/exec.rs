//! Running package manager processes.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::process::Command;

/// Captured output of a finished process.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Raw exit code, when the platform reports one.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run a program and capture its output. Used for short probes like
/// `npm --version`.
///
/// # Errors
///
/// Fails when the program cannot be spawned, typically because it is not on
/// the PATH.
pub async fn run_captured(program: &str, args: &[&str]) -> Result<ExecResult> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Failed to run {program}"))?;

    Ok(ExecResult {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a program with stdio inherited from unipm, so the child's output and
/// prompts reach the user's terminal directly. Returns the child's exit
/// code, with a killed-by-signal exit mapped to 1.
///
/// # Errors
///
/// Fails when the program cannot be spawned.
pub async fn run_inherited(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
) -> Result<i32> {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let status = command
        .status()
        .await
        .with_context(|| format!("Failed to run {program}"))?;

    Ok(status.code().unwrap_or(1))
}
