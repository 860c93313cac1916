//! unipm - Universal Package Manager dispatcher
//!
//! unipm detects which JavaScript package manager a project uses (bun, deno,
//! pnpm, yarn, or npm) and forwards common operations to the native binary, so
//! `unipm add`, `unipm install`, `unipm run` and friends work identically in
//! any project.
//!
//! The crate also ships a self-update engine that keeps the installed binary
//! current: it checks the GitHub release feed, downloads the asset for the
//! running platform, verifies it against a SHA-256 sidecar, and swaps it into
//! place without ever leaving the installation in a broken state.
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface and subcommand dispatch
//! - [`pm`] - Package manager detection, command matrix, and subprocess
//!   execution
//! - [`update`] - The self-update engine: release client, asset resolution,
//!   checksum verification, streaming download, preferences, and the
//!   crash-safe installer
//! - [`core`] - Error types and user-friendly error reporting
//!
//! # Update Safety
//!
//! The installer never writes to the executable path until the replacement
//! binary is fully downloaded and verified. On Unix the swap is a pair of
//! renames with a single-generation backup; on Windows, where a running
//! executable cannot be replaced, a deferred script performs the swap after
//! the process exits. A lock file in the configuration directory makes
//! concurrent installs mutually exclusive.

pub mod cli;
pub mod constants;
pub mod core;
pub mod pm;
pub mod update;
