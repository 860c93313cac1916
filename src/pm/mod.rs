//! Package manager identification and the command matrix.
//!
//! [`detect`] figures out which JavaScript package manager a project uses;
//! [`exec`] runs the resolved commands. The matrix in this module maps each
//! abstract operation onto the concrete subcommand each manager expects, so
//! the rest of the tool never spells out `npm uninstall` or `pnpm dlx` by
//! hand.

pub mod detect;
pub mod exec;

pub use detect::{Detection, DetectionSource, detect_package_manager};
pub use exec::{ExecResult, run_captured, run_inherited};

/// A supported JavaScript package manager.
///
/// Variant order is the detection priority when probing the PATH: bun, then
/// pnpm, yarn, npm. Deno is detected only through its lockfile or an
/// explicit `packageManager` field, never by PATH probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Bun,
    Deno,
    Pnpm,
    Yarn,
    Npm,
}

/// All supported managers, in detection priority order.
pub const PACKAGE_MANAGERS: [PackageManager; 5] = [
    PackageManager::Bun,
    PackageManager::Deno,
    PackageManager::Pnpm,
    PackageManager::Yarn,
    PackageManager::Npm,
];

impl PackageManager {
    /// The executable name, as invoked from the shell.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bun => "bun",
            Self::Deno => "deno",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Npm => "npm",
        }
    }

    /// Parse a manager from its executable name, as found in a
    /// `packageManager` field.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bun" => Some(Self::Bun),
            "deno" => Some(Self::Deno),
            "pnpm" => Some(Self::Pnpm),
            "yarn" => Some(Self::Yarn),
            "npm" => Some(Self::Npm),
            _ => None,
        }
    }

    /// Resolve an operation to the program and leading arguments for this
    /// manager. User-supplied arguments are appended after the returned
    /// slice.
    #[must_use]
    pub fn command(self, op: Operation) -> (&'static str, &'static [&'static str]) {
        use Operation::{Add, Exec, Install, Remove, Run, Update};
        match (self, op) {
            (Self::Bun, Add) => ("bun", &["add"]),
            (Self::Bun, Remove) => ("bun", &["remove"]),
            (Self::Bun, Install) => ("bun", &["install"]),
            (Self::Bun, Update) => ("bun", &["upgrade"]),
            (Self::Bun, Run) => ("bun", &["run"]),
            (Self::Bun, Exec) => ("bunx", &[]),

            (Self::Deno, Add) => ("deno", &["add"]),
            (Self::Deno, Remove) => ("deno", &["remove"]),
            (Self::Deno, Install) => ("deno", &["install"]),
            (Self::Deno, Update) => ("deno", &["outdated", "--update"]),
            (Self::Deno, Run) => ("deno", &["task"]),
            (Self::Deno, Exec) => ("deno", &["run"]),

            (Self::Pnpm, Add) => ("pnpm", &["add"]),
            (Self::Pnpm, Remove) => ("pnpm", &["remove"]),
            (Self::Pnpm, Install) => ("pnpm", &["install"]),
            (Self::Pnpm, Update) => ("pnpm", &["update"]),
            (Self::Pnpm, Run) => ("pnpm", &["run"]),
            (Self::Pnpm, Exec) => ("pnpm", &["dlx"]),

            (Self::Yarn, Add) => ("yarn", &["add"]),
            (Self::Yarn, Remove) => ("yarn", &["remove"]),
            (Self::Yarn, Install) => ("yarn", &["install"]),
            (Self::Yarn, Update) => ("yarn", &["upgrade"]),
            (Self::Yarn, Run) => ("yarn", &["run"]),
            (Self::Yarn, Exec) => ("yarn", &["exec"]),

            (Self::Npm, Add) => ("npm", &["install"]),
            (Self::Npm, Remove) => ("npm", &["uninstall"]),
            (Self::Npm, Install) => ("npm", &["install"]),
            (Self::Npm, Update) => ("npm", &["update"]),
            (Self::Npm, Run) => ("npm", &["run"]),
            (Self::Npm, Exec) => ("npx", &[]),
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An abstract package management operation, independent of which manager
/// will carry it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Install,
    Update,
    Run,
    Exec,
}

impl Operation {
    /// The unipm subcommand name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Install => "install",
            Self::Update => "update",
            Self::Run => "run",
            Self::Exec => "exec",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npm_remaps_operations() {
        assert_eq!(
            PackageManager::Npm.command(Operation::Add),
            ("npm", &["install"][..])
        );
        assert_eq!(
            PackageManager::Npm.command(Operation::Remove),
            ("npm", &["uninstall"][..])
        );
        assert_eq!(PackageManager::Npm.command(Operation::Exec), ("npx", &[][..]));
    }

    #[test]
    fn test_deno_uses_task_runner_and_outdated() {
        assert_eq!(
            PackageManager::Deno.command(Operation::Run),
            ("deno", &["task"][..])
        );
        assert_eq!(
            PackageManager::Deno.command(Operation::Update),
            ("deno", &["outdated", "--update"][..])
        );
        assert_eq!(
            PackageManager::Deno.command(Operation::Exec),
            ("deno", &["run"][..])
        );
    }

    #[test]
    fn test_exec_resolves_to_runner_binaries() {
        assert_eq!(PackageManager::Bun.command(Operation::Exec), ("bunx", &[][..]));
        assert_eq!(
            PackageManager::Pnpm.command(Operation::Exec),
            ("pnpm", &["dlx"][..])
        );
        assert_eq!(
            PackageManager::Yarn.command(Operation::Exec),
            ("yarn", &["exec"][..])
        );
    }

    #[test]
    fn test_straightforward_rows_pass_through() {
        for pm in [PackageManager::Bun, PackageManager::Pnpm, PackageManager::Yarn] {
            let (program, args) = pm.command(Operation::Add);
            assert_eq!(program, pm.name());
            assert_eq!(args, &["add"]);
        }
    }

    #[test]
    fn test_from_name_round_trips() {
        for pm in PACKAGE_MANAGERS {
            assert_eq!(PackageManager::from_name(pm.name()), Some(pm));
        }
        assert_eq!(PackageManager::from_name("cargo"), None);
    }
}
