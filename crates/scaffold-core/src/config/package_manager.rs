//! Package manager detection from workspace lockfiles

use crate::runtime::command::CommandSpec;
use std::fmt;
use std::path::Path;

/// Lockfiles in order of preference
const LOCKFILES: &[(&str, PackageManager)] = &[
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("bun.lock", PackageManager::Bun),
    ("bun.lockb", PackageManager::Bun),
    ("package-lock.json", PackageManager::Npm),
];

/// Supported JavaScript package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Pnpm,
    Npm,
    Yarn,
    Bun,
}

impl PackageManager {
    /// Detect the package manager from the lockfile in `root`
    ///
    /// Defaults to pnpm when no lockfile is present.
    pub fn detect(root: &Path) -> Self {
        LOCKFILES
            .iter()
            .find(|(lockfile, _)| root.join(lockfile).is_file())
            .map(|(_, manager)| *manager)
            .unwrap_or_default()
    }

    /// Binary name
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Pnpm => "pnpm",
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    /// Workspace-wide dependency install
    pub fn install_command(&self) -> CommandSpec {
        CommandSpec::new(self.program(), ["install"])
    }

    /// Workspace-wide `format` script
    pub fn format_command(&self) -> CommandSpec {
        CommandSpec::new(self.program(), ["run", "format"])
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())
    }
}
