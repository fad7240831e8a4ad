//! Workspace-wide install and format after scaffolding

use super::command::{run_command, CommandSpec, OutputSink};
use crate::config::PackageManager;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Runs the install command, then the format command, in the repository root
#[derive(Debug, Clone)]
pub struct PostProcessor {
    root: PathBuf,
    install: CommandSpec,
    format: CommandSpec,
}

impl PostProcessor {
    pub fn new(root: impl Into<PathBuf>, install: CommandSpec, format: CommandSpec) -> Self {
        Self {
            root: root.into(),
            install,
            format,
        }
    }

    /// Use the install/format commands of `package_manager`
    pub fn for_package_manager(root: impl Into<PathBuf>, package_manager: PackageManager) -> Self {
        Self::new(
            root,
            package_manager.install_command(),
            package_manager.format_command(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn install_command(&self) -> &CommandSpec {
        &self.install
    }

    pub fn format_command(&self) -> &CommandSpec {
        &self.format
    }

    /// Install dependencies across the workspace
    pub async fn install(&self, sink: &mut dyn OutputSink) -> Result<()> {
        run_command(&self.install, &self.root, sink).await
    }

    /// Format files across the workspace
    pub async fn format(&self, sink: &mut dyn OutputSink) -> Result<()> {
        run_command(&self.format, &self.root, sink).await
    }

    /// Install, then format. Stops at the first failure.
    pub async fn run(&self, sink: &mut dyn OutputSink) -> Result<()> {
        self.install(sink).await?;
        self.format(sink).await
    }
}
