//! Error taxonomy for the scaffolding pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the scaffolding stages.
///
/// Every variant aborts the remaining pipeline. Nothing already written to
/// disk is rolled back.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// A user-supplied answer is missing or malformed
    #[error("Invalid {field}: {reason}")]
    InputError { field: &'static str, reason: String },

    #[error("Package directory already exists: {}", .path.display())]
    DirectoryAlreadyExists { path: PathBuf },

    /// Filesystem failure while rendering or writing a generated file
    #[error("Failed to write {}: {source}", .path.display())]
    TemplateWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template '{template}': {source}")]
    TemplateRenderError {
        template: &'static str,
        #[source]
        source: minijinja::Error,
    },

    /// The generated manifest could not be read back as JSON
    #[error("Failed to parse manifest {}: {reason}", .path.display())]
    ManifestParseError { path: PathBuf, reason: String },

    /// A registry lookup failed or returned an unexpected shape
    #[error("Failed to resolve latest version of '{dependency}': {reason}")]
    DependencyResolutionError { dependency: String, reason: String },

    /// The install or format command could not run or exited nonzero
    #[error("Command `{command}` failed{}", .exit_code.map(|c| format!(" with exit code {}", c)).unwrap_or_default())]
    PostProcessingError {
        command: String,
        exit_code: Option<i32>,
    },
}

impl ScaffoldError {
    pub(crate) fn input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InputError {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn resolution(dependency: &str, reason: impl ToString) -> Self {
        Self::DependencyResolutionError {
            dependency: dependency.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
