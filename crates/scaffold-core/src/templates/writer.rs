//! Render templates into a new package directory

use super::source::{TemplateKind, TemplateSource};
use super::{ENTRY_FILE, MANIFEST_FILE, TYPE_CONFIG_FILE};
use crate::answers::Answers;
use crate::error::{Result, ScaffoldError};
use minijinja::{context, Environment};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Paths of the files written for a new package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub manifest: PathBuf,
    pub type_config: PathBuf,
    pub entry: PathBuf,
}

impl GeneratedFiles {
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [&self.manifest, &self.type_config, &self.entry]
            .into_iter()
            .map(PathBuf::as_path)
    }
}

/// Write the manifest, type config and entry point into `package_dir`
///
/// Fails with [`ScaffoldError::DirectoryAlreadyExists`] before touching the
/// filesystem when `package_dir` is already present.
pub async fn materialize(
    source: &TemplateSource,
    answers: &Answers,
    package_dir: &Path,
) -> Result<GeneratedFiles> {
    if matches!(fs::try_exists(package_dir).await, Ok(true)) {
        return Err(ScaffoldError::DirectoryAlreadyExists {
            path: package_dir.to_path_buf(),
        });
    }

    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);

    let files = GeneratedFiles {
        manifest: package_dir.join(MANIFEST_FILE),
        type_config: package_dir.join(TYPE_CONFIG_FILE),
        entry: package_dir.join(ENTRY_FILE),
    };

    for (kind, target) in [
        (TemplateKind::Manifest, &files.manifest),
        (TemplateKind::TypeConfig, &files.type_config),
        (TemplateKind::Entry, &files.entry),
    ] {
        let template = source.load(kind).await?;
        let rendered = env
            .render_str(
                &template,
                context! {
                    name => answers.name.as_str(),
                    workspace => answers.workspace.as_str(),
                },
            )
            .map_err(|source| ScaffoldError::TemplateRenderError {
                template: kind.file_name(),
                source,
            })?;
        write_file(target, &rendered).await?;
        tracing::debug!(path = %target.display(), "wrote generated file");
    }

    Ok(files)
}

/// Write `content` to `path`, creating parent directories as needed
pub(crate) async fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| ScaffoldError::TemplateWriteError {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(path, content)
        .await
        .map_err(|source| ScaffoldError::TemplateWriteError {
            path: path.to_path_buf(),
            source,
        })
}
