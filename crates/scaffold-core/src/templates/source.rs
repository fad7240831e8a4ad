//! Template lookup from the built-in set or a local directory
//!
//! A local directory only needs to contain the files it overrides; anything
//! missing falls back to the built-in template.

use crate::error::{Result, ScaffoldError};
use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

const BUILTIN_MANIFEST: &str = include_str!("../../templates/package.json.hbs");
const BUILTIN_TYPE_CONFIG: &str = include_str!("../../templates/tsconfig.json.hbs");
const BUILTIN_ENTRY: &str = "export const name = '{{ name }}';\n";

/// The templates rendered for every new package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Manifest,
    TypeConfig,
    Entry,
}

impl TemplateKind {
    /// File name looked up inside a local template directory
    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateKind::Manifest => "package.json.hbs",
            TemplateKind::TypeConfig => "tsconfig.json.hbs",
            TemplateKind::Entry => "index.ts.hbs",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            TemplateKind::Manifest => BUILTIN_MANIFEST,
            TemplateKind::TypeConfig => BUILTIN_TYPE_CONFIG,
            TemplateKind::Entry => BUILTIN_ENTRY,
        }
    }
}

/// Template source - either compiled in or a local directory
#[derive(Debug, Clone, Default)]
pub enum TemplateSource {
    #[default]
    Builtin,
    Local(PathBuf),
}

impl TemplateSource {
    /// Create a local template source from an optional path
    pub fn from_dir(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(path) => Self::Local(path),
            None => Self::Builtin,
        }
    }

    /// Load the template text for `kind`
    pub async fn load(&self, kind: TemplateKind) -> Result<Cow<'static, str>> {
        match self {
            TemplateSource::Builtin => Ok(Cow::Borrowed(kind.builtin())),
            TemplateSource::Local(dir) => {
                let path = dir.join(kind.file_name());
                match fs::read_to_string(&path).await {
                    Ok(content) => {
                        tracing::debug!(path = %path.display(), "using local template");
                        Ok(Cow::Owned(content))
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        Ok(Cow::Borrowed(kind.builtin()))
                    }
                    Err(source) => Err(ScaffoldError::TemplateWriteError { path, source }),
                }
            }
        }
    }
}
