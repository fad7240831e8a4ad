//! Generated package manifest (`package.json`) and dependency patching

use crate::error::{Result, ScaffoldError};
use crate::registry::ResolvedDependency;
use crate::templates::writer::write_file;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

/// A parsed `package.json`
///
/// Keys keep their on-disk order so a rewrite only moves what it touched.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    path: PathBuf,
    document: Map<String, Value>,
}

impl PackageManifest {
    /// Parse manifest text; `path` is only used for error reporting and saving
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ScaffoldError::ManifestParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        match value {
            Value::Object(document) => Ok(Self {
                path: path.to_path_buf(),
                document,
            }),
            other => Err(ScaffoldError::ManifestParseError {
                path: path.to_path_buf(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Read and parse the manifest at `path`
    pub async fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path)
                .await
                .map_err(|e| ScaffoldError::ManifestParseError {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
        Self::parse(path, &content)
    }

    /// Package name field
    pub fn name(&self) -> Option<&str> {
        self.document.get("name").and_then(Value::as_str)
    }

    /// The `dependencies` mapping, if present
    pub fn dependencies(&self) -> Option<&Map<String, Value>> {
        self.document.get("dependencies").and_then(Value::as_object)
    }

    /// Set `dependencies[name] = ^version` for each resolved dependency
    ///
    /// Creates the mapping when it is missing. Later entries overwrite
    /// earlier ones with the same name. Dependency keys end up sorted, so the
    /// result does not depend on lookup order.
    pub fn merge_dependencies(&mut self, resolved: &[ResolvedDependency]) {
        let existing = self.document.get_mut("dependencies").map(Value::take);
        let mut entries: Vec<(String, Value)> = match existing {
            Some(Value::Object(existing)) => existing.into_iter().collect(),
            _ => Vec::new(),
        };

        for dependency in resolved {
            let range = Value::String(dependency.range());
            match entries.iter_mut().find(|(name, _)| *name == dependency.name) {
                Some((_, value)) => *value = range,
                None => entries.push((dependency.name.clone(), range)),
            }
        }
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let dependencies = Value::Object(entries.into_iter().collect());
        match self.document.get_mut("dependencies") {
            Some(slot) => *slot = dependencies,
            None => self.insert_after("scripts", "dependencies", dependencies),
        }
    }

    /// Serialize with 2-space indentation and a trailing newline
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.document).map_err(|e| {
            ScaffoldError::ManifestParseError {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;
        out.push('\n');
        Ok(out)
    }

    /// Replace the file on disk with the current document
    pub async fn save(&self) -> Result<()> {
        let content = self.to_json_string()?;
        write_file(&self.path, &content).await
    }

    /// Insert `key` right after `anchor`, or at the end when `anchor` is absent
    fn insert_after(&mut self, anchor: &str, key: &str, value: Value) {
        if !self.document.contains_key(anchor) {
            self.document.insert(key.to_string(), value);
            return;
        }
        let mut rebuilt = Map::with_capacity(self.document.len() + 1);
        let mut pending = Some(value);
        for (k, v) in std::mem::take(&mut self.document) {
            let is_anchor = k == anchor;
            rebuilt.insert(k, v);
            if is_anchor {
                if let Some(value) = pending.take() {
                    rebuilt.insert(key.to_string(), value);
                }
            }
        }
        self.document = rebuilt;
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
