//! Operator answers and their normalization

use crate::error::{Result, ScaffoldError};
use std::path::{Path, PathBuf};

/// The three answers collected before scaffolding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    /// Package name, possibly carrying the scope prefix
    pub name: String,

    /// Workspace directory relative to the repository root
    pub workspace: String,

    /// Space separated dependency list (may be empty)
    pub deps: String,
}

impl Answers {
    pub fn new(
        name: impl Into<String>,
        workspace: impl Into<String>,
        deps: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            workspace: workspace.into().trim().to_string(),
            deps: deps.into(),
        }
    }

    /// Strip `prefix` from the name, once, if present
    pub fn normalize(&mut self, prefix: &str) {
        if let Some(stripped) = self.name.strip_prefix(prefix) {
            self.name = stripped.to_string();
        }
    }

    /// Reject names and workspaces that would build an unsafe path
    pub fn validate(&self) -> Result<()> {
        let name = self.name.as_str();
        if name.is_empty() {
            return Err(ScaffoldError::input("name", "package name is required"));
        }
        if name.contains('/') {
            return Err(ScaffoldError::input(
                "name",
                format!("'{}' must be a single path segment", name),
            ));
        }
        check_segment("name", name)?;

        let workspace = self.workspace.as_str();
        if workspace.is_empty() {
            return Err(ScaffoldError::input("workspace", "workspace is required"));
        }
        if workspace.starts_with('/') || workspace.starts_with('\\') {
            return Err(ScaffoldError::input(
                "workspace",
                format!("'{}' must be relative to the repository root", workspace),
            ));
        }
        for segment in workspace.trim_end_matches('/').split('/') {
            check_segment("workspace", segment)?;
        }

        Ok(())
    }

    /// Whitespace separated dependency names, empties dropped
    pub fn dependency_tokens(&self) -> Vec<&str> {
        self.deps.split_whitespace().collect()
    }

    /// `<root>/<workspace>/<name>`
    pub fn package_dir(&self, root: &Path) -> PathBuf {
        root.join(self.workspace.trim_end_matches('/'))
            .join(&self.name)
    }
}

fn check_segment(field: &'static str, segment: &str) -> Result<()> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(ScaffoldError::input(
            field,
            format!("'{}' is not a valid path segment", segment),
        ));
    }
    if let Some(bad) = segment
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(ScaffoldError::input(
            field,
            format!("'{}' contains unsupported character '{}'", segment, bad),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_prefix() {
        let mut answers = Answers::new("@repo/widgets", "packages", "");
        answers.normalize("@repo/");
        assert_eq!(answers.name, "widgets");
    }

    #[test]
    fn test_normalize_strips_prefix_once() {
        let mut answers = Answers::new("@repo/@repo/widgets", "packages", "");
        answers.normalize("@repo/");
        assert_eq!(answers.name, "@repo/widgets");
    }

    #[test]
    fn test_normalize_leaves_other_names() {
        let mut answers = Answers::new("utils", "apps", "");
        answers.normalize("@repo/");
        assert_eq!(answers.name, "utils");

        let mut scoped = Answers::new("@other/utils", "apps", "");
        scoped.normalize("@repo/");
        assert_eq!(scoped.name, "@other/utils");
    }

    #[test]
    fn test_dependency_tokens() {
        let answers = Answers::new("a", "packages", "  left-pad   zod\tdate-fns ");
        assert_eq!(
            answers.dependency_tokens(),
            vec!["left-pad", "zod", "date-fns"]
        );
        assert!(Answers::new("a", "packages", "").dependency_tokens().is_empty());
        assert!(Answers::new("a", "packages", "   ").dependency_tokens().is_empty());
    }

    #[test]
    fn test_validate_accepts_plain_names() {
        assert!(Answers::new("ui-kit", "packages", "").validate().is_ok());
        assert!(Answers::new("web.app_2", "apps/internal", "").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let err = Answers::new("  ", "packages", "").validate().unwrap_err();
        assert!(matches!(err, ScaffoldError::InputError { field: "name", .. }));
    }

    #[test]
    fn test_validate_rejects_traversal() {
        for (name, workspace) in [
            ("..", "packages"),
            ("ok", "../outside"),
            ("ok", "/etc"),
            ("ok", "packages/../.."),
            ("nested/name", "packages"),
            ("sp ace", "packages"),
        ] {
            assert!(
                Answers::new(name, workspace, "").validate().is_err(),
                "{} in {} should be rejected",
                name,
                workspace
            );
        }
    }

    #[test]
    fn test_package_dir() {
        let answers = Answers::new("widgets", "packages/", "");
        assert_eq!(
            answers.package_dir(Path::new("/repo")),
            PathBuf::from("/repo/packages/widgets")
        );
    }
}
