//! Monorepo configuration trait for CLI binaries
//!
//! Each binary describes the monorepo flavour it scaffolds into by
//! implementing this trait. The pipeline and prompts only talk to the trait.

use std::path::Path;

/// Configuration trait for a monorepo layout
///
/// Implementors define:
/// - Product identity (name, display name)
/// - The organizational scope prefix stripped from package names
/// - The default workspace directory
/// - Registry endpoint and its environment override
/// - Post-setup instructions
pub trait MonorepoConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Scope prefix removed from package names (e.g. `@repo/`)
    fn scope_prefix(&self) -> &'static str;

    /// Workspace used when the operator leaves the answer blank
    fn default_workspace(&self) -> &'static str;

    /// Default package registry base URL
    fn default_registry_url(&self) -> &'static str;

    /// Environment variable name for overriding the registry URL
    fn registry_url_env(&self) -> &'static str;

    /// Generate the "next steps" instructions after the package is created
    fn next_steps(&self, package_dir: &Path) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }

    /// Registry URL after applying the environment override
    fn registry_url(&self) -> String {
        std::env::var(self.registry_url_env())
            .unwrap_or_else(|_| self.default_registry_url().to_string())
    }
}
