//! Template loading and materialization
//!
//! This module provides:
//! - Built-in package templates (manifest, type config, entry point)
//! - Optional local template directory overrides
//! - Rendering of templates into a new package directory

pub mod source;
pub mod writer;

pub use source::{TemplateKind, TemplateSource};
pub use writer::{materialize, GeneratedFiles};

/// Manifest file name inside a generated package
pub const MANIFEST_FILE: &str = "package.json";

/// Type configuration file name inside a generated package
pub const TYPE_CONFIG_FILE: &str = "tsconfig.json";

/// Source entry point, relative to the package directory
pub const ENTRY_FILE: &str = "src/index.ts";
