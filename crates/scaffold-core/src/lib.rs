//! Scaffold Core - Shared library for monorepo package generators
//!
//! This library creates a new package inside a JavaScript monorepo: it
//! renders a manifest, a type configuration and an entry point, pins the
//! latest published version of each requested dependency, and then installs
//! and formats the workspace. Binaries describe their monorepo through the
//! [`MonorepoConfig`] trait.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Answer normalization, template rendering,
//!   registry lookups, manifest patching, command execution
//! - **Layer 2: Workflow Orchestration** - `MonorepoConfig` trait and `Scaffolder` pipeline
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use scaffold_core::{Answers, CapturedOutput, ScaffoldOptions, Scaffolder};
//!
//! let options = ScaffoldOptions::for_config(&MyRepo, std::env::current_dir()?);
//! let scaffolder = Scaffolder::new(options)?;
//! let answers = Answers::new("@repo/widgets", "packages", "zod");
//! let report = scaffolder.run(answers, &mut CapturedOutput::default()).await?;
//! ```

pub mod answers;
pub mod config;
pub mod error;
pub mod manifest;
pub mod monorepo;
pub mod pipeline;
pub mod registry;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use answers::Answers;
pub use config::PackageManager;
pub use error::{Result, ScaffoldError};
pub use manifest::PackageManifest;
pub use monorepo::MonorepoConfig;
pub use pipeline::{ScaffoldOptions, ScaffoldProgress, ScaffoldReport, Scaffolder, Stage};
pub use registry::{RegistryClient, ResolvedDependency};
pub use runtime::{CapturedOutput, CommandSpec, OutputSink, PostProcessor, TerminalSink};
pub use templates::{GeneratedFiles, TemplateSource};

#[cfg(feature = "tui")]
pub use tui::run;
