//! The scaffolding pipeline
//!
//! Stages run strictly in order and each one short-circuits the rest on
//! failure:
//!
//! 1. normalize and validate the answers
//! 2. materialize the package templates
//! 3. resolve dependency versions and patch the manifest
//! 4. install and format the workspace
//!
//! Files written by earlier stages stay on disk when a later stage fails.

use crate::answers::Answers;
use crate::config::PackageManager;
use crate::error::{Result, ScaffoldError};
use crate::manifest::PackageManifest;
use crate::monorepo::MonorepoConfig;
use crate::registry::{RegistryClient, ResolvedDependency, DEFAULT_CONCURRENCY, DEFAULT_LOOKUP_TIMEOUT};
use crate::runtime::{CapturedOutput, OutputSink, PostProcessor};
use crate::templates::{self, GeneratedFiles, TemplateSource};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for one scaffolding run
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    /// Repository root; generated paths and commands are relative to it
    pub root: PathBuf,

    /// Prefix stripped from package names
    pub scope_prefix: String,

    /// Where the package templates come from
    pub templates: TemplateSource,

    /// Registry base URL
    pub registry_url: String,

    /// User agent for registry requests
    pub user_agent: String,

    /// Maximum concurrent registry lookups
    pub concurrency: usize,

    /// Timeout for a single registry lookup
    pub lookup_timeout: Duration,

    /// Skip the install/format stage
    pub skip_post_process: bool,
}

impl ScaffoldOptions {
    /// Defaults taken from a monorepo configuration
    pub fn for_config<C: MonorepoConfig>(config: &C, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            scope_prefix: config.scope_prefix().to_string(),
            templates: TemplateSource::Builtin,
            registry_url: config.registry_url(),
            user_agent: config.user_agent().to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            skip_post_process: false,
        }
    }
}

/// A pipeline stage, as reported to [`ScaffoldProgress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Create,
    Resolve,
    PostProcess,
}

/// Observes a [`Scaffolder::run`] as it moves through the stages
///
/// Command output from the post-processing stage goes through the
/// [`OutputSink`] half. Every hook defaults to doing nothing.
pub trait ScaffoldProgress: OutputSink {
    fn creating(&mut self, _package_dir: &Path) {}

    fn created(&mut self, _files: &GeneratedFiles) {}

    /// `dependencies` is empty when nothing was requested
    fn resolving(&mut self, _dependencies: &[&str]) {}

    fn resolved(&mut self, _dependencies: &[ResolvedDependency]) {}

    fn post_processing(&mut self, _post_processor: &PostProcessor) {}

    /// Called instead of `post_processing` when the stage is turned off
    fn post_process_skipped(&mut self) {}

    fn post_processed(&mut self) {}

    /// The stage that stopped the run
    fn failed(&mut self, _stage: Stage, _error: &ScaffoldError) {}
}

impl ScaffoldProgress for CapturedOutput {}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    pub answers: Answers,
    pub package_dir: PathBuf,
    pub files: GeneratedFiles,
    pub dependencies: Vec<ResolvedDependency>,
    pub post_processed: bool,
}

/// Runs the scaffolding stages against one repository
pub struct Scaffolder {
    options: ScaffoldOptions,
    registry: RegistryClient,
    post_processor: PostProcessor,
}

impl Scaffolder {
    /// Build a scaffolder; the package manager is detected from the root lockfile
    pub fn new(options: ScaffoldOptions) -> anyhow::Result<Self> {
        let registry = RegistryClient::new(
            &options.registry_url,
            &options.user_agent,
            options.lookup_timeout,
        )?;
        let package_manager = PackageManager::detect(&options.root);
        tracing::debug!(%package_manager, root = %options.root.display(), "detected package manager");
        let post_processor = PostProcessor::for_package_manager(&options.root, package_manager);

        Ok(Self {
            options,
            registry,
            post_processor,
        })
    }

    /// Replace the install/format commands
    pub fn with_post_processor(mut self, post_processor: PostProcessor) -> Self {
        self.post_processor = post_processor;
        self
    }

    /// Strip the scope prefix and validate the answers
    pub fn prepare(&self, mut answers: Answers) -> Result<Answers> {
        answers.normalize(&self.options.scope_prefix);
        answers.validate()?;
        Ok(answers)
    }

    /// Directory the package will be generated into
    pub fn package_dir(&self, answers: &Answers) -> PathBuf {
        answers.package_dir(&self.options.root)
    }

    /// Write the manifest, type config and entry point
    pub async fn materialize(&self, answers: &Answers) -> Result<GeneratedFiles> {
        let package_dir = self.package_dir(answers);
        templates::materialize(&self.options.templates, answers, &package_dir).await
    }

    /// Resolve the requested dependencies and rewrite the manifest
    ///
    /// The manifest is parsed even when no dependencies were requested, but
    /// it is only rewritten once every lookup has succeeded.
    pub async fn resolve_dependencies(
        &self,
        answers: &Answers,
        manifest_path: &Path,
    ) -> Result<Vec<ResolvedDependency>> {
        let mut manifest = PackageManifest::load(manifest_path).await?;

        let tokens = answers.dependency_tokens();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let resolved = self
            .registry
            .resolve_all(&tokens, self.options.concurrency)
            .await?;
        manifest.merge_dependencies(&resolved);
        manifest.save().await?;

        Ok(resolved)
    }

    /// Install and format the whole workspace
    pub async fn post_process(&self, sink: &mut dyn OutputSink) -> Result<()> {
        self.post_processor.run(sink).await
    }

    /// Run every stage in order, reporting progress along the way
    pub async fn run<P: ScaffoldProgress>(
        &self,
        answers: Answers,
        progress: &mut P,
    ) -> Result<ScaffoldReport> {
        let answers = self.prepare(answers)?;
        let package_dir = self.package_dir(&answers);

        progress.creating(&package_dir);
        let files = self
            .materialize(&answers)
            .await
            .inspect_err(|e| progress.failed(Stage::Create, e))?;
        progress.created(&files);
        tracing::info!(dir = %package_dir.display(), "package files created");

        progress.resolving(&answers.dependency_tokens());
        let dependencies = self
            .resolve_dependencies(&answers, &files.manifest)
            .await
            .inspect_err(|e| progress.failed(Stage::Resolve, e))?;
        progress.resolved(&dependencies);
        tracing::info!(count = dependencies.len(), "dependencies resolved");

        let post_processed = !self.options.skip_post_process;
        if post_processed {
            progress.post_processing(&self.post_processor);
            self.post_process(&mut *progress)
                .await
                .inspect_err(|e| progress.failed(Stage::PostProcess, e))?;
            progress.post_processed();
        } else {
            progress.post_process_skipped();
        }

        Ok(ScaffoldReport {
            answers,
            package_dir,
            files,
            dependencies,
            post_processed,
        })
    }
}
