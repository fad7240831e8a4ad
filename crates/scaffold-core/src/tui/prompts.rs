//! Charm-style CLI prompts using cliclack

use crate::answers::Answers;
use crate::error::ScaffoldError;
use crate::monorepo::MonorepoConfig;
use crate::pipeline::{ScaffoldOptions, ScaffoldProgress, Scaffolder, Stage};
use crate::registry::ResolvedDependency;
use crate::runtime::{check, CommandSpec, OutputSink, PostProcessor, Stream, TerminalSink};
use crate::templates::{GeneratedFiles, TemplateSource};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI arguments for the generate command
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Package name (the scope prefix may be included)
    pub name: Option<String>,

    /// Workspace directory to create the package in
    pub workspace: Option<String>,

    /// Space separated dependencies to add
    pub deps: Option<String>,

    /// Repository root (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Local directory with template overrides
    pub template_dir: Option<PathBuf>,

    /// Registry base URL override
    pub registry: Option<String>,

    /// Maximum concurrent registry lookups
    pub concurrency: Option<usize>,

    /// Per-lookup timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Skip install and format
    pub skip_install: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the generator with interactive prompts
pub async fn run<C: MonorepoConfig>(config: &C, args: GenerateArgs) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: Collect answers
    let root = resolve_root(&args)?;
    let answers = collect_answers(config, &args)?;

    // Step 2: Build the pipeline
    let scaffolder = Scaffolder::new(build_options(config, &args, root))?;

    // Step 3: Create, resolve and post-process
    let mut progress = TuiProgress::default();
    let report = scaffolder.run(answers, &mut progress).await?;

    // Step 4: Show next steps
    print_next_steps(config, &report.package_dir)?;

    Ok(())
}

fn resolve_root(args: &GenerateArgs) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let root = match &args.root {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    if !root.is_dir() {
        anyhow::bail!("Repository root does not exist: {}", root.display());
    }
    if !root.join("package.json").is_file() {
        cliclack::log::warning(format!(
            "No package.json found in {}; is this the repository root?",
            root.display()
        ))?;
    }

    Ok(root)
}

fn collect_answers<C: MonorepoConfig>(config: &C, args: &GenerateArgs) -> Result<Answers> {
    let prefix = config.scope_prefix();
    let default_workspace = config.default_workspace();

    let name = match &args.name {
        Some(name) => name.clone(),
        None if args.yes => {
            return Err(ScaffoldError::input("name", "--name is required with --yes").into());
        }
        None => cliclack::input(format!(
            "What is the name of the package? (You can skip the `{}` prefix)",
            prefix
        ))
        .placeholder("my-package")
        .validate(move |input: &String| {
            let mut answers = Answers::new(input.as_str(), default_workspace, "");
            answers.normalize(prefix);
            answers.validate().map_err(|e| e.to_string())
        })
        .interact()?,
    };

    let workspace = match &args.workspace {
        Some(workspace) => workspace.clone(),
        None if args.yes => default_workspace.to_string(),
        None => cliclack::input("Which workspace should the package be created in? (e.g. packages, apps)")
            .placeholder(default_workspace)
            .default_input(default_workspace)
            .validate(|input: &String| {
                Answers::new("package", input.as_str(), "")
                    .validate()
                    .map_err(|e| e.to_string())
            })
            .interact()?,
    };

    let deps = match &args.deps {
        Some(deps) => deps.clone(),
        None if args.yes => String::new(),
        None => cliclack::input("Enter a space separated list of dependencies you would like to install")
            .placeholder("zod date-fns")
            .required(false)
            .interact()?,
    };

    Ok(Answers::new(name, workspace, deps))
}

fn build_options<C: MonorepoConfig>(
    config: &C,
    args: &GenerateArgs,
    root: PathBuf,
) -> ScaffoldOptions {
    let mut options = ScaffoldOptions::for_config(config, root);
    options.templates = TemplateSource::from_dir(args.template_dir.clone());
    options.skip_post_process = args.skip_install;
    if let Some(registry) = &args.registry {
        options.registry_url = registry.clone();
    }
    if let Some(concurrency) = args.concurrency {
        options.concurrency = concurrency;
    }
    if let Some(secs) = args.timeout_secs {
        options.lookup_timeout = Duration::from_secs(secs);
    }
    options
}

/// Spinners and log lines for each pipeline stage
#[derive(Default)]
struct TuiProgress {
    spinner: Option<cliclack::ProgressBar>,
    files: Vec<PathBuf>,
    terminal: TerminalSink,
}

impl TuiProgress {
    fn start(&mut self, message: &str) {
        let spinner = cliclack::spinner();
        spinner.start(message);
        self.spinner = Some(spinner);
    }

    fn stop(&mut self, message: impl std::fmt::Display) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        }
    }
}

impl OutputSink for TuiProgress {
    fn started(&mut self, command: &CommandSpec) {
        self.terminal.started(command);
    }

    fn line(&mut self, stream: Stream, line: &str) {
        self.terminal.line(stream, line);
    }
}

impl ScaffoldProgress for TuiProgress {
    fn creating(&mut self, package_dir: &Path) {
        self.start(&format!("Creating package in {}...", package_dir.display()));
    }

    fn created(&mut self, files: &GeneratedFiles) {
        self.files = files.iter().map(Path::to_path_buf).collect();
        let dir = files.manifest.parent().unwrap_or(&files.manifest);
        self.stop(format!("Created {}", dir.display()));
    }

    fn resolving(&mut self, dependencies: &[&str]) {
        if dependencies.is_empty() {
            cliclack::log::info("No dependencies requested").ok();
        } else {
            self.start("Resolving dependency versions...");
        }
    }

    fn resolved(&mut self, dependencies: &[ResolvedDependency]) {
        let pinned: Vec<String> = dependencies
            .iter()
            .map(|dep| format!("{}@{}", dep.name, dep.range()))
            .collect();
        self.stop(format!("Dependencies: {}", pinned.join(", ")));
    }

    fn post_processing(&mut self, post_processor: &PostProcessor) {
        let program = &post_processor.install_command().program;
        let tool = check::check_tool(program);
        if tool.available {
            cliclack::log::success(format!(
                "{} installed ({})",
                tool.name,
                tool.version.as_deref().unwrap_or("unknown")
            ))
            .ok();
        } else {
            cliclack::log::warning(format!("{} was not found on PATH", program)).ok();
        }
    }

    fn post_process_skipped(&mut self) {
        cliclack::log::info("Skipping install and format").ok();
    }

    fn post_processed(&mut self) {
        cliclack::log::success("Workspace installed and formatted").ok();
    }

    fn failed(&mut self, stage: Stage, error: &ScaffoldError) {
        let summary = match stage {
            Stage::Create => "Failed to create package",
            Stage::Resolve => "Failed to resolve dependencies",
            Stage::PostProcess => "Failed to install and format the workspace",
        };
        self.stop(summary);
        cliclack::log::error(error.to_string()).ok();

        let written: Vec<String> = self.files.iter().map(|p| p.display().to_string()).collect();
        match stage {
            Stage::Create => {}
            Stage::Resolve => {
                cliclack::log::info(format!(
                    "Package files were left in place; the manifest was not modified:\n{}",
                    written.join("\n")
                ))
                .ok();
            }
            Stage::PostProcess => {
                cliclack::log::warning(format!(
                    "The package was scaffolded but not finalized. Generated files:\n{}",
                    written.join("\n")
                ))
                .ok();
            }
        }
    }
}

fn print_next_steps<C: MonorepoConfig>(config: &C, package_dir: &Path) -> Result<()> {
    let steps = config.next_steps(package_dir);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Package scaffolded")?;

    Ok(())
}
