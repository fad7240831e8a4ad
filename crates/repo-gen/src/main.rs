//! repo-gen - Package scaffolding for Turborepo/pnpm monorepos

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use scaffold_core::tui::GenerateArgs;
use scaffold_core::MonorepoConfig;
use std::path::{Path, PathBuf};

/// Turborepo monorepo configuration
#[derive(Clone)]
pub struct TurboRepoConfig;

impl MonorepoConfig for TurboRepoConfig {
    fn name(&self) -> &'static str {
        "repo-gen"
    }

    fn display_name(&self) -> &'static str {
        "Generate a new package"
    }

    fn scope_prefix(&self) -> &'static str {
        "@repo/"
    }

    fn default_workspace(&self) -> &'static str {
        "packages"
    }

    fn default_registry_url(&self) -> &'static str {
        "https://registry.npmjs.org"
    }

    fn registry_url_env(&self) -> &'static str {
        "REPO_GEN_REGISTRY_URL"
    }

    fn next_steps(&self, dir: &Path) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: cd to the package if not already there
        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }

        // Step 2: Start writing code
        steps.push("Edit src/index.ts to get started".to_string());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "repo-gen")]
#[command(about = "CLI for scaffolding packages inside a Turborepo/pnpm monorepo")]
#[command(version)]
pub struct Args {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new package
    Init(CliGenerateArgs),
}

#[derive(Parser, Debug)]
pub struct CliGenerateArgs {
    /// Package name (the `@repo/` prefix is optional)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Workspace to create the package in (e.g. packages, apps)
    #[arg(short, long)]
    pub workspace: Option<String>,

    /// Space separated list of dependencies to add
    #[arg(short, long)]
    pub deps: Option<String>,

    /// Repository root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Local directory with package.json.hbs / tsconfig.json.hbs overrides
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Package registry base URL (overrides REPO_GEN_REGISTRY_URL)
    #[arg(long)]
    pub registry: Option<String>,

    /// Maximum concurrent registry lookups
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=64))]
    pub concurrency: Option<u16>,

    /// Timeout for each registry lookup, in seconds
    #[arg(long = "timeout-secs", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Skip the workspace install and format commands
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliGenerateArgs> for GenerateArgs {
    fn from(args: CliGenerateArgs) -> Self {
        GenerateArgs {
            name: args.name,
            workspace: args.workspace,
            deps: args.deps,
            root: args.root,
            template_dir: args.template_dir,
            registry: args.registry,
            concurrency: args.concurrency.map(usize::from),
            timeout_secs: args.timeout_secs,
            skip_install: args.skip_install,
            yes: args.yes,
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbose >= 2))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose);
    let config = TurboRepoConfig;

    // No subcommand provided, default to interactive init
    let generate_args = match args.command {
        Some(Command::Init(init_args)) => init_args.into(),
        None => GenerateArgs::default(),
    };

    let result = scaffold_core::run(&config, generate_args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
