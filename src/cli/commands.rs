use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{GeneratorConfig, MODELS_DIR_NAME};
use crate::discovery::{discover_models, DiscoveryError};
use crate::generator::{
    generate_project, GenerateOptions, GenerationRequest, StylingOutcome, StylingStep,
    TailwindSetup,
};
use crate::logging::Logger;

/// Command-line interface for the admin panel generator
#[derive(Parser)]
#[command(name = "adminpanel-gen")]
#[command(about = "Scaffold a Next.js admin panel for a project's models", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate the admin panel next to the project's models directory
    Generate {
        /// Project root containing the `models` directory (default: current directory)
        #[arg(long)]
        project_root: Option<PathBuf>,

        /// Name of the output directory inside the project root
        #[arg(short, long)]
        output: Option<String>,

        /// Template root [default: templates/admin-panel next to the executable,
        /// then ../share/adminpanel/templates/admin-panel, then the build checkout;
        /// ADMINPANEL_TEMPLATES also sets it]
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// Config file (default: adminpanel.toml in the project root, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the Tailwind CSS install step
        #[arg(long, default_value_t = false)]
        skip_styling: bool,

        /// Render models on parallel threads
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// List the models that would be generated
    Models {
        /// Project root containing the `models` directory (default: current directory)
        #[arg(long)]
        project_root: Option<PathBuf>,

        /// Config file (default: adminpanel.toml in the project root, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// A condition that stops the CLI before anything is written.
#[derive(Debug)]
pub enum PreconditionError {
    MissingModelsDir(PathBuf),
    UnreadableModelsDir { path: PathBuf, reason: String },
    NoModels(PathBuf),
    OutputExists(PathBuf),
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreconditionError::MissingModelsDir(path) => {
                write!(f, "no models directory found at {}", path.display())
            }
            PreconditionError::UnreadableModelsDir { path, reason } => {
                write!(f, "cannot read models directory {}: {reason}", path.display())
            }
            PreconditionError::NoModels(path) => {
                write!(f, "no models found inside {}", path.display())
            }
            PreconditionError::OutputExists(path) => write!(
                f,
                "\"{}\" already exists. Delete or rename it first.",
                path.display()
            ),
        }
    }
}

impl std::error::Error for PreconditionError {}

/// Inputs for a generation run that passed every precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preflight {
    pub models: Vec<String>,
    pub output_dir: PathBuf,
}

/// Discover models and check that the output directory is free.
///
/// Reads only; nothing is created when a check fails.
///
/// # Errors
///
/// Returns the first failing [`PreconditionError`], in the order: models
/// directory missing, no models, output directory exists.
pub fn check_preconditions(
    project_root: &Path,
    config: &GeneratorConfig,
) -> Result<Preflight, PreconditionError> {
    let models_dir = project_root.join(MODELS_DIR_NAME);
    let models = discover_models(&models_dir, &config.model_extensions).map_err(|e| match e {
        DiscoveryError::MissingDir(path) => PreconditionError::MissingModelsDir(path),
        DiscoveryError::Read { path, source } => PreconditionError::UnreadableModelsDir {
            path,
            reason: source.to_string(),
        },
    })?;
    if models.is_empty() {
        return Err(PreconditionError::NoModels(models_dir));
    }
    let output_dir = project_root.join(&config.output_name);
    if output_dir.exists() {
        return Err(PreconditionError::OutputExists(output_dir));
    }
    Ok(Preflight { models, output_dir })
}

fn project_root_or_cwd(project_root: Option<&Path>) -> anyhow::Result<PathBuf> {
    let root = match project_root {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    Ok(crate::generator::absolutize(&root))
}

/// Parse arguments from the process and run the selected command.
///
/// # Errors
///
/// Returns an error for failed preconditions, unreadable configuration and
/// unrecoverable generation failures. Soft failures are only reported.
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

/// Run an already parsed command line.
///
/// # Errors
///
/// See [`run_cli`].
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            project_root,
            output,
            templates,
            config,
            skip_styling,
            parallel,
        } => {
            let root = project_root_or_cwd(project_root.as_deref())?;
            let mut settings = GeneratorConfig::resolve(&root, config.as_deref())?;
            if let Some(output) = output {
                settings.output_name = output;
            }
            if let Some(templates) = templates {
                settings.templates_dir = Some(templates);
            }
            settings.skip_styling |= skip_styling;
            settings.parallel_models |= parallel;

            let preflight = check_preconditions(&root, &settings)?;
            println!(
                "📦 Generating admin panel for {} model(s): {}",
                preflight.models.len(),
                preflight.models.join(", ")
            );

            let logger = Logger::to_dir(settings.log_dir(&root));
            let tailwind =
                TailwindSetup::new(settings.npm_bin.clone()).with_timeout(settings.styling_timeout());
            let mut options = GenerateOptions::new(settings.templates_dir())
                .parallel_models(settings.parallel_models);
            if !settings.skip_styling {
                options = options.with_styling(&tailwind as &dyn StylingStep);
            }
            let request = GenerationRequest::new(&preflight.output_dir, preflight.models, &root);

            let result = generate_project(&request, &options, &logger);
            logger.flush();
            let report = result?;

            for record in report.warnings().chain(report.failures()) {
                println!("⚠️  {} {}", record.dest.display(), record.outcome);
            }
            if let StylingOutcome::Failed(reason) = &report.styling {
                println!("⚠️  Tailwind setup failed: {reason}");
            }
            println!("✅ Generated {} ({report})", report.target_dir.display());
            println!(
                "   cd {} && npm install && npm run dev",
                settings.output_name
            );
            Ok(())
        }
        Commands::Models {
            project_root,
            config,
        } => {
            let root = project_root_or_cwd(project_root.as_deref())?;
            let settings = GeneratorConfig::resolve(&root, config.as_deref())?;
            let models_dir = root.join(MODELS_DIR_NAME);
            let models = discover_models(&models_dir, &settings.model_extensions)?;
            for model in &models {
                println!("{model}");
            }
            Ok(())
        }
    }
}
