//! Per-artifact outcomes and the run report.
//!
//! The rule table deciding what is fatal lives here: [`FileOperationOutcome::severity`]
//! classifies every artifact outcome, and [`GenerationError`] is the only way a
//! run can end early.

use serde_json::{json, Value};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use super::materialize::SkipReason;
use super::render::RenderError;
use crate::logging::{LogLevel, Logger};

/// Which part of the generated project an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Directory,
    StaticFile,
    ModelPage,
    ModelApiRoute,
    Auxiliary,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Directory => "directory",
            ArtifactKind::StaticFile => "static",
            ArtifactKind::ModelPage => "page",
            ArtifactKind::ModelApiRoute => "api_route",
            ArtifactKind::Auxiliary => "auxiliary",
        }
    }
}

/// Failure producing a single artifact. Never fatal on its own.
#[derive(Debug)]
pub enum ArtifactError {
    Io {
        /// What was being attempted ("copy", "write", "read template", ...)
        op: &'static str,
        source: io::Error,
    },
    Render(RenderError),
    /// A per-model worker thread panicked
    Worker(String),
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::Io { op, source } => write!(f, "{op} failed: {source}"),
            ArtifactError::Render(e) => write!(f, "{e}"),
            ArtifactError::Worker(msg) => write!(f, "model worker panicked: {msg}"),
        }
    }
}

impl std::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArtifactError::Io { source, .. } => Some(source),
            ArtifactError::Render(e) => Some(e),
            ArtifactError::Worker(_) => None,
        }
    }
}

/// What happened to one attempted artifact.
#[derive(Debug)]
pub enum FileOperationOutcome {
    Copied,
    Rendered,
    Skipped(SkipReason),
    Failed(ArtifactError),
}

/// How an outcome is treated by the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

impl FileOperationOutcome {
    /// Skips are warnings, failures are errors, and neither stops the run.
    pub fn severity(&self) -> Severity {
        match self {
            FileOperationOutcome::Copied | FileOperationOutcome::Rendered => Severity::Ok,
            FileOperationOutcome::Skipped(_) => Severity::Warning,
            FileOperationOutcome::Failed(_) => Severity::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.severity() == Severity::Ok
    }
}

impl fmt::Display for FileOperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOperationOutcome::Copied => f.write_str("copied"),
            FileOperationOutcome::Rendered => f.write_str("rendered"),
            FileOperationOutcome::Skipped(reason) => write!(f, "skipped ({reason})"),
            FileOperationOutcome::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// One artifact the generator attempted.
#[derive(Debug)]
pub struct ArtifactRecord {
    pub kind: ArtifactKind,
    /// Destination relative to the generated project root
    pub dest: PathBuf,
    /// Model this artifact belongs to, for per-model artifacts
    pub model: Option<String>,
    pub outcome: FileOperationOutcome,
}

impl ArtifactRecord {
    pub fn new(kind: ArtifactKind, dest: impl Into<PathBuf>, outcome: FileOperationOutcome) -> Self {
        Self {
            kind,
            dest: dest.into(),
            model: None,
            outcome,
        }
    }

    pub fn for_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Write this record to the generation log at the level its severity maps to.
    pub fn log(&self, logger: &Logger) {
        let level = match self.outcome.severity() {
            Severity::Ok => LogLevel::Info,
            Severity::Warning => LogLevel::Warn,
            Severity::Error => LogLevel::Error,
        };
        let mut meta = json!({
            "kind": self.kind.as_str(),
            "dest": self.dest.to_string_lossy(),
        });
        if let (Some(model), Value::Object(map)) = (&self.model, &mut meta) {
            map.insert("model".to_string(), Value::String(model.clone()));
        }
        let message = format!("{} {}", self.dest.display(), self.outcome);
        logger.log(level, &message, Some(&meta));
    }
}

/// Result of the optional styling step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylingOutcome {
    Disabled,
    Applied,
    Failed(String),
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct GenerationReport {
    /// Absolute path of the generated project
    pub target_dir: PathBuf,
    pub project_name: String,
    pub artifacts: Vec<ArtifactRecord>,
    pub styling: StylingOutcome,
}

impl GenerationReport {
    /// Successful artifacts of `kind`.
    pub fn produced(&self, kind: ArtifactKind) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.kind == kind && a.outcome.is_success())
            .count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.artifacts
            .iter()
            .filter(|a| a.outcome.severity() == Severity::Warning)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.artifacts
            .iter()
            .filter(|a| a.outcome.severity() == Severity::Error)
    }

    /// No skipped or failed artifact and styling did not fail.
    pub fn is_clean(&self) -> bool {
        self.artifacts.iter().all(|a| a.outcome.is_success())
            && !matches!(self.styling, StylingOutcome::Failed(_))
    }

    pub fn find(&self, dest: &Path) -> Option<&ArtifactRecord> {
        self.artifacts.iter().find(|a| a.dest == dest)
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} static, {} pages, {} api routes, {} config files; {} warnings, {} failures",
            self.produced(ArtifactKind::StaticFile),
            self.produced(ArtifactKind::ModelPage),
            self.produced(ArtifactKind::ModelApiRoute),
            self.produced(ArtifactKind::Auxiliary),
            self.warnings().count(),
            self.failures().count(),
        )
    }
}

/// Conditions that end a run before completion.
#[derive(Debug)]
pub enum GenerationError {
    /// Target exists and the caller did not allow reuse
    TargetExists(PathBuf),
    /// Target root could not be created
    CreateTarget { path: PathBuf, source: io::Error },
    /// Template root missing or unreadable
    TemplateRoot { path: PathBuf, source: io::Error },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::TargetExists(path) => write!(
                f,
                "output directory {} already exists; delete or rename it first",
                path.display()
            ),
            GenerationError::CreateTarget { path, source } => {
                write!(f, "cannot create output directory {}: {source}", path.display())
            }
            GenerationError::TemplateRoot { path, source } => {
                write!(f, "cannot read template root {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerationError::TargetExists(_) => None,
            GenerationError::CreateTarget { source, .. }
            | GenerationError::TemplateRoot { source, .. } => Some(source),
        }
    }
}
