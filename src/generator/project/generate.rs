use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use super::styling::StylingStep;
use crate::generator::layout::{
    is_reserved_model_name, model_page_dir, model_route_dir, model_source, AUXILIARY_TEMPLATES,
    MODEL_PAGE_FILE, MODEL_ROUTE_FILE, MODEL_TEMPLATES, SKELETON_DIRS, STATIC_FILES,
};
use crate::generator::materialize::{
    copy_file, ensure_dir, read_template, write_file, CopyOutcome, SkipReason,
};
use crate::generator::paths::{absolutize, is_single_segment, relative_import_path};
use crate::generator::render::{TemplateContext, TemplateRenderer};
use crate::generator::report::{
    ArtifactError, ArtifactKind, ArtifactRecord, FileOperationOutcome, GenerationError,
    GenerationReport, StylingOutcome,
};
use crate::logging::Logger;

/// Name used when the target path has no final component
const FALLBACK_PROJECT_NAME: &str = "admin-panel";

/// What to generate and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Directory the admin panel is written into
    pub target_dir: PathBuf,
    /// Ordered, unique model names
    pub model_names: Vec<String>,
    /// Root of the host project (the directory containing `models/`)
    pub source_root: PathBuf,
}

impl GenerationRequest {
    /// Build a request, dropping repeated model names while keeping first-seen order.
    pub fn new(
        target_dir: impl Into<PathBuf>,
        model_names: impl IntoIterator<Item = impl Into<String>>,
        source_root: impl Into<PathBuf>,
    ) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for name in model_names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            target_dir: target_dir.into(),
            model_names: unique,
            source_root: source_root.into(),
        }
    }
}

/// How to generate.
pub struct GenerateOptions<'a> {
    /// Root holding the static files and templates
    pub templates_dir: PathBuf,
    /// Write into an existing target directory instead of refusing
    pub allow_existing: bool,
    /// Render models on scoped threads
    pub parallel_models: bool,
    /// Post-generation styling step; `None` skips it
    pub styling: Option<&'a dyn StylingStep>,
}

impl<'a> GenerateOptions<'a> {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            allow_existing: false,
            parallel_models: false,
            styling: None,
        }
    }

    pub fn with_styling(mut self, step: &'a dyn StylingStep) -> Self {
        self.styling = Some(step);
        self
    }

    pub fn allow_existing(mut self, allow: bool) -> Self {
        self.allow_existing = allow;
        self
    }

    pub fn parallel_models(mut self, parallel: bool) -> Self {
        self.parallel_models = parallel;
        self
    }
}

/// Generate an admin panel for `request`.
///
/// Runs every step to completion and records each artifact's outcome in the
/// returned report (and the generation log). Missing templates and failed
/// writes only affect their own artifact.
///
/// # Errors
///
/// Fails before writing anything if the target already exists (unless
/// allowed) or the template root cannot be read, and fails immediately if the
/// target root cannot be created.
pub fn generate_project(
    request: &GenerationRequest,
    options: &GenerateOptions<'_>,
    logger: &Logger,
) -> Result<GenerationReport, GenerationError> {
    let target = absolutize(&request.target_dir);
    let source_root = absolutize(&request.source_root);
    let templates = absolutize(&options.templates_dir);
    let project_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string());

    logger.info(
        "generation started",
        Some(json!({
            "target": target.to_string_lossy(),
            "templates": templates.to_string_lossy(),
            "models": request.model_names,
        })),
    );

    if !options.allow_existing && target.exists() {
        let err = GenerationError::TargetExists(target);
        logger.error(err.to_string(), None);
        return Err(err);
    }
    if let Err(source) = fs::read_dir(&templates) {
        let err = GenerationError::TemplateRoot {
            path: templates,
            source,
        };
        logger.error(err.to_string(), None);
        return Err(err);
    }
    if let Err(source) = ensure_dir(&target) {
        let err = GenerationError::CreateTarget {
            path: target,
            source,
        };
        logger.error(err.to_string(), None);
        return Err(err);
    }

    let generator = Generator {
        target: &target,
        templates: &templates,
        renderer: TemplateRenderer::new(),
        logger,
    };
    let mut artifacts = Vec::new();

    generator.ensure_skeleton(&mut artifacts);
    generator.copy_static_files(&mut artifacts);

    let context = TemplateContext::project(
        project_name.clone(),
        &request.model_names,
        source_root.to_string_lossy(),
    );
    if options.parallel_models {
        generator.render_models_parallel(&request.model_names, &source_root, &context, &mut artifacts);
    } else {
        for model in &request.model_names {
            artifacts.extend(generator.render_model(model, &source_root, &context));
        }
    }

    generator.render_auxiliary(&context, &mut artifacts);

    let styling = match options.styling {
        None => {
            logger.info("styling setup disabled", None);
            StylingOutcome::Disabled
        }
        Some(step) => match step.apply(&target) {
            Ok(()) => {
                logger.info(format!("styling setup '{}' completed", step.name()), None);
                StylingOutcome::Applied
            }
            Err(e) => {
                logger.error(
                    format!("styling setup '{}' failed", step.name()),
                    Some(json!(e.to_string())),
                );
                StylingOutcome::Failed(e.to_string())
            }
        },
    };

    let report = GenerationReport {
        target_dir: target,
        project_name,
        artifacts,
        styling,
    };
    logger.info(format!("generation finished: {report}"), None);
    Ok(report)
}

/// Upper bound on concurrent model threads.
fn model_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

struct Generator<'a> {
    target: &'a Path,
    templates: &'a Path,
    renderer: TemplateRenderer,
    logger: &'a Logger,
}

impl Generator<'_> {
    fn record(&self, out: &mut Vec<ArtifactRecord>, record: ArtifactRecord) {
        record.log(self.logger);
        out.push(record);
    }

    fn ensure_skeleton(&self, out: &mut Vec<ArtifactRecord>) {
        for dir in SKELETON_DIRS {
            if let Err(source) = ensure_dir(&self.target.join(dir)) {
                let outcome = FileOperationOutcome::Failed(ArtifactError::Io {
                    op: "create directory",
                    source,
                });
                self.record(out, ArtifactRecord::new(ArtifactKind::Directory, *dir, outcome));
            }
        }
    }

    fn copy_static_files(&self, out: &mut Vec<ArtifactRecord>) {
        for entry in STATIC_FILES {
            let src = self.templates.join(entry.source);
            let dst = self.target.join(entry.dest);
            let outcome = match copy_file(&src, &dst, true) {
                Ok(CopyOutcome::Copied) => FileOperationOutcome::Copied,
                Ok(CopyOutcome::Skipped(reason)) => FileOperationOutcome::Skipped(reason),
                Err(source) => FileOperationOutcome::Failed(ArtifactError::Io { op: "copy", source }),
            };
            self.record(out, ArtifactRecord::new(ArtifactKind::StaticFile, entry.dest, outcome));
        }
    }

    /// Page and API route for one model. Records are logged as they are made.
    fn render_model(
        &self,
        model: &str,
        source_root: &Path,
        project: &TemplateContext,
    ) -> Vec<ArtifactRecord> {
        let mut out = Vec::with_capacity(2);
        let page_rel = Path::new("app").join("admin").join(model).join(MODEL_PAGE_FILE);
        let route_rel = Path::new("app")
            .join("api")
            .join("admin")
            .join(model)
            .join(MODEL_ROUTE_FILE);

        let rejected = if !is_single_segment(model) {
            Some(SkipReason::InvalidModelName)
        } else if is_reserved_model_name(model) {
            Some(SkipReason::ReservedModelName)
        } else {
            None
        };
        if let Some(reason) = rejected {
            for (kind, rel) in [
                (ArtifactKind::ModelPage, page_rel),
                (ArtifactKind::ModelApiRoute, route_rel),
            ] {
                let outcome = FileOperationOutcome::Skipped(reason);
                self.record(&mut out, ArtifactRecord::new(kind, rel, outcome).for_model(model));
            }
            return out;
        }

        let source = model_source(source_root, model);
        let targets = [
            (
                ArtifactKind::ModelPage,
                MODEL_TEMPLATES.page,
                model_page_dir(self.target, model),
                page_rel,
            ),
            (
                ArtifactKind::ModelApiRoute,
                MODEL_TEMPLATES.api_route,
                model_route_dir(self.target, model),
                route_rel,
            ),
        ];
        for (kind, template, dir, rel) in targets {
            let outcome = match ensure_dir(&dir) {
                Ok(()) => {
                    let ctx = project.for_model(model, relative_import_path(&dir, &source));
                    self.render_into(template, &self.target.join(&rel), &ctx)
                }
                Err(source) => FileOperationOutcome::Failed(ArtifactError::Io {
                    op: "create directory",
                    source,
                }),
            };
            self.record(&mut out, ArtifactRecord::new(kind, rel, outcome).for_model(model));
        }
        out
    }

    /// Models are rendered in batches of `model_workers()` scoped threads.
    /// Results are collected in request order.
    fn render_models_parallel(
        &self,
        models: &[String],
        source_root: &Path,
        project: &TemplateContext,
        out: &mut Vec<ArtifactRecord>,
    ) {
        for batch in models.chunks(model_workers()) {
            thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|model| {
                        let handle =
                            scope.spawn(move || self.render_model(model, source_root, project));
                        (model, handle)
                    })
                    .collect();
                for (model, handle) in handles {
                    match handle.join() {
                        Ok(records) => out.extend(records),
                        Err(panic) => {
                            let msg = panic
                                .downcast_ref::<&str>()
                                .map(|s| s.to_string())
                                .or_else(|| panic.downcast_ref::<String>().cloned())
                                .unwrap_or_else(|| "unknown panic".to_string());
                            let outcome = FileOperationOutcome::Failed(ArtifactError::Worker(msg));
                            let rel = Path::new("app").join("admin").join(model.as_str());
                            self.record(
                                out,
                                ArtifactRecord::new(ArtifactKind::ModelPage, rel, outcome)
                                    .for_model(model),
                            );
                        }
                    }
                }
            });
        }
    }

    fn render_auxiliary(&self, context: &TemplateContext, out: &mut Vec<ArtifactRecord>) {
        for aux in AUXILIARY_TEMPLATES {
            let outcome = self.render_into(aux.source, &self.target.join(aux.dest), context);
            self.record(out, ArtifactRecord::new(ArtifactKind::Auxiliary, aux.dest, outcome));
        }
    }

    /// Read `template` from the template root, render it and write `dest`.
    fn render_into(&self, template: &str, dest: &Path, ctx: &TemplateContext) -> FileOperationOutcome {
        let text = match read_template(&self.templates.join(template)) {
            Ok(Some(text)) => text,
            Ok(None) => return FileOperationOutcome::Skipped(SkipReason::MissingTemplate),
            Err(source) => {
                return FileOperationOutcome::Failed(ArtifactError::Io {
                    op: "read template",
                    source,
                })
            }
        };
        let rendered = match self.renderer.render(template, &text, ctx) {
            Ok(rendered) => rendered,
            Err(e) => return FileOperationOutcome::Failed(ArtifactError::Render(e)),
        };
        match write_file(dest, &rendered) {
            Ok(()) => FileOperationOutcome::Rendered,
            Err(source) => FileOperationOutcome::Failed(ArtifactError::Io { op: "write", source }),
        }
    }
}
