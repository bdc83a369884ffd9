#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::logging::{LogLevel, Logger};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Minimal template root: every static file, both model templates and the
/// project templates.
fn fixture_templates(root: &Path) -> PathBuf {
    let tpl = root.join("templates");
    for entry in STATIC_FILES {
        write_file(&tpl.join(entry.source), &format!("static {}\n", entry.source)).unwrap();
    }
    write_file(
        &tpl.join(MODEL_TEMPLATES.page),
        "page {{ modelName }} from {{ modelImportPath }}\n",
    )
    .unwrap();
    write_file(
        &tpl.join(MODEL_TEMPLATES.api_route),
        "route {{ modelName }} from {{ modelImportPath }}\n",
    )
    .unwrap();
    for aux in AUXILIARY_TEMPLATES {
        write_file(
            &tpl.join(aux.source),
            "{{ projectName }}:{% for m in models %}{{ m }};{% endfor %}\n",
        )
        .unwrap();
    }
    tpl
}

struct FakeStyling {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeStyling {
    fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: AtomicUsize::new(0),
        }
    }
}

impl StylingStep for FakeStyling {
    fn name(&self) -> &str {
        "fake"
    }

    fn apply(&self, project_dir: &Path) -> Result<(), StylingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(project_dir.join("package.json").exists());
        if self.fail {
            Err(StylingError::Timeout {
                program: "fake".to_string(),
                limit: Duration::from_secs(1),
            })
        } else {
            Ok(())
        }
    }
}

#[test]
fn test_generates_every_artifact_for_each_model() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let target = dir.path().join("admin-panel");
    let (logger, sink) = Logger::in_memory();

    let request = GenerationRequest::new(&target, ["User", "Post"], dir.path());
    let report = generate_project(&request, &GenerateOptions::new(&tpl), &logger).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.produced(ArtifactKind::StaticFile), STATIC_FILES.len());
    assert_eq!(report.produced(ArtifactKind::ModelPage), 2);
    assert_eq!(report.produced(ArtifactKind::ModelApiRoute), 2);
    assert_eq!(report.produced(ArtifactKind::Auxiliary), AUXILIARY_TEMPLATES.len());
    assert_eq!(report.project_name, "admin-panel");
    assert_eq!(report.styling, StylingOutcome::Disabled);

    for dir_name in SKELETON_DIRS {
        assert!(target.join(dir_name).is_dir(), "missing {dir_name}");
    }
    assert_eq!(
        fs::read_to_string(target.join("app/admin/User/page.js")).unwrap(),
        "page User from ../../../../models/User\n"
    );
    assert_eq!(
        fs::read_to_string(target.join("app/api/admin/Post/route.js")).unwrap(),
        "route Post from ../../../../../models/Post\n"
    );
    assert_eq!(
        fs::read_to_string(target.join("package.json")).unwrap(),
        "admin-panel:User;Post;\n"
    );
    assert!(sink.contains(LogLevel::Info, "generation finished"));
    assert!(sink.lines_at(LogLevel::Warn).is_empty());
}

#[test]
fn test_missing_model_template_only_warns() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    fs::remove_file(tpl.join(MODEL_TEMPLATES.api_route)).unwrap();
    let target = dir.path().join("out");
    let (logger, sink) = Logger::in_memory();

    let request = GenerationRequest::new(&target, ["User"], dir.path());
    let report = generate_project(&request, &GenerateOptions::new(&tpl), &logger).unwrap();

    assert!(target.join("app/admin/User/page.js").exists());
    assert!(!target.join("app/api/admin/User/route.js").exists());
    assert!(target.join("app/api/admin/User").is_dir());

    let record = report
        .find(Path::new("app/api/admin/User/route.js"))
        .expect("route record");
    assert!(matches!(
        record.outcome,
        FileOperationOutcome::Skipped(SkipReason::MissingTemplate)
    ));
    assert_eq!(record.model.as_deref(), Some("User"));
    assert_eq!(report.warnings().count(), 1);
    assert_eq!(report.failures().count(), 0);
    assert!(sink.contains(LogLevel::Warn, "route.js"));
}

#[test]
fn test_missing_static_source_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    fs::remove_file(tpl.join("public/favicon.svg")).unwrap();
    let (logger, _sink) = Logger::in_memory();

    let request = GenerationRequest::new(dir.path().join("out"), ["User"], dir.path());
    let report = generate_project(&request, &GenerateOptions::new(&tpl), &logger).unwrap();

    assert_eq!(report.produced(ArtifactKind::StaticFile), STATIC_FILES.len() - 1);
    let record = report.find(Path::new("public/favicon.svg")).unwrap();
    assert!(matches!(
        record.outcome,
        FileOperationOutcome::Skipped(SkipReason::MissingSource)
    ));
}

#[test]
fn test_render_error_is_soft() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    fs::write(tpl.join("gitignore.j2"), "{% for %}\n").unwrap();
    let (logger, sink) = Logger::in_memory();

    let request = GenerationRequest::new(dir.path().join("out"), ["User"], dir.path());
    let report = generate_project(&request, &GenerateOptions::new(&tpl), &logger).unwrap();

    let record = report.find(Path::new(".gitignore")).unwrap();
    assert!(matches!(
        record.outcome,
        FileOperationOutcome::Failed(ArtifactError::Render(_))
    ));
    assert_eq!(report.produced(ArtifactKind::Auxiliary), AUXILIARY_TEMPLATES.len() - 1);
    assert!(!sink.lines_at(LogLevel::Error).is_empty());
}

#[test]
fn test_existing_target_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let target = dir.path().join("out");
    fs::create_dir(&target).unwrap();
    let (logger, _sink) = Logger::in_memory();

    let request = GenerationRequest::new(&target, ["User"], dir.path());
    let err = generate_project(&request, &GenerateOptions::new(&tpl), &logger).unwrap_err();
    assert!(matches!(err, GenerationError::TargetExists(_)));
    assert!(fs::read_dir(&target).unwrap().next().is_none());

    let report = generate_project(
        &request,
        &GenerateOptions::new(&tpl).allow_existing(true),
        &logger,
    )
    .unwrap();
    assert!(report.is_clean());
}

#[test]
fn test_missing_template_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out");
    let (logger, sink) = Logger::in_memory();

    let request = GenerationRequest::new(&target, ["User"], dir.path());
    let err = generate_project(
        &request,
        &GenerateOptions::new(dir.path().join("no-templates")),
        &logger,
    )
    .unwrap_err();
    assert!(matches!(err, GenerationError::TemplateRoot { .. }));
    assert!(!target.exists());
    assert!(sink.contains(LogLevel::Error, "template root"));
}

#[test]
fn test_invalid_model_name_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let target = dir.path().join("out");
    let (logger, _sink) = Logger::in_memory();

    let request = GenerationRequest::new(&target, ["../escape", "User"], dir.path());
    let report = generate_project(&request, &GenerateOptions::new(&tpl), &logger).unwrap();

    assert_eq!(report.produced(ArtifactKind::ModelPage), 1);
    let skipped: Vec<_> = report
        .warnings()
        .filter(|r| r.model.as_deref() == Some("../escape"))
        .collect();
    assert_eq!(skipped.len(), 2);
    assert!(!dir.path().join("escape").exists());
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let models = ["Alpha", "Beta", "Gamma", "Delta"];
    let (logger, _sink) = Logger::in_memory();

    let seq = generate_project(
        &GenerationRequest::new(dir.path().join("seq"), models, dir.path()),
        &GenerateOptions::new(&tpl),
        &logger,
    )
    .unwrap();
    let par = generate_project(
        &GenerationRequest::new(dir.path().join("par"), models, dir.path()),
        &GenerateOptions::new(&tpl).parallel_models(true),
        &logger,
    )
    .unwrap();

    let dests = |r: &GenerationReport| r.artifacts.iter().map(|a| a.dest.clone()).collect::<Vec<_>>();
    assert_eq!(dests(&seq), dests(&par));
    for model in models {
        let rel = format!("app/admin/{model}/page.js");
        assert_eq!(
            fs::read(dir.path().join("seq").join(&rel)).unwrap(),
            fs::read(dir.path().join("par").join(&rel)).unwrap()
        );
    }
}

#[test]
fn test_styling_failure_is_recorded_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let styling = FakeStyling::new(true);
    let (logger, sink) = Logger::in_memory();

    let request = GenerationRequest::new(dir.path().join("out"), ["User"], dir.path());
    let report = generate_project(
        &request,
        &GenerateOptions::new(&tpl).with_styling(&styling),
        &logger,
    )
    .unwrap();

    assert_eq!(styling.calls.load(Ordering::SeqCst), 1);
    assert!(matches!(report.styling, StylingOutcome::Failed(_)));
    assert!(!report.is_clean());
    assert!(sink.contains(LogLevel::Error, "styling setup 'fake' failed"));
}

#[test]
fn test_styling_success() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let styling = FakeStyling::new(false);
    let (logger, _sink) = Logger::in_memory();

    let request = GenerationRequest::new(dir.path().join("out"), ["User"], dir.path());
    let report = generate_project(
        &request,
        &GenerateOptions::new(&tpl).with_styling(&styling),
        &logger,
    )
    .unwrap();
    assert_eq!(report.styling, StylingOutcome::Applied);
    assert!(report.is_clean());
}

#[test]
fn test_request_dedupes_in_order() {
    let request = GenerationRequest::new("/t", ["User", "Post", "User"], "/");
    assert_eq!(request.model_names, vec!["User".to_string(), "Post".to_string()]);
}

#[test]
fn test_report_display() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let (logger, _sink) = Logger::in_memory();
    let request = GenerationRequest::new(dir.path().join("out"), ["User"], dir.path());
    let report = generate_project(&request, &GenerateOptions::new(&tpl), &logger).unwrap();
    assert_eq!(
        report.to_string(),
        "10 static, 1 pages, 1 api routes, 4 config files; 0 warnings, 0 failures"
    );
}

#[test]
fn test_model_named_like_static_page_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let target = dir.path().join("out");
    let (logger, sink) = Logger::in_memory();

    let request = GenerationRequest::new(&target, ["login", "User"], dir.path());
    let report = generate_project(&request, &GenerateOptions::new(&tpl), &logger).unwrap();

    assert_eq!(
        fs::read_to_string(target.join("app/admin/login/page.js")).unwrap(),
        "static app/admin/login/page.js\n"
    );
    assert!(!target.join("app/api/admin/login").exists());
    assert!(!report.is_clean());
    let reserved: Vec<_> = report
        .warnings()
        .filter(|r| r.model.as_deref() == Some("login"))
        .collect();
    assert_eq!(reserved.len(), 2);
    assert!(reserved.iter().all(|r| matches!(
        r.outcome,
        FileOperationOutcome::Skipped(SkipReason::ReservedModelName)
    )));
    assert_eq!(report.produced(ArtifactKind::ModelPage), 1);
    assert!(sink.contains(LogLevel::Warn, "reserved"));
}

#[test]
fn test_io_failures_are_recorded_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let target = dir.path().join("out");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("lib"), "not a directory").unwrap();
    let (logger, sink) = Logger::in_memory();

    let request = GenerationRequest::new(&target, ["User"], dir.path());
    let report = generate_project(
        &request,
        &GenerateOptions::new(&tpl).allow_existing(true),
        &logger,
    )
    .unwrap();

    let mut failed: Vec<_> = report.failures().map(|r| r.dest.clone()).collect();
    failed.sort();
    assert_eq!(
        failed,
        vec![
            PathBuf::from("lib"),
            PathBuf::from("lib/auth.js"),
            PathBuf::from("lib/dbConnect.js"),
        ]
    );
    assert!(report.failures().all(|r| matches!(
        r.outcome,
        FileOperationOutcome::Failed(ArtifactError::Io { .. })
    )));
    assert_eq!(report.find(Path::new("lib")).unwrap().kind, ArtifactKind::Directory);

    assert_eq!(report.produced(ArtifactKind::StaticFile), STATIC_FILES.len() - 2);
    assert_eq!(report.produced(ArtifactKind::ModelPage), 1);
    assert_eq!(report.produced(ArtifactKind::ModelApiRoute), 1);
    assert_eq!(report.produced(ArtifactKind::Auxiliary), AUXILIARY_TEMPLATES.len());
    assert!(target.join("app/admin/User/page.js").is_file());
    assert_eq!(sink.lines_at(LogLevel::Error).len(), 3);
}

#[test]
fn test_rendered_write_failure_is_soft() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let target = dir.path().join("out");
    fs::create_dir(&target).unwrap();
    fs::create_dir(target.join("package.json")).unwrap();
    let (logger, _sink) = Logger::in_memory();

    let request = GenerationRequest::new(&target, ["User"], dir.path());
    let report = generate_project(
        &request,
        &GenerateOptions::new(&tpl).allow_existing(true),
        &logger,
    )
    .unwrap();

    let record = report.find(Path::new("package.json")).unwrap();
    assert!(matches!(
        record.outcome,
        FileOperationOutcome::Failed(ArtifactError::Io { op: "write", .. })
    ));
    assert_eq!(report.failures().count(), 1);
    assert!(target.join(".gitignore").is_file());
}

#[test]
fn test_uncreatable_target_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "regular file").unwrap();
    let target = blocker.join("out");
    let (logger, sink) = Logger::in_memory();

    let request = GenerationRequest::new(&target, ["User"], dir.path());
    let err = generate_project(&request, &GenerateOptions::new(&tpl), &logger).unwrap_err();
    match err {
        GenerationError::CreateTarget { path, .. } => assert_eq!(path, target),
        other => panic!("expected CreateTarget, got {other:?}"),
    }
    assert!(sink.contains(LogLevel::Error, "cannot create output directory"));
}

#[test]
fn test_parallel_with_more_models_than_workers() {
    let dir = tempfile::tempdir().unwrap();
    let tpl = fixture_templates(dir.path());
    let workers = std::thread::available_parallelism().map_or(1, |n| n.get());
    let models: Vec<String> = (0..workers * 2 + 3).map(|i| format!("Model{i}")).collect();
    let (logger, _sink) = Logger::in_memory();

    let request = GenerationRequest::new(dir.path().join("out"), models.clone(), dir.path());
    let report = generate_project(
        &request,
        &GenerateOptions::new(&tpl).parallel_models(true),
        &logger,
    )
    .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.produced(ArtifactKind::ModelPage), models.len());
    let page_models: Vec<_> = report
        .artifacts
        .iter()
        .filter(|r| r.kind == ArtifactKind::ModelPage)
        .filter_map(|r| r.model.clone())
        .collect();
    assert_eq!(page_models, models);
}
