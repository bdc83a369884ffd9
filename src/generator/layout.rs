//! Fixed geometry of a generated admin panel.
//!
//! Everything here is known at build time: the directory skeleton, the static
//! copy manifest, the per-model template pair and the project-level templates.
//! Source paths are relative to the template root, destination paths to the
//! generated project root.

use std::path::{Path, PathBuf};

/// Directories created before anything is written.
pub const SKELETON_DIRS: &[&str] = &[
    "app",
    "app/admin",
    "app/api/admin",
    "components",
    "lib",
    "configs",
    "styles",
    "public",
    "models",
];

/// A template file copied verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticFileEntry {
    pub source: &'static str,
    pub dest: &'static str,
}

impl StaticFileEntry {
    const fn same(path: &'static str) -> Self {
        Self {
            source: path,
            dest: path,
        }
    }
}

pub const STATIC_FILES: &[StaticFileEntry] = &[
    StaticFileEntry::same("app/layout.js"),
    StaticFileEntry::same("app/page.js"),
    StaticFileEntry::same("app/admin/login/page.js"),
    StaticFileEntry::same("components/TableView.js"),
    StaticFileEntry::same("lib/auth.js"),
    StaticFileEntry::same("lib/dbConnect.js"),
    StaticFileEntry::same("configs/admin.js"),
    StaticFileEntry::same("styles/globals.css"),
    StaticFileEntry::same("public/favicon.svg"),
    StaticFileEntry::same("public/login-image.svg"),
];

/// The two templates rendered once per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelTemplatePair {
    pub page: &'static str,
    pub api_route: &'static str,
}

pub const MODEL_TEMPLATES: ModelTemplatePair = ModelTemplatePair {
    page: "app/admin/[model]/page.js.j2",
    api_route: "app/api/admin/[model]/route.js.j2",
};

pub const MODEL_PAGE_FILE: &str = "page.js";
pub const MODEL_ROUTE_FILE: &str = "route.js";

/// A project-level config file rendered once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxiliaryTemplate {
    pub source: &'static str,
    pub dest: &'static str,
}

/// Dependency manifest, bundler config, lint config, ignore file.
pub const AUXILIARY_TEMPLATES: &[AuxiliaryTemplate] = &[
    AuxiliaryTemplate {
        source: "package.json.j2",
        dest: "package.json",
    },
    AuxiliaryTemplate {
        source: "next.config.mjs.j2",
        dest: "next.config.mjs",
    },
    AuxiliaryTemplate {
        source: "eslintrc.json.j2",
        dest: ".eslintrc.json",
    },
    AuxiliaryTemplate {
        source: "gitignore.j2",
        dest: ".gitignore",
    },
];

const ADMIN_PAGES_PREFIX: &str = "app/admin/";

/// Directory names under `app/admin` owned by static files.
///
/// A model with one of these names would overwrite a static page.
pub fn reserved_model_names() -> impl Iterator<Item = &'static str> {
    STATIC_FILES.iter().filter_map(|entry| {
        let rest = entry.dest.strip_prefix(ADMIN_PAGES_PREFIX)?;
        let (dir, _) = rest.split_once('/')?;
        Some(dir)
    })
}

pub fn is_reserved_model_name(name: &str) -> bool {
    reserved_model_names().any(|reserved| reserved == name)
}

/// Directory that receives the model's page: `app/admin/<model>`.
pub fn model_page_dir(target: &Path, model: &str) -> PathBuf {
    target.join("app").join("admin").join(model)
}

/// Directory that receives the model's API route: `app/api/admin/<model>`.
pub fn model_route_dir(target: &Path, model: &str) -> PathBuf {
    target.join("app").join("api").join("admin").join(model)
}

/// Where a model's source lives in the host project: `<root>/models/<model>`.
///
/// No extension; the bundler resolves `.js`/`.ts` itself.
pub fn model_source(source_root: &Path, model: &str) -> PathBuf {
    source_root.join("models").join(model)
}
