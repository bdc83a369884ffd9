//! # Generator Module
//!
//! Builds a Next.js admin panel for a host project's models from a template
//! root on disk.
//!
//! ## Pipeline
//!
//! ```text
//! models → skeleton dirs → static copies → per-model page + API route
//!        → project config files → styling step → GenerationReport
//! ```
//!
//! 1. **Skeleton** - the fixed directory list in [`SKELETON_DIRS`]
//! 2. **Static files** - [`STATIC_FILES`] copied byte for byte
//! 3. **Models** - [`MODEL_TEMPLATES`] rendered once per model into
//!    `app/admin/<model>/page.js` and `app/api/admin/<model>/route.js`
//! 4. **Project configs** - [`AUXILIARY_TEMPLATES`] rendered once
//! 5. **Styling** - an optional [`StylingStep`], Tailwind by default
//!
//! Each artifact gets an [`ArtifactRecord`] in the returned
//! [`GenerationReport`] and a line in the generation log. Only the conditions
//! in [`GenerationError`] stop a run.
//!
//! ## Generated Structure
//!
//! ```text
//! admin-panel/
//! ├── package.json  next.config.mjs  .eslintrc.json  .gitignore
//! ├── app/
//! │   ├── layout.js  page.js
//! │   ├── admin/login/page.js
//! │   ├── admin/<Model>/page.js
//! │   └── api/admin/<Model>/route.js
//! ├── components/TableView.js
//! ├── configs/admin.js
//! ├── lib/auth.js  lib/dbConnect.js
//! ├── models/
//! ├── public/favicon.svg  public/login-image.svg
//! └── styles/globals.css
//! ```
//!
//! ## Templates
//!
//! Per-model and project templates are rendered with minijinja. Available
//! variables:
//!
//! - `modelName` - the model being rendered (per-model templates only)
//! - `modelImportPath` - relative import from the output file's directory to
//!   `<source root>/models/<model>` (per-model templates only)
//! - `projectName` - final component of the output directory
//! - `models` - every model name, in order
//! - `sourceProjectRoot` - absolute path of the host project
//!
//! ## Usage
//!
//! ```rust,no_run
//! use adminpanel::generator::{generate_project, GenerateOptions, GenerationRequest};
//! use adminpanel::logging::Logger;
//!
//! let request = GenerationRequest::new("/proj/admin-panel", ["User", "Post"], "/proj");
//! let options = GenerateOptions::new("templates/admin-panel");
//! let logger = Logger::to_dir("/proj/logs");
//! let report = generate_project(&request, &options, &logger)?;
//! println!("{report}");
//! # Ok::<(), adminpanel::generator::GenerationError>(())
//! ```

mod layout;
mod materialize;
mod paths;
mod project;
mod render;
mod report;
mod templates;
#[cfg(test)]
mod tests;

pub use layout::*;
pub use materialize::{copy_file, ensure_dir, read_template, write_file, CopyOutcome, SkipReason};
pub use paths::{absolutize, normalize, relative_import_path};
pub use project::*;
pub use render::{RenderError, TemplateContext, TemplateRenderer};
pub use report::{
    ArtifactError, ArtifactKind, ArtifactRecord, FileOperationOutcome, GenerationError,
    GenerationReport, Severity, StylingOutcome,
};
pub use templates::{PostcssConfigTemplate, TailwindConfigTemplate};
