//! # adminpanel
//!
//! Scaffolds a Next.js admin panel next to a project's `models/` directory:
//! a page and an API route per model, a login page, a table view component,
//! an auth stub and the project's build configuration.
//!
//! ## Architecture
//!
//! - **[`discovery`]** - turns `models/` into an ordered list of model names
//! - **[`generator`]** - the generation engine: skeleton, static copies,
//!   per-model rendering, project configs and the Tailwind styling step
//! - **[`logging`]** - the on-disk generation log and the `tracing` setup
//! - **[`config`]** - layered settings from `adminpanel.toml` and the environment
//! - **[`cli`]** - the `adminpanel-gen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(adminpanel-gen)
//!     participant Disc as discovery
//!     participant Gen as generator
//!     participant FS as File System
//!     participant Npm as npm
//!
//!     User->>CLI: adminpanel-gen generate
//!     CLI->>Disc: discover_models("models/")
//!     Disc-->>CLI: ["Post", "User"]
//!     CLI->>CLI: check preconditions
//!     CLI->>Gen: generate_project(request, options, logger)
//!     Gen->>FS: skeleton directories
//!     Gen->>FS: copy static files
//!     loop each model
//!         Gen->>FS: app/admin/<model>/page.js
//!         Gen->>FS: app/api/admin/<model>/route.js
//!     end
//!     Gen->>FS: package.json, next.config.mjs, ...
//!     Gen->>Npm: npm install -D tailwindcss ...
//!     Gen-->>CLI: GenerationReport
//!     CLI-->>User: summary + next steps
//! ```
//!
//! ## Failure Model
//!
//! Problems with a single file (a missing template, a failed copy) are logged
//! and recorded in the [`generator::GenerationReport`]; the run carries on.
//! Only a missing models directory, an existing output directory, an
//! unreadable template root or an uncreatable output root stop it.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod generator;
pub mod logging;

pub use config::GeneratorConfig;
pub use discovery::discover_models;
pub use generator::{generate_project, GenerateOptions, GenerationReport, GenerationRequest};
pub use logging::Logger;
