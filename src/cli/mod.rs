//! # CLI Module
//!
//! Command-line front end for the generator.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Discover models under `<project root>/models`, check preconditions and
//! generate `<project root>/admin-panel`:
//!
//! ```bash
//! adminpanel-gen generate
//! adminpanel-gen generate --project-root ../shop --skip-styling
//! ```
//!
//! Options:
//! - `--project-root <DIR>` - project containing `models/` (default: current directory)
//! - `--output <NAME>` - output directory name (default: `admin-panel`)
//! - `--templates <DIR>` - template root (also `ADMINPANEL_TEMPLATES`). Defaults
//!   to `templates/admin-panel` next to the executable, then
//!   `../share/adminpanel/templates/admin-panel`, then the checkout the binary
//!   was built from. Installed binaries must ship one of the first two layouts.
//! - `--config <FILE>` - config file (default: `adminpanel.toml` if present)
//! - `--skip-styling` - do not run the Tailwind install
//! - `--parallel` - render models on parallel threads
//!
//! The command exits non-zero without writing anything when the models
//! directory is missing, holds no models, or the output directory already
//! exists.
//!
//! ### `models`
//!
//! Print the model names `generate` would use, one per line:
//!
//! ```bash
//! adminpanel-gen models --project-root ../shop
//! ```

mod commands;


pub use commands::{check_preconditions, run, run_cli, Cli, Commands, PreconditionError, Preflight};
