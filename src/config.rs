//! # Generator Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `adminpanel.toml` in the project root (or a file passed with `--config`)
//! 3. Environment variables
//! 4. CLI flags (applied by the caller)
//!
//! ## Environment Variables
//!
//! - `ADMINPANEL_TEMPLATES` - template root directory
//! - `ADMINPANEL_LOG_DIR` - generation log directory
//! - `ADMINPANEL_NPM_BIN` - npm binary used by the Tailwind step
//! - `ADMINPANEL_SKIP_STYLING` - `true`/`1` disables the Tailwind step
//!
//! ## Example `adminpanel.toml`
//!
//! ```toml
//! output_name = "backoffice"
//! model_extensions = ["js", "ts", "mjs"]
//! skip_styling = true
//! styling_timeout_secs = 300
//! ```
//!
//! Relative paths in the file are resolved against the project root.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::discovery::DEFAULT_MODEL_EXTENSIONS;

/// Config file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "adminpanel.toml";

/// Output directory created inside the project root
pub const DEFAULT_OUTPUT_NAME: &str = "admin-panel";

/// Directory of the host project holding model files
pub const MODELS_DIR_NAME: &str = "models";

/// Template root used when none is configured.
///
/// Looked up next to the executable first, as `<exe dir>/templates/admin-panel`
/// or `<exe dir>/../share/adminpanel/templates/admin-panel`. Falls back to the
/// source checkout the binary was built from, which only exists on the build
/// machine; installed binaries without either layout need `--templates` or
/// `ADMINPANEL_TEMPLATES`.
pub fn bundled_templates_dir() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    locate_templates(exe_dir.as_deref())
}

fn template_root_under(dir: &Path) -> PathBuf {
    dir.join("templates").join("admin-panel")
}

fn locate_templates(exe_dir: Option<&Path>) -> PathBuf {
    exe_dir
        .into_iter()
        .flat_map(|dir| {
            [
                template_root_under(dir),
                template_root_under(&dir.join("..").join("share").join("adminpanel")),
            ]
        })
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| template_root_under(Path::new(env!("CARGO_MANIFEST_DIR"))))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Template root; the bundled templates when unset
    pub templates_dir: Option<PathBuf>,
    /// Name of the generated directory inside the project root
    pub output_name: String,
    /// File extensions that mark a model file
    pub model_extensions: Vec<String>,
    /// Generation log directory; `<project root>/logs` when unset
    pub log_dir: Option<PathBuf>,
    pub skip_styling: bool,
    pub npm_bin: String,
    /// Limit for `npm install`; no limit when unset
    pub styling_timeout_secs: Option<u64>,
    /// Render models on parallel threads
    pub parallel_models: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            templates_dir: None,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            model_extensions: DEFAULT_MODEL_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            log_dir: None,
            skip_styling: false,
            npm_bin: "npm".to_string(),
            styling_timeout_secs: None,
            parallel_models: false,
        }
    }
}

impl GeneratorConfig {
    /// Defaults, then the config file (explicit or auto-detected), then the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Fails if an explicit config file is missing, or any config file cannot
    /// be read or parsed.
    pub fn resolve(project_root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => load_config_file(path)?
                .with_context(|| format!("Config file not found: {}", path.display()))?,
            None => load_config_file(&project_root.join(CONFIG_FILE_NAME))?.unwrap_or_default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.resolve_relative_to(project_root);
        Ok(config)
    }

    /// Override fields from environment variables looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("ADMINPANEL_TEMPLATES").filter(|v| !v.is_empty()) {
            self.templates_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("ADMINPANEL_LOG_DIR").filter(|v| !v.is_empty()) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(bin) = lookup("ADMINPANEL_NPM_BIN").filter(|v| !v.is_empty()) {
            self.npm_bin = bin;
        }
        if let Some(flag) = lookup("ADMINPANEL_SKIP_STYLING") {
            self.skip_styling = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    fn resolve_relative_to(&mut self, project_root: &Path) {
        for dir in [&mut self.templates_dir, &mut self.log_dir].into_iter().flatten() {
            if dir.is_relative() {
                *dir = project_root.join(&*dir);
            }
        }
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.templates_dir
            .clone()
            .unwrap_or_else(bundled_templates_dir)
    }

    pub fn log_dir(&self, project_root: &Path) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| project_root.join("logs"))
    }

    pub fn styling_timeout(&self) -> Option<Duration> {
        self.styling_timeout_secs.map(Duration::from_secs)
    }
}

/// Load a config file.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// cannot be read or parsed.
pub fn load_config_file(path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(Some(config))
}
