//! Tailwind CSS post-install step.
//!
//! Runs after all files are generated and is best-effort: the generator logs a
//! failure and carries on.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::generator::templates::{render_config, PostcssConfigTemplate, TailwindConfigTemplate};

/// Dev dependencies installed into the generated project
pub const TAILWIND_PACKAGES: &[&str] = &[
    "tailwindcss",
    "@tailwindcss/postcss",
    "postcss",
    "autoprefixer",
];

/// Directives `styles/globals.css` must contain
pub const TAILWIND_DIRECTIVES: &[&str] = &[
    "@tailwind base;",
    "@tailwind components;",
    "@tailwind utilities;",
];

/// An optional enhancement applied to a freshly generated project.
pub trait StylingStep: Send + Sync {
    fn name(&self) -> &str;

    /// Apply the step to `project_dir`.
    ///
    /// # Errors
    ///
    /// Any error is reported by the generator and otherwise ignored.
    fn apply(&self, project_dir: &Path) -> Result<(), StylingError>;
}

#[derive(Debug)]
pub enum StylingError {
    Spawn { program: String, source: io::Error },
    Wait { program: String, source: io::Error },
    Exit { program: String, status: ExitStatus },
    Timeout { program: String, limit: Duration },
    Write { path: PathBuf, source: io::Error },
    Template(askama::Error),
}

impl fmt::Display for StylingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StylingError::Spawn { program, source } => {
                write!(f, "failed to start '{program}': {source}")
            }
            StylingError::Wait { program, source } => {
                write!(f, "failed waiting for '{program}': {source}")
            }
            StylingError::Exit { program, status } => {
                write!(f, "'{program} install' exited with {status}")
            }
            StylingError::Timeout { program, limit } => {
                write!(f, "'{program} install' timed out after {}s", limit.as_secs())
            }
            StylingError::Write { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
            StylingError::Template(e) => write!(f, "failed to render styling config: {e}"),
        }
    }
}

impl std::error::Error for StylingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StylingError::Spawn { source, .. }
            | StylingError::Wait { source, .. }
            | StylingError::Write { source, .. } => Some(source),
            StylingError::Template(e) => Some(e),
            StylingError::Exit { .. } | StylingError::Timeout { .. } => None,
        }
    }
}

/// Installs Tailwind with npm and writes its config files.
#[derive(Debug, Clone)]
pub struct TailwindSetup {
    npm_bin: String,
    timeout: Option<Duration>,
}

impl TailwindSetup {
    pub fn new(npm_bin: impl Into<String>) -> Self {
        Self {
            npm_bin: npm_bin.into(),
            timeout: None,
        }
    }

    /// Kill the install after `timeout`. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn install(&self, project_dir: &Path) -> Result<(), StylingError> {
        let mut cmd = Command::new(&self.npm_bin);
        cmd.arg("install")
            .arg("-D")
            .args(TAILWIND_PACKAGES)
            .current_dir(project_dir)
            .stdin(Stdio::null());
        tracing::info!(program = %self.npm_bin, dir = %project_dir.display(), "installing Tailwind CSS dependencies");

        let mut child = cmd.spawn().map_err(|source| StylingError::Spawn {
            program: self.npm_bin.clone(),
            source,
        })?;
        let waited = match self.timeout {
            None => child.wait(),
            Some(limit) => {
                let started = Instant::now();
                loop {
                    match child.try_wait() {
                        Ok(Some(status)) => break Ok(status),
                        Ok(None) if started.elapsed() >= limit => {
                            if let Err(e) = child.kill() {
                                tracing::debug!(error = %e, "kill after timeout failed");
                            }
                            if let Err(e) = child.wait() {
                                tracing::debug!(error = %e, "reaping timed-out install failed");
                            }
                            return Err(StylingError::Timeout {
                                program: self.npm_bin.clone(),
                                limit,
                            });
                        }
                        Ok(None) => thread::sleep(Duration::from_millis(50)),
                        Err(e) => break Err(e),
                    }
                }
            }
        };
        let status = waited.map_err(|source| StylingError::Wait {
            program: self.npm_bin.clone(),
            source,
        })?;
        if !status.success() {
            return Err(StylingError::Exit {
                program: self.npm_bin.clone(),
                status,
            });
        }
        Ok(())
    }
}

impl StylingStep for TailwindSetup {
    fn name(&self) -> &str {
        "tailwind"
    }

    fn apply(&self, project_dir: &Path) -> Result<(), StylingError> {
        self.install(project_dir)?;

        let tailwind = render_config(&TailwindConfigTemplate::default())
            .map_err(StylingError::Template)?;
        write(&project_dir.join("tailwind.config.js"), &tailwind)?;

        let postcss = render_config(&PostcssConfigTemplate::default())
            .map_err(StylingError::Template)?;
        write(&project_dir.join("postcss.config.js"), &postcss)?;

        let css = project_dir.join("styles").join("globals.css");
        ensure_tailwind_directives(&css).map_err(|source| StylingError::Write {
            path: css.clone(),
            source,
        })?;
        Ok(())
    }
}

fn write(path: &Path, content: &str) -> Result<(), StylingError> {
    fs::write(path, content).map_err(|source| StylingError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Prepend the Tailwind directives to `css_path` unless all are present.
///
/// Creates the file (and its directory) when missing. Returns whether the
/// file changed.
pub fn ensure_tailwind_directives(css_path: &Path) -> io::Result<bool> {
    let header = format!("{}\n\n", TAILWIND_DIRECTIVES.join("\n"));
    let current = match fs::read_to_string(css_path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Some(parent) = css_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(css_path, header)?;
            return Ok(true);
        }
        Err(e) => return Err(e),
    };
    if TAILWIND_DIRECTIVES.iter().all(|d| current.contains(d)) {
        return Ok(false);
    }
    fs::write(css_path, header + &current)?;
    Ok(true)
}
