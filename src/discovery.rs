//! Model discovery from a host project's `models/` directory.
//!
//! A model is any regular file with a recognised extension; its name is the
//! file stem. Names are de-duplicated (`User.js` and `User.ts` are one model)
//! and sorted so the generated tree does not depend on directory order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions recognised when none are configured
pub const DEFAULT_MODEL_EXTENSIONS: &[&str] = &["js", "ts"];

// Model names become JavaScript identifiers and directory names
static MODEL_NAME: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid model name regex")
});

#[derive(Debug)]
pub enum DiscoveryError {
    /// The models directory does not exist
    MissingDir(PathBuf),
    /// The models directory exists but could not be listed
    Read { path: PathBuf, source: io::Error },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::MissingDir(path) => {
                write!(f, "no models directory found at {}", path.display())
            }
            DiscoveryError::Read { path, source } => {
                write!(f, "cannot read models directory {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiscoveryError::MissingDir(_) => None,
            DiscoveryError::Read { source, .. } => Some(source),
        }
    }
}

/// True if `name` can be used as a model name.
pub fn is_valid_model_name(name: &str) -> bool {
    MODEL_NAME.is_match(name)
}

/// List model names in `models_dir`.
///
/// Only regular files whose extension is in `extensions` count. Names that
/// are not valid identifiers are skipped with a warning.
///
/// # Errors
///
/// Returns [`DiscoveryError::MissingDir`] if `models_dir` is not a directory,
/// or [`DiscoveryError::Read`] if it cannot be listed.
pub fn discover_models<S: AsRef<str>>(
    models_dir: &Path,
    extensions: &[S],
) -> Result<Vec<String>, DiscoveryError> {
    if !models_dir.is_dir() {
        return Err(DiscoveryError::MissingDir(models_dir.to_path_buf()));
    }
    let read_err = |source| DiscoveryError::Read {
        path: models_dir.to_path_buf(),
        source,
    };

    let mut names = BTreeSet::new();
    for entry in fs::read_dir(models_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let recognised = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|allowed| allowed.as_ref() == ext));
        if !recognised {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!(file = %path.display(), "skipping model file with non UTF-8 name");
            continue;
        };
        if !is_valid_model_name(stem) {
            tracing::warn!(file = %path.display(), "skipping model file: name is not a valid identifier");
            continue;
        }
        names.insert(stem.to_string());
    }

    tracing::debug!(dir = %models_dir.display(), count = names.len(), "discovered models");
    Ok(names.into_iter().collect())
}
