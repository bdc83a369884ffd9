//! Idempotent filesystem primitives used by the generator.
//!
//! Every operation creates missing parent directories. None of them decide
//! whether a failure is fatal; that is the caller's job (see
//! [`super::report`]).

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Why an artifact was not produced even though nothing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Static file missing from the template root
    MissingSource,
    /// Template missing from the template root
    MissingTemplate,
    /// Destination already present and overwrite was not requested
    DestinationExists,
    /// Model name is not usable as a single directory name
    InvalidModelName,
    /// Model directory would replace a static page
    ReservedModelName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::MissingSource => "source file missing",
            SkipReason::MissingTemplate => "template missing",
            SkipReason::DestinationExists => "destination exists",
            SkipReason::InvalidModelName => "invalid model name",
            SkipReason::ReservedModelName => "model name reserved by a static page",
        })
    }
}

/// Result of [`copy_file`] when no I/O error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Skipped(SkipReason),
}

/// Create `path` and its parents. Existing directories are fine.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Copy `src` to `dst` byte for byte.
///
/// A missing source is reported as `Skipped(MissingSource)`, not an error.
/// With `overwrite == false` an existing destination is left untouched and
/// reported as `Skipped(DestinationExists)`.
pub fn copy_file(src: &Path, dst: &Path, overwrite: bool) -> io::Result<CopyOutcome> {
    if !src.is_file() {
        return Ok(CopyOutcome::Skipped(SkipReason::MissingSource));
    }
    if !overwrite && dst.exists() {
        return Ok(CopyOutcome::Skipped(SkipReason::DestinationExists));
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)?;
    Ok(CopyOutcome::Copied)
}

/// Write `content` to `path`, replacing any previous file.
pub fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// Read a UTF-8 template, or `None` if it does not exist.
pub fn read_template(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
