use std::path::{Component, Path, PathBuf};

/// Make `path` absolute and lexically normalized.
///
/// Relative paths are joined onto the current directory. `.` and `..` are
/// resolved without touching the filesystem, so the path need not exist.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize(&joined)
}

/// Resolve `.` and `..` components lexically.
///
/// `..` at the root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Import path from files in `from_dir` to `to`, with `/` separators.
///
/// Both paths are normalized first. The result always starts with `./` or
/// `../` so bundlers treat it as a relative module specifier.
pub fn relative_import_path(from_dir: &Path, to: &Path) -> String {
    let from = normalize(from_dir);
    let to = normalize(to);
    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        segments.push("..".to_string());
    }
    for part in &to_parts[common..] {
        segments.push(part.as_os_str().to_string_lossy().into_owned());
    }

    match segments.first().map(String::as_str) {
        None => ".".to_string(),
        Some("..") => segments.join("/"),
        Some(_) => format!("./{}", segments.join("/")),
    }
}

/// `name` is usable as one directory name: a single normal path component.
pub fn is_single_segment(name: &str) -> bool {
    let mut comps = Path::new(name).components();
    matches!(
        (comps.next(), comps.next()),
        (Some(Component::Normal(seg)), None) if seg == name
    )
}
