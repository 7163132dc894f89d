//! Affected-file path normalization.

use std::path::{Path, PathBuf};

/// Make `path` relative to `root` when it is anchored.
///
/// - Absolute paths are made relative to `root`.
/// - `./` and `../` paths are resolved against `root`, cleaned, then made
///   relative again.
/// - Anything else is already project-relative and is returned unchanged.
///
/// Paths outside the root stay relative (`../outside/f.ts`); they are never
/// rejected.
pub fn normalize_file_path(path: &str, root: &Path) -> String {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        relative_to(candidate, root)
    } else if path.starts_with("./") || path.starts_with("../") {
        relative_to(&root.join(candidate), root)
    } else {
        path.to_owned()
    }
}

/// Anchor a root at the current directory when it is relative.
///
/// Relative roots cannot be diffed against absolute file paths, so every
/// root the logger holds goes through here once.
pub fn absolute_root(root: &Path) -> PathBuf {
    if root.is_absolute() {
        return path_clean::clean(root);
    }
    match std::path::absolute(root) {
        Ok(abs) => path_clean::clean(abs),
        Err(_) => root.to_path_buf(),
    }
}

fn relative_to(path: &Path, root: &Path) -> String {
    let path = path_clean::clean(path);
    let root = path_clean::clean(root);
    match pathdiff::diff_paths(&path, &root) {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_owned(),
        Some(rel) => rel.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
