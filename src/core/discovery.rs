//! KE-008: Resource fragment discovery in a resource directory.

use std::path::{Path, PathBuf};

/// Extensions picked up from a resource directory.
pub const FRAGMENT_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// List fragment candidates directly inside `dir`, sorted by file name.
///
/// Not recursive. A missing directory yields an empty list. Excluded files
/// (e.g. `*.helm.yaml`) are returned too; the list builder skips them.
pub fn list_fragment_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "resource directory not found");
        return Ok(Vec::new());
    }

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = Vec::new();
    for ext in FRAGMENT_EXTENSIONS {
        let pattern = format!("{}/*.{}", escaped, ext);
        let entries =
            glob::glob(&pattern).map_err(|e| format!("invalid pattern {}: {}", pattern, e))?;
        for entry in entries {
            let path = entry.map_err(|e| format!("cannot read {}: {}", dir.display(), e))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    tracing::debug!(dir = %dir.display(), count = files.len(), "listed resource fragments");
    Ok(files)
}
