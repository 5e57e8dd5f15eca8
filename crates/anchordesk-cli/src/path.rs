//! Trail path validation.

use std::path::{Path, PathBuf};

/// Validates a trail path before it is opened.
///
/// The file must exist and carry the `.adt` extension; relative paths are
/// resolved against the current directory.
pub fn validate_trail_path(raw: &str) -> Result<PathBuf, String> {
    let path = Path::new(raw);
    if path.extension().and_then(|e| e.to_str()) != Some("adt") {
        return Err(format!("'{}' is not an .adt trail file", raw));
    }
    if !path.is_file() {
        return Err(format!("'{}' does not exist", raw));
    }
    Ok(path.to_path_buf())
}

/// Renders a path for error messages without leaking absolute directories.
pub fn sanitize_path_for_error(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "<trail>".to_string())
}
