//! Path helpers for classification.

use std::path::Path;

/// Extension of `path`, lowercased, without the leading dot. Empty when the
/// file has none (`Makefile`, `.gitignore`).
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}
