// Path helper utilities shared across drive operations
use std::path::Path;

use crate::drive::api::{RemoteItem, export_format};
use crate::error::{InvalidNameSnafu, Result};
use snafu::ensure;

/// Extension of a file name including the leading dot, or an empty string.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Turn a remote display name into a single safe local path component.
pub fn sanitize_name(name: &str) -> Result<String> {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    ensure!(
        !cleaned.is_empty() && cleaned != "." && cleaned != "..",
        InvalidNameSnafu { name }
    );
    Ok(cleaned)
}

/// Local file name for a remote item: the sanitized display name, plus the
/// export extension for Google-native documents.
pub fn local_name(item: &RemoteItem) -> Result<String> {
    let mut name = sanitize_name(&item.name)?;
    if !item.is_google_native() {
        return Ok(name);
    }
    if let Some(format) = export_format(&item.mime_type) {
        if !name.to_lowercase().ends_with(format.extension) {
            name.push_str(format.extension);
        }
    }
    Ok(name)
}

/// File name of a local path as a string, falling back to the whole path.
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
