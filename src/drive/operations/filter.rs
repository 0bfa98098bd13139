// Transfer options and the predicate deciding which items get transferred
use std::collections::BTreeSet;
use std::path::Path;

/// Per-invocation transfer settings. Immutable for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOptions {
    /// Descend into subfolders.
    pub recursive: bool,
    /// Replace items that already exist at the destination.
    pub overwrite: bool,
    /// Accepted MIME types; empty means any.
    pub mime_types: BTreeSet<String>,
    /// Accepted extensions, normalized to lowercase with a leading dot; empty means any.
    pub extensions: BTreeSet<String>,
    /// Keep downloaded content in memory instead of writing it to disk.
    pub return_content: bool,
}

/// Outcome of evaluating one item against the transfer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Accept,
    /// MIME type or extension not in a non-empty accepted set.
    TypeMismatch,
    /// Destination already exists and overwrite is off.
    AlreadyExists,
}

impl FilterDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, FilterDecision::Accept)
    }
}

impl TransferOptions {
    pub fn with_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.mime_types = mime_types
            .into_iter()
            .map(|m| m.as_ref().trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }

    /// Decide whether an item passes the type filters and the overwrite rule.
    pub fn decide(&self, mime_type: &str, extension: &str, target_exists: bool) -> FilterDecision {
        if target_exists && !self.overwrite {
            return FilterDecision::AlreadyExists;
        }
        if !self.mime_types.is_empty() && !self.mime_types.contains(mime_type) {
            return FilterDecision::TypeMismatch;
        }
        if !self.extensions.is_empty() && !self.extensions.contains(&extension.to_lowercase()) {
            return FilterDecision::TypeMismatch;
        }
        FilterDecision::Accept
    }

    /// Same as [`decide`](Self::decide), checking an optional local target on disk.
    pub fn decide_local(
        &self,
        mime_type: &str,
        extension: &str,
        target: Option<&Path>,
    ) -> FilterDecision {
        let exists = target.is_some_and(|path| path.exists());
        self.decide(mime_type, extension, exists)
    }
}

/// Normalize a user supplied extension to `.ext` in lowercase.
pub fn normalize_extension(extension: &str) -> Option<String> {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!(".{}", trimmed.to_lowercase()))
    }
}
