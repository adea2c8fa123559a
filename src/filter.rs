//! Ignore rules deciding which entries are left behind.
//!
//! Matching is exact set membership on the entry's base name (or its
//! extension for files). There is no glob or prefix matching.

use std::collections::BTreeSet;
use std::path::Path;

pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    "venv",
    "node_modules",
    ".git",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".idea",
    ".next",
    "dist",
    "build",
    "out",
    ".cache",
];

pub const DEFAULT_IGNORE_EXTS: &[&str] = &[".exe", ".dll", ".pyc", ".pyo", ".log", ".tmp", ".cache"];

pub const DEFAULT_IGNORE_FILES: &[&str] = &["package-lock.json", "yarn.lock", ".DS_Store", "Thumbs.db"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRules {
    dirs: BTreeSet<String>,
    exts: BTreeSet<String>,
    files: BTreeSet<String>,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_IGNORE_DIRS.iter().copied(),
            DEFAULT_IGNORE_EXTS.iter().copied(),
            DEFAULT_IGNORE_FILES.iter().copied(),
        )
    }
}

impl IgnoreRules {
    pub fn new<D, E, F>(dirs: D, exts: E, files: F) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            exts: exts
                .into_iter()
                .map(|e| {
                    let e: String = e.into();
                    normalize_ext(&e)
                })
                .collect(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Rules that ignore nothing.
    pub fn empty() -> Self {
        Self::new(Vec::<String>::new(), Vec::<String>::new(), Vec::<String>::new())
    }

    /// Builds rules from optional overrides; a `None` set keeps its default.
    pub fn with_overrides(
        dirs: Option<Vec<String>>,
        exts: Option<Vec<String>>,
        files: Option<Vec<String>>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            dirs: dirs.map(|d| d.into_iter().collect()).unwrap_or(defaults.dirs),
            exts: exts
                .map(|e| e.iter().map(|x| normalize_ext(x)).collect())
                .unwrap_or(defaults.exts),
            files: files.map(|f| f.into_iter().collect()).unwrap_or(defaults.files),
        }
    }

    pub fn should_ignore(&self, entry_name: &str, is_directory: bool) -> bool {
        if is_directory {
            return self.dirs.contains(entry_name);
        }
        if self.files.contains(entry_name) {
            return true;
        }
        let ext = extension_of(entry_name);
        !ext.is_empty() && self.exts.contains(&ext)
    }

    pub fn dirs(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub fn exts(&self) -> impl Iterator<Item = &str> {
        self.exts.iter().map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}

/// Lower-cased extension with its leading dot, or an empty string.
///
/// Dotfiles such as `.DS_Store` have no extension.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
