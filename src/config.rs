//! Ignore-rule overrides loaded from a TOML file.
//!
//! ```toml
//! [ignore]
//! dirs = ["target", "node_modules"]
//! extensions = [".o", ".log"]
//! files = [".DS_Store"]
//! ```
//!
//! A missing key keeps the built-in default for that set.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CopyError, Result};
use crate::filter::IgnoreRules;

#[derive(Debug, Default, Deserialize)]
struct ConfigTable {
    #[serde(default)]
    ignore: IgnoreConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreConfig {
    pub dirs: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub files: Option<Vec<String>>,
}

impl IgnoreConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let toml_string = fs::read_to_string(path).map_err(|err| CopyError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::parse(&toml_string, path)
    }

    pub fn parse(toml_string: &str, path: &Path) -> Result<Self> {
        let table = toml::from_str::<ConfigTable>(toml_string).map_err(|err| CopyError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(table.ignore)
    }

    /// Overlays `other` on top of `self`; sets present in `other` win.
    pub fn merge(self, other: IgnoreConfig) -> IgnoreConfig {
        IgnoreConfig {
            dirs: other.dirs.or(self.dirs),
            extensions: other.extensions.or(self.extensions),
            files: other.files.or(self.files),
        }
    }

    pub fn into_rules(self) -> IgnoreRules {
        IgnoreRules::with_overrides(self.dirs, self.extensions, self.files)
    }
}
