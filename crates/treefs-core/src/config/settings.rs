//! Configuration loaded from a TOML file.
//!
//! Every section is optional; a missing file section falls back to its
//! defaults, so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::Entry;

/// Top-level configuration.
///
/// Call [`Config::load`] to read from a TOML path, or use
/// [`Config::default`] when no file is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::Io`] if the file cannot be read.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            _ => CoreError::io(path, e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Which files make up a directory's index, and what the index file is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Extension (without the dot) of the files an index re-exports.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// Basename suffixes that exclude an otherwise matching file.
    #[serde(default = "default_excluded_suffixes")]
    pub excluded_suffixes: Vec<String>,
    /// Basename of the generated index file itself.
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            excluded_suffixes: default_excluded_suffixes(),
            index_file: default_index_file(),
        }
    }
}

impl IndexConfig {
    /// Returns `true` if `entry` is a non-directory source file that belongs
    /// in its directory's index.
    pub fn accepts(&self, entry: &Entry) -> bool {
        if entry.is_dir() {
            return false;
        }
        let name = entry.basename();
        let has_extension = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == self.source_extension.as_str());

        has_extension
            && !self.is_index_file(entry)
            && !self
                .excluded_suffixes
                .iter()
                .any(|suffix| name.ends_with(suffix.as_str()))
    }

    /// Returns `true` if `entry` is a non-directory named like the index file.
    pub fn is_index_file(&self, entry: &Entry) -> bool {
        !entry.is_dir() && entry.basename() == self.index_file
    }
}

fn default_source_extension() -> String {
    "ts".to_string()
}

fn default_excluded_suffixes() -> Vec<String> {
    vec![".spec.ts".to_string()]
}

fn default_index_file() -> String {
    "index.ts".to_string()
}
