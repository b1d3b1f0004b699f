//! Build configuration.
//!
//! Every path the builder touches is derived from a `BuildConfig` value passed
//! in by the caller; nothing is read from process-wide state. Binaries fill it
//! from CLI flags, tests point it at a temporary directory.

use std::path::{Path, PathBuf};

/// Default definitions subdirectory under the index root.
pub const DEFAULT_DEFS_DIR: &str = "defs";
/// Default index file name under the index root.
pub const DEFAULT_INDEX_FILE: &str = "index.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directory that index paths are made relative to.
    pub root: PathBuf,
    /// Definitions directory, relative to `root` unless absolute.
    pub defs_dir: PathBuf,
    /// Index destination, relative to `root` unless absolute.
    pub output: PathBuf,
}

impl BuildConfig {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            defs_dir: PathBuf::from(DEFAULT_DEFS_DIR),
            output: PathBuf::from(DEFAULT_INDEX_FILE),
        }
    }

    pub fn with_defs_dir(mut self, defs_dir: impl Into<PathBuf>) -> Self {
        self.defs_dir = defs_dir.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Absolute (or root-joined) definitions directory.
    pub fn defs_root(&self) -> PathBuf {
        resolve_under(&self.root, &self.defs_dir)
    }

    /// Absolute (or root-joined) index destination.
    pub fn index_path(&self) -> PathBuf {
        resolve_under(&self.root, &self.output)
    }
}

fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
