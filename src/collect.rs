//! Two-level definition discovery.
//!
//! Layout is `<defs>/<app>/<file>.json`: app directories are visited in name
//! order, files inside each one in name order. Nothing deeper is descended
//! into and non-matching entries are skipped silently.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::vec;

/// File-name suffix a definition must carry.
pub const DEFINITION_SUFFIX: &str = ".json";

/// Lazy iterator over candidate definition files.
///
/// The app directory list is read up front (it has to be sorted anyway);
/// each app directory is only listed when the walker reaches it.
#[derive(Debug)]
pub struct DefinitionWalker {
    app_dirs: vec::IntoIter<PathBuf>,
    files: vec::IntoIter<PathBuf>,
}

impl DefinitionWalker {
    pub fn new(defs_root: &Path) -> Result<Self> {
        let app_dirs = sorted_entries(defs_root, |path| path.is_dir())
            .with_context(|| format!("listing definitions root {}", defs_root.display()))?;
        log::debug!(
            "found {} app director{} under {}",
            app_dirs.len(),
            if app_dirs.len() == 1 { "y" } else { "ies" },
            defs_root.display()
        );
        Ok(Self {
            app_dirs: app_dirs.into_iter(),
            files: Vec::new().into_iter(),
        })
    }
}

impl Iterator for DefinitionWalker {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.files.next() {
                return Some(Ok(path));
            }
            let app_dir = self.app_dirs.next()?;
            match sorted_entries(&app_dir, is_definition_file) {
                Ok(files) => self.files = files.into_iter(),
                Err(err) => {
                    return Some(Err(err.context(format!(
                        "listing app directory {}",
                        app_dir.display()
                    ))));
                }
            }
        }
    }
}

/// Whether `path` names a regular file with the definition suffix.
pub fn is_definition_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(DEFINITION_SUFFIX))
            .unwrap_or(false)
}

fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if keep(&path) {
            entries.push(path);
        }
    }
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}
