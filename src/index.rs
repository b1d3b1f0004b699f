//! The index document and how it reaches disk.
//!
//! A document is assembled once per run from the ordered summary records and
//! written through `write_atomic`: the bytes land in a temporary file next to
//! the destination and are renamed over it, so readers see either the old
//! index or the new one, never a partial file. The temp file takes over the
//! destination's permissions (or the umask default for a new file), and the
//! directory is synced after the rename so the replacement survives a crash.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Format version of `index.json`.
pub const SCHEMA_VERSION: u32 = 1;

/// `generated_at` layout: UTC, whole seconds, `Z` suffix.
pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One valid definition as listed in the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Bundle identifier. Not required to be unique.
    pub id: String,
    pub name: String,
    pub version: String,
    pub updated_at: String,
    /// Location relative to the index root, `/`-separated.
    pub path: String,
    /// Lowercase hex SHA-256 of the file bytes.
    pub sha256: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub schema_version: u32,
    pub generated_at: String,
    pub items: Vec<SummaryRecord>,
}

impl IndexDocument {
    /// Assemble a document; item order is kept exactly as given.
    pub fn new(items: Vec<SummaryRecord>, generated_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: format_timestamp(generated_at),
            items,
        }
    }

    /// Pretty JSON with a single trailing newline.
    pub fn render(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self).context("serializing index document")?;
        text.push('\n');
        Ok(text)
    }

    /// Render and atomically replace `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let text = self.render()?;
        write_atomic(path, text.as_bytes())
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(GENERATED_AT_FORMAT).to_string()
}

/// Read and parse an index document from disk.
pub fn load_index(path: &Path) -> Result<IndexDocument> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading index {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing index {}", path.display()))
}

/// Write `contents` to `path` via a sibling temp file and an atomic rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let staged = stage(path, contents)?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("replacing {}", path.display()))?;
    sync_dir(parent_dir(path))
}

/// Like `write_atomic`, but fails instead of replacing an existing file.
pub fn write_atomic_new(path: &Path, contents: &[u8]) -> Result<()> {
    let staged = stage(path, contents)?;
    staged
        .persist_noclobber(path)
        .map_err(|err| err.error)
        .with_context(|| format!("creating {}", path.display()))?;
    sync_dir(parent_dir(path))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Write and sync a temp file in `path`'s directory without publishing it.
///
/// Dropping the returned handle deletes the temp file.
pub(crate) fn stage(path: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let dir = parent_dir(path);
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let prefix = format!(".{file_name}.");
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".tmp");
    // 0666 before the umask, like a plain create; tempfile defaults to 0600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder
        .tempfile_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;

    match fs::metadata(path) {
        Ok(existing) => tmp
            .as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("copying permissions of {}", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("inspecting {}", path.display()));
        }
    }

    tmp.write_all(contents)
        .with_context(|| format!("writing temp file {}", tmp.path().display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("syncing temp file {}", tmp.path().display()))?;
    Ok(tmp)
}

/// Flush a directory entry change (rename, create) to disk.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)
        .and_then(|handle| handle.sync_all())
        .with_context(|| format!("syncing directory {}", dir.display()))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
