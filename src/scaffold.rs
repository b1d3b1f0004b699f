//! Scaffolding for new definition files.
//!
//! Produces the authored `Definition` shape with sensible defaults and drops it
//! into `<defs>/<stem>/<stem>.json`, where the stem is the display name
//! lowercased with spaces removed.

use crate::config::BuildConfig;
use crate::definition::{Definition, UninstallData};
use crate::index::{format_timestamp, write_atomic_new};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Version given to a definition when none is supplied.
pub const DEFAULT_VERSION: &str = "1";

/// File discovery strategy understood by the uninstaller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Prefix,
    Substring,
    All,
}

impl MatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Prefix => "prefix",
            MatchMode::Substring => "substring",
            MatchMode::All => "all",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "prefix" => Ok(MatchMode::Prefix),
            "substring" => Ok(MatchMode::Substring),
            "all" => Ok(MatchMode::All),
            other => {
                bail!("unknown match mode '{other}' (expected exact, prefix, substring or all)")
            }
        }
    }
}

/// Inputs for a new definition. Empty lists are left out of the file.
#[derive(Clone, Debug, Default)]
pub struct DefinitionDraft {
    pub name: String,
    pub app_name: String,
    pub bundle_id: String,
    pub version: Option<String>,
    pub alternative_names: Vec<String>,
    pub search_file_paths: Vec<String>,
    pub additional_paths: Vec<String>,
    pub forget_pkg: bool,
    pub unload_launch_daemons: bool,
    pub match_mode: Option<MatchMode>,
    pub brew_name: Option<String>,
}

impl DefinitionDraft {
    pub fn new(
        name: impl Into<String>,
        app_name: impl Into<String>,
        bundle_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            app_name: app_name.into(),
            bundle_id: bundle_id.into(),
            ..Self::default()
        }
    }

    /// File stem and `name` field for this draft.
    pub fn stem(&self) -> String {
        definition_stem(&self.name)
    }

    pub fn into_definition(self, now: DateTime<Utc>) -> Result<Definition> {
        let stem = self.stem();
        validate_stem(&stem, &self.name)?;
        if self.app_name.trim().is_empty() {
            bail!("app name must not be empty");
        }
        if self.bundle_id.trim().is_empty() {
            bail!("bundle id must not be empty");
        }

        Ok(Definition {
            name: stem,
            uninstall: UninstallData {
                additional_paths: non_empty_list(self.additional_paths),
                alternative_names: non_empty_list(self.alternative_names),
                app_name: self.app_name,
                brew_name: self.brew_name.filter(|b| !b.is_empty()),
                bundle_id: self.bundle_id,
                forget_pkg: self.forget_pkg,
                match_mode: self.match_mode.map(|m| m.as_str().to_string()),
                search_file_paths: non_empty_list(self.search_file_paths),
                unload_launch_daemons: self.unload_launch_daemons,
            },
            updated_at: format_timestamp(now),
            version: self
                .version
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        })
    }
}

/// Display name lowercased with spaces removed.
pub fn definition_stem(name: &str) -> String {
    name.to_lowercase().replace(' ', "")
}

fn validate_stem(stem: &str, name: &str) -> Result<()> {
    if stem.is_empty() {
        bail!("definition name must not be empty");
    }
    if matches!(stem, "." | "..") || stem.contains(['/', '\\']) {
        bail!("definition name '{name}' cannot be used as a file name");
    }
    Ok(())
}

fn non_empty_list(values: Vec<String>) -> Option<Vec<String>> {
    let values: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Pretty JSON, sorted keys, trailing newline.
pub fn render_definition(definition: &Definition) -> Result<String> {
    let mut text = serde_json::to_string_pretty(definition).context("serializing definition")?;
    text.push('\n');
    Ok(text)
}

/// Where a definition lands by default: `<defs>/<stem>/`.
pub fn default_definition_dir(config: &BuildConfig, stem: &str) -> PathBuf {
    config.defs_root().join(stem)
}

/// Write `definition` as `<dir>/<name>.json`, creating `dir` when needed.
///
/// An existing file is never replaced.
pub fn write_definition(dir: &Path, definition: &Definition) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("{}.json", definition.name));
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    let text = render_definition(definition)?;
    write_atomic_new(&path, text.as_bytes())?;
    Ok(path)
}
