//! Definition files: authored shape, lenient parse model, and summarizing.
//!
//! The builder never trusts a definition's shape. Bytes are parsed into
//! `RawDefinition`, where every field is optional, and `summarize` applies the
//! required-field and fallback-version rules explicitly. A file either becomes
//! a `SummaryRecord` or a `Rejection` saying why it was skipped.

use crate::digest::{fallback_version, sha256_hex};
use crate::index::SummaryRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Component, Path};
use thiserror::Error;

/// Full authored definition, as written by `new-definition`.
///
/// Fields are declared in key order so the serialized form is key-sorted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub uninstall: UninstallData,
    pub updated_at: String,
    pub version: String,
}

/// Uninstall metadata carried by a definition.
///
/// Fields are declared in key order so the serialized form is key-sorted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_names: Option<Vec<String>>,
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brew_name: Option<String>,
    pub bundle_id: String,
    pub forget_pkg: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_file_paths: Option<Vec<String>>,
    pub unload_launch_daemons: bool,
}

/// What the index builder reads out of a definition. Anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RawDefinition {
    pub name: Option<String>,
    pub version: Option<String>,
    pub updated_at: Option<String>,
    pub uninstall: Option<RawUninstall>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawUninstall {
    #[serde(rename = "bundleId")]
    pub bundle_id: Option<String>,
}

/// A required definition field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequiredField {
    BundleId,
    Name,
    Version,
    UpdatedAt,
}

impl RequiredField {
    pub fn as_str(self) -> &'static str {
        match self {
            RequiredField::BundleId => "uninstall.bundleId",
            RequiredField::Name => "name",
            RequiredField::Version => "version",
            RequiredField::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a definition file was left out of the index.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("unexpected definition shape: {0}")]
    InvalidShape(String),

    #[error("missing fields: {}", join_fields(.0))]
    MissingFields(Vec<RequiredField>),
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate one definition's bytes.
///
/// `rel_path` is stored verbatim in the record; callers produce it with
/// `index_relative_path`.
pub fn summarize(rel_path: String, bytes: &[u8]) -> Result<SummaryRecord, Rejection> {
    let value: Value = serde_json::from_slice(bytes).map_err(Rejection::InvalidJson)?;
    if !value.is_object() {
        return Err(Rejection::InvalidShape(format!(
            "expected an object, found {}",
            json_kind(&value)
        )));
    }
    let raw: RawDefinition =
        serde_json::from_value(value).map_err(|err| Rejection::InvalidShape(err.to_string()))?;
    let digest = sha256_hex(bytes);

    let bundle_id = non_empty(raw.uninstall.and_then(|u| u.bundle_id));
    let name = non_empty(raw.name);
    let version = non_empty(raw.version).or_else(|| Some(fallback_version(&digest)));
    let updated_at = non_empty(raw.updated_at);

    match (bundle_id, name, version, updated_at) {
        (Some(id), Some(name), Some(version), Some(updated_at)) => Ok(SummaryRecord {
            id,
            name,
            version,
            updated_at,
            path: rel_path,
            sha256: digest,
        }),
        (id, name, version, updated_at) => {
            let missing = [
                (RequiredField::BundleId, id.is_none()),
                (RequiredField::Name, name.is_none()),
                (RequiredField::Version, version.is_none()),
                (RequiredField::UpdatedAt, updated_at.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            Err(Rejection::MissingFields(missing))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `path` relative to `root`, joined with `/` on every platform.
///
/// Paths outside `root` keep their full form, still `/`-joined.
pub fn index_relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => parts.push("..".to_string()),
            Component::CurDir => {}
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned())
            }
            Component::RootDir if parts.is_empty() => parts.push(String::new()),
            Component::RootDir => {}
        }
    }
    if parts.len() == 1 && parts[0].is_empty() {
        return "/".to_string();
    }
    parts.join("/")
}
