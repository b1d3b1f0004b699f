#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Temporary index root with a `defs/` tree that tests populate file by file.
pub struct DefsTree {
    dir: TempDir,
}

impl DefsTree {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("failed to allocate temp index root")?;
        fs::create_dir_all(dir.path().join("defs"))?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn index_path(&self) -> PathBuf {
        self.root().join("index.json")
    }

    /// Write raw bytes to `defs/<app>/<file>`.
    pub fn write_raw(&self, app: &str, file: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.root().join("defs").join(app);
        fs::create_dir_all(&dir)?;
        let path = dir.join(file);
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// Write a definition value as pretty JSON; returns the bytes on disk.
    pub fn write_definition(&self, app: &str, file: &str, value: &Value) -> Result<Vec<u8>> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_raw(app, file, &bytes)?;
        Ok(bytes)
    }
}

pub fn definition(bundle_id: &str, name: &str, version: Option<&str>) -> Value {
    let mut value = json!({
        "name": name,
        "updated_at": "2025-10-17T08:00:00Z",
        "uninstall": {
            "appName": name,
            "bundleId": bundle_id,
            "forgetPkg": true,
            "unloadLaunchDaemons": false
        }
    });
    if let Some(version) = version {
        value["version"] = json!(version);
    }
    value
}

pub fn read_index(path: &Path) -> Result<Value> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

pub fn item_paths(index: &Value) -> Vec<String> {
    index["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["path"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn helper_binary(name: &str) -> PathBuf {
    match name {
        "build-index" => PathBuf::from(env!("CARGO_BIN_EXE_build-index")),
        "index-list" => PathBuf::from(env!("CARGO_BIN_EXE_index-list")),
        "index-verify" => PathBuf::from(env!("CARGO_BIN_EXE_index-verify")),
        "new-definition" => PathBuf::from(env!("CARGO_BIN_EXE_new-definition")),
        other => panic!("unknown helper binary {other}"),
    }
}

// Runs the command and fails with both streams when it exits non-zero.
pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to spawn {:?}", cmd.get_program()))?;
    if !output.status.success() {
        bail!(
            "command {:?} failed with {:?}\nstdout: {}\nstderr: {}",
            cmd.get_program(),
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}
